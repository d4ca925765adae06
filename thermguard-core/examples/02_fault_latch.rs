//! Fault Latch Example
//!
//! Shows a thermistor going open circuit: it is first trusted, then dropped
//! from its segment's aggregates, and finally trips the pack-wide latch that
//! switches every report to the fault count.
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_fault_latch
//! ```

use fugit::MillisDurationU32;
use thermguard_core::{
    time::NoDelay, CanFrame, CanFrameEncoder, ChannelId, MonitorConfig, PackMonitor, Transport,
};

/// Keeps the last frame for inspection
#[derive(Default)]
struct LastFrame(Option<CanFrame>);

impl Transport for LastFrame {
    type Error = core::convert::Infallible;

    fn send(&mut self, frame: &CanFrame, _timeout: MillisDurationU32) -> Result<(), Self::Error> {
        self.0 = Some(*frame);
        Ok(())
    }
}

fn main() {
    println!("ThermGuard Fault Latch Example");
    println!("==============================\n");

    // Default pack: segment 1 with one thermistor on channel 6
    let mut monitor = PackMonitor::new(MonitorConfig::default()).expect("default config is valid");
    let decoder = CanFrameEncoder::default();
    let mut bus = LastFrame::default();

    println!("cycle | code | temp | faulted | count | latch");
    println!("------|------|------|---------|-------|------");

    for cycle in 1..=10 {
        // Healthy for two cycles, then the lead breaks and the input floats high
        let code = if cycle <= 2 { 2400u16 } else { 4095 };
        let mut adc = |_: ChannelId| code;

        let report = monitor.run_cycle(&mut adc, &mut bus, &mut NoDelay);
        let thermistor = &monitor.segments()[0].thermistors()[0];
        let count = bus
            .0
            .as_ref()
            .and_then(|frame| decoder.decode(frame).ok())
            .map(|frame| frame.count)
            .unwrap_or_default();

        println!(
            "{:5} | {:4} | {:4} | {:7} | {:#5x} | {}",
            cycle,
            code,
            thermistor.temperature,
            thermistor.is_faulted(),
            count,
            if report.latch_tripped { "TRIPPED" } else { "clear" }
        );
    }

    println!();
    println!("The latch has no reset on the control path; only a controller");
    println!("restart clears it.");
}
