//! Single Control Cycle Example
//!
//! Runs one cycle of the pack monitor against a simulated ADC and a bus that
//! prints every frame it is handed.
//!
//! ## What You'll Learn
//!
//! - Describing the pack wiring with `MonitorConfig`
//! - Injecting hardware through `AnalogSource` and `Transport`
//! - Reading frames back with `CanFrameEncoder::decode`
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_single_cycle
//! ```

use fugit::MillisDurationU32;
use thermguard_core::{
    time::NoDelay, CanFrame, CanFrameEncoder, ChannelId, MonitorConfig, PackMonitor,
    SegmentConfig, Transport,
};

/// Bus that prints frames instead of sending them
struct PrintingBus {
    decoder: CanFrameEncoder,
}

impl Transport for PrintingBus {
    type Error = core::convert::Infallible;

    fn send(
        &mut self,
        frame: &CanFrame,
        timeout: MillisDurationU32,
    ) -> Result<(), Self::Error> {
        println!(
            "  id {:#010x} data {:02x?} (timeout {} ms)",
            frame.id().as_raw(),
            frame.data(),
            timeout.ticks()
        );
        if let Ok(report) = self.decoder.decode(frame) {
            println!(
                "    segment {} min {} max {} avg {} count {} ids {}..{}",
                report.segment, report.min, report.max, report.avg, report.count,
                report.lowest_id, report.highest_id
            );
        }
        Ok(())
    }
}

fn main() {
    println!("ThermGuard Single Cycle Example");
    println!("===============================\n");

    // Two segments of four thermistors each
    let mut config = MonitorConfig::default();
    config.segments.clear();
    for (id, channels) in [(1u8, [0u8, 1, 2, 3]), (2, [4, 5, 6, 7])] {
        let segment = SegmentConfig::new(id, &channels).expect("four channels fit");
        config.segments.push(segment).expect("two segments fit");
    }

    let mut monitor = match PackMonitor::new(config) {
        Ok(monitor) => monitor,
        Err(e) => {
            println!("Configuration rejected: {}", e);
            return;
        }
    };

    // Warmer cells toward the middle of the pack
    let mut adc = |channel: ChannelId| match channel.0 {
        3 | 4 => 2150u16,
        2 | 5 => 2300,
        _ => 2450,
    };

    let mut bus = PrintingBus { decoder: *monitor.encoder() };

    println!("Frames:");
    let report = monitor.run_cycle(&mut adc, &mut bus, &mut NoDelay);

    println!();
    println!("Cycle report:");
    println!("  Frames sent: {}", report.frames_sent);
    println!("  Frames dropped: {}", report.frames_dropped);
    println!("  Faulted thermistors: {}", report.faulted_thermistors);
    println!("  Fault latch: {}", if report.latch_tripped { "TRIPPED" } else { "clear" });
}
