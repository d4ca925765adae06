//! Loopback Monitor Example
//!
//! Brings up an in-process CAN controller in self-test mode, runs a few
//! cycles of the monitor against a simulated pack, decodes the frames that
//! came back and answers one dashboard query.
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run -p thermguard-connectors --example loopback_monitor
//! ```

use http::Request;
use thermguard_connectors::{bring_up, config, BusConfig, LoopbackBus, QueryEndpoint};
use thermguard_core::{
    time::{StdDelay, SystemTime},
    ChannelId, PackMonitor,
};

const CONFIG: &str = r#"{
    "can": { "cycle_budget_ms": 50 },
    "segments": [
        { "id": 1, "channels": [0, 1, 2] },
        { "id": 2, "channels": [3, 4, 5] }
    ]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("ThermGuard Loopback Monitor");
    println!("===========================\n");

    let config = config::from_json_str(CONFIG)?;

    let mut bus = LoopbackBus::new();
    bring_up(&mut bus, &BusConfig::loopback())?;

    let mut monitor = PackMonitor::new(config)?;
    let encoder = *monitor.encoder();

    // Gentle gradient across the pack
    let mut adc = |channel: ChannelId| 2200u16 + u16::from(channel.0) * 40;

    for cycle in 1..=3 {
        let report = monitor.run_cycle(&mut adc, &mut bus, &mut StdDelay);
        println!(
            "Cycle {}: {} sent, {} dropped",
            cycle, report.frames_sent, report.frames_dropped
        );

        while let Some(decoded) = bus.receive_report(&encoder) {
            match decoded {
                Ok(frame) => println!(
                    "  segment {}: min {} max {} avg {} (count {})",
                    frame.segment, frame.min, frame.max, frame.avg, frame.count
                ),
                Err(e) => println!("  undecodable frame: {}", e),
            }
        }
    }

    println!();
    let request = Request::get("/api/thermistors").body(())?;
    let response = QueryEndpoint::default().handle(&request, &mut monitor, &mut adc, &SystemTime);
    println!("{} {}", response.status(), response.body());

    Ok(())
}
