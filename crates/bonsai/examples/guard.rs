//! A guard that patrols, investigates noises and rests between shifts.
//!
//! Run with `RUST_LOG=bonsai_bt=trace` to see every tick.

use std::sync::Arc;

use bonsai::core::ManualClock;
use bonsai::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let clock = Arc::new(ManualClock::new());
    let mut tree = Builder::new()
        .clock(clock.clone())
        .reactive_selector()
        .sequence()
        .condition(|bb| bb.get::<bool>("noise").unwrap_or(false))
        .timeout(2.0)
        .action(|bb| {
            let steps = bb.get::<u32>("search").unwrap_or(0) + 1;
            bb.set("search", steps);
            if steps >= 3 {
                bb.set("noise", false);
                bb.remove("search");
                Status::Success
            } else {
                Status::Running
            }
        })
        .end()
        .cooldown(1.0)
        .action(|bb| {
            let laps = bb.get::<u32>("laps").unwrap_or(0) + 1;
            bb.set("laps", laps);
            Status::Success
        })
        .action(|_bb| Status::Running)
        .end()
        .build()?;

    for frame in 0..12u32 {
        if frame == 4 {
            tree.blackboard().set("noise", true);
        }
        let status = tree.tick();
        tracing::info!(
            frame,
            ?status,
            laps = tree.blackboard().get::<u32>("laps").unwrap_or(0),
            "guard ticked"
        );
        clock.advance_secs(0.5);
    }

    Ok(())
}
