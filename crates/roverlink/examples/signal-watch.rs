//! Watch for SIGINT through a self-pipe and exit on the first delivery.
//!
//! Run with:
//!   cargo run --example signal-watch
//!
//! Press ctrl-c to stop it early; it interrupts itself after five ticks.

use std::time::Duration;

use roverlink::ipc::Signal;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let sigint = Signal::new(libc::SIGINT)?;
    eprintln!("watching SIGINT (signal {})", sigint.signum());

    for tick in 1..=5 {
        if sigint.wait(Duration::from_secs(1)) {
            eprintln!("caught SIGINT, exiting");
            return Ok(());
        }
        eprintln!("tick {tick}, nothing yet");
    }

    eprintln!("no ctrl-c seen, interrupting ourselves");
    sigint.raise();
    if sigint.wait(Duration::from_secs(1)) {
        eprintln!("caught our own SIGINT, exiting");
    }
    Ok(())
}
