//! Scripted end-to-end run: key presses through teleop, over a pipe, into
//! a driver that frames commands onto a passthrough link.
//!
//! Run with:
//!   cargo run --example drive-pipeline

use std::thread;

use roverlink::driver::Driver;
use roverlink::ipc::{File, Io, Pipe};
use roverlink::msg::Twist2DStamped;
use roverlink::serial::{Actuator, SerialLink, HEADER_LEN, OVERHEAD};
use roverlink::teleop::Teleop;

struct Announcer {
    link: SerialLink,
}

impl Actuator for Announcer {
    fn drive(&self, cmd: &Twist2DStamped) -> roverlink::serial::Result<()> {
        eprintln!(
            "driver: seq {} vx {:+.2} vy {:+.2} wz {:+.2}",
            cmd.header.seq, cmd.twist.vx, cmd.twist.vy, cmd.twist.wz
        );
        self.link.drive(cmd)
    }
}

struct Never;

impl roverlink::ipc::Notification for Never {
    fn is_ready(&self) -> bool {
        false
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let (key_rx, key_tx) = Pipe::pair()?;
    let (cmd_rx, cmd_tx) = Pipe::pair()?;
    let (wire_rx, wire_tx) = Pipe::pair()?;

    let teleop = thread::spawn(move || {
        let mut teleop = Teleop::new(key_rx, cmd_tx, 0.5, 1.0);
        teleop.spin(&Never)
    });
    let driver = thread::spawn(move || {
        let link = SerialLink::passthrough(File::from(wire_tx));
        let mut driver = Driver::new(cmd_rx, Announcer { link });
        driver.spin(&Never)
    });

    // A short scripted drive: forward, strafe, spin, stop.
    key_tx.write_all(b"wwaq e ")?;
    drop(key_tx);

    teleop.join().expect("teleop thread")?;
    driver.join().expect("driver thread")?;

    let mut wire = Vec::new();
    let mut chunk = [0u8; 512];
    loop {
        let n = wire_rx.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        wire.extend_from_slice(&chunk[..n]);
    }

    let frame_len = 20 + OVERHEAD;
    eprintln!(
        "wire: {} bytes, {} frames of {} bytes",
        wire.len(),
        wire.len() / frame_len,
        frame_len
    );
    for frame in wire.chunks_exact(frame_len) {
        let vx = f32::from_ne_bytes(frame[HEADER_LEN + 8..HEADER_LEN + 12].try_into()?);
        eprintln!("wire: topic {} vx {vx:+.2}", u16::from_le_bytes([frame[5], frame[6]]));
    }
    Ok(())
}
