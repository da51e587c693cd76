//! The actuator link: velocity commands framed onto a shared descriptor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tracing::{debug, warn};

use roverlink_ipc::{File, Io};
use roverlink_msg::codec;
use roverlink_msg::{Message, Result as WireResult, Twist2DStamped};

use crate::error::Result;
use crate::frame::{encode_frame, OVERHEAD};
use crate::port::open_port;

/// Topic id carrying [`DriveCommand`] payloads.
pub const TOPIC_DRIVE_COMMAND: u16 = 214;
/// Topic id carrying [`TimeSync`] payloads.
pub const TOPIC_TIME_SYNC: u16 = 201;
/// How often the background thread broadcasts the host clock.
pub const TIME_SYNC_PERIOD: Duration = Duration::from_millis(500);

/// Payload of [`TOPIC_DRIVE_COMMAND`]: a microsecond timestamp and planar
/// velocities, 20 bytes on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveCommand {
    pub utime: i64,
    pub vx: f32,
    pub vy: f32,
    pub wz: f32,
}

impl Message for DriveCommand {
    fn wire_size(&self) -> u32 {
        codec::size_number(&self.utime)
            + codec::size_number(&self.vx)
            + codec::size_number(&self.vy)
            + codec::size_number(&self.wz)
    }

    fn serialize(&self, dst: &mut [u8], offset: &mut usize) {
        codec::serialize_number(dst, offset, self.utime);
        codec::serialize_number(dst, offset, self.vx);
        codec::serialize_number(dst, offset, self.vy);
        codec::serialize_number(dst, offset, self.wz);
    }

    fn deserialize(src: &[u8], offset: &mut usize) -> WireResult<Self> {
        Ok(Self {
            utime: codec::deserialize_number(src, offset)?,
            vx: codec::deserialize_number(src, offset)?,
            vy: codec::deserialize_number(src, offset)?,
            wz: codec::deserialize_number(src, offset)?,
        })
    }
}

impl From<&Twist2DStamped> for DriveCommand {
    fn from(cmd: &Twist2DStamped) -> Self {
        Self {
            utime: cmd.header.stamp.as_micros(),
            vx: cmd.twist.vx,
            vy: cmd.twist.vy,
            wz: cmd.twist.wz,
        }
    }
}

/// Payload of [`TOPIC_TIME_SYNC`]: the host clock in microseconds since the
/// Unix epoch, 8 bytes on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeSync {
    pub utime: i64,
}

impl Message for TimeSync {
    fn wire_size(&self) -> u32 {
        codec::size_number(&self.utime)
    }

    fn serialize(&self, dst: &mut [u8], offset: &mut usize) {
        codec::serialize_number(dst, offset, self.utime);
    }

    fn deserialize(src: &[u8], offset: &mut usize) -> WireResult<Self> {
        Ok(Self {
            utime: codec::deserialize_number(src, offset)?,
        })
    }
}

/// Anything that can accept a velocity command.
///
/// The driver loop holds one of these; tests substitute an implementation
/// that records commands instead of writing to hardware.
pub trait Actuator {
    fn drive(&self, cmd: &Twist2DStamped) -> Result<()>;
}

/// Frames commands onto a descriptor shared with a time sync thread.
///
/// [`SerialLink::open`] claims a real serial device, configures it, and
/// starts a thread that broadcasts [`TimeSync`] every [`TIME_SYNC_PERIOD`]
/// so the receiver can anchor command timestamps to the host clock.
/// [`SerialLink::passthrough`] wraps an already-open descriptor instead and
/// starts no thread, which keeps dry runs free of clock chatter.
///
/// All writes go through one mutex, so a drive frame and a sync frame never
/// interleave on the wire.
pub struct SerialLink {
    port: Arc<Mutex<File>>,
    stop: Arc<AtomicBool>,
    sync_thread: Option<JoinHandle<()>>,
}

impl SerialLink {
    /// Open `device`, configure it for the rover, and start the time sync
    /// broadcast.
    pub fn open(device: impl AsRef<std::path::Path>) -> Result<Self> {
        let port = Arc::new(Mutex::new(open_port(device)?));
        let stop = Arc::new(AtomicBool::new(false));
        let sync_thread = Some(spawn_time_sync(
            Arc::clone(&port),
            Arc::clone(&stop),
            TIME_SYNC_PERIOD,
        ));
        Ok(Self {
            port,
            stop,
            sync_thread,
        })
    }

    /// Wrap an already-open descriptor. No configuration, no sync thread.
    pub fn passthrough(file: File) -> Self {
        Self {
            port: Arc::new(Mutex::new(file)),
            stop: Arc::new(AtomicBool::new(false)),
            sync_thread: None,
        }
    }

    /// Whether this link runs the time sync broadcast.
    pub fn has_time_sync(&self) -> bool {
        self.sync_thread.is_some()
    }

    fn send(&self, topic: u16, payload: &[u8]) -> Result<()> {
        let mut frame = vec![0u8; payload.len() + OVERHEAD];
        encode_frame(&mut frame, topic, payload)?;
        let port = self.port.lock();
        port.write_all(&frame)?;
        Ok(())
    }
}

impl Actuator for SerialLink {
    fn drive(&self, cmd: &Twist2DStamped) -> Result<()> {
        let payload = encode_payload(&DriveCommand::from(cmd));
        self.send(TOPIC_DRIVE_COMMAND, &payload)
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.sync_thread.take() {
            // The port must outlive the thread; it closes with the last Arc
            // after the join.
            let _ = handle.join();
        }
    }
}

fn encode_payload<M: Message>(msg: &M) -> Vec<u8> {
    let mut payload = vec![0u8; msg.wire_size() as usize];
    let mut offset = 0;
    msg.serialize(&mut payload, &mut offset);
    payload
}

fn now_micros() -> i64 {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    since_epoch.as_micros() as i64
}

fn spawn_time_sync(
    port: Arc<Mutex<File>>,
    stop: Arc<AtomicBool>,
    period: Duration,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        debug!("time sync broadcast started");
        while !stop.load(Ordering::Acquire) {
            let payload = encode_payload(&TimeSync {
                utime: now_micros(),
            });
            let mut frame = vec![0u8; payload.len() + OVERHEAD];
            if encode_frame(&mut frame, TOPIC_TIME_SYNC, &payload).is_err() {
                // Unreachable with a buffer sized off the payload, but a
                // corrupt frame must never reach the wire.
                break;
            }
            let result = {
                let port = port.lock();
                port.write_all(&frame)
            };
            if let Err(error) = result {
                warn!(%error, "time sync write failed, broadcast stopping");
                break;
            }
            std::thread::sleep(period);
        }
        debug!("time sync broadcast stopped");
    })
}
