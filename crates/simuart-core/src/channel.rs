//! One OS pseudo-terminal pair. The simulation talks to the master side, an
//! external tool (terminal emulator, script) opens the slave device path.

use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::sys::termios::{cfmakeraw, tcgetattr, tcsetattr, SetArg};
use serialport::{SerialPort, TTYPort};
use std::io::{self, Read, Write};
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Longest slave path accepted, excluding the terminator.
pub const MAX_DEVICE_PATH: usize = 63;

/// Outcome of a best-effort write on the master side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Delivered,
    /// The master would have blocked; the byte was not written.
    Dropped,
}

impl WriteStatus {
    pub fn is_delivered(&self) -> bool {
        matches!(self, WriteStatus::Delivered)
    }
}

pub struct PtyChannel {
    master: TTYPort,
    // Held open so the master never sees a hang-up when the external peer detaches.
    slave: TTYPort,
    device_path: String,
}

impl PtyChannel {
    /// Allocates a raw-mode pty pair with a non-blocking master.
    pub fn open() -> Result<Self> {
        let (mut master, mut slave) =
            TTYPort::pair().map_err(|e| Error::unavailable("openpty failed", e))?;

        let name = slave.name().ok_or_else(|| Error::ChannelUnavailable {
            reason: "slave device has no name".into(),
            source: None,
        })?;
        let device_path = resolve_path(&name);
        check_device_path(&device_path)?;

        // External tools must be able to open the slave path alongside us.
        slave
            .set_exclusive(false)
            .map_err(|e| Error::unavailable("cannot share slave device", e))?;
        make_raw(slave.as_raw_fd()).map_err(|e| Error::unavailable("cannot set raw mode", e))?;
        set_nonblocking(master.as_raw_fd())
            .map_err(|e| Error::unavailable("cannot set O_NONBLOCK on master", e))?;
        master
            .set_timeout(Duration::ZERO)
            .map_err(|e| Error::unavailable("cannot clear master timeout", e))?;

        Ok(Self {
            master,
            slave,
            device_path,
        })
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    pub fn master_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }

    pub fn slave_fd(&self) -> RawFd {
        self.slave.as_raw_fd()
    }

    /// Reads at most one byte without waiting. `Ok(None)` means nothing is pending.
    pub fn try_read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.master.read(&mut buf) {
                Ok(1) => return Ok(Some(buf[0])),
                Ok(_) => return Ok(None),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_would_block(&e) => return Ok(None),
                Err(e) => return Err(e),
            }
        }
    }

    pub fn write_byte(&mut self, byte: u8) -> io::Result<WriteStatus> {
        loop {
            match self.master.write(&[byte]) {
                Ok(1) => return Ok(WriteStatus::Delivered),
                Ok(_) => return Ok(WriteStatus::Dropped),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_would_block(&e) => return Ok(WriteStatus::Dropped),
                Err(e) => return Err(e),
            }
        }
    }
}

impl std::fmt::Debug for PtyChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtyChannel")
            .field("device_path", &self.device_path)
            .field("master", &self.master_fd())
            .field("slave", &self.slave_fd())
            .finish()
    }
}

// A zero poll timeout surfaces as TimedOut, an empty O_NONBLOCK read as WouldBlock.
fn is_would_block(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

fn resolve_path(name: &str) -> String {
    match std::fs::canonicalize(Path::new(name)) {
        Ok(p) => p.to_string_lossy().into_owned(),
        Err(_) => name.to_string(),
    }
}

fn check_device_path(path: &str) -> Result<()> {
    if path.len() > MAX_DEVICE_PATH {
        return Err(Error::ChannelUnavailable {
            reason: format!("device path {path} exceeds {MAX_DEVICE_PATH} bytes"),
            source: None,
        });
    }
    Ok(())
}

fn make_raw(fd: RawFd) -> nix::Result<()> {
    let mut termios = tcgetattr(fd)?;
    cfmakeraw(&mut termios);
    tcsetattr(fd, SetArg::TCSANOW, &termios)
}

fn set_nonblocking(fd: RawFd) -> nix::Result<()> {
    let flags = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL)?);
    fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
    Ok(())
}
