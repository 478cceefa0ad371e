#![allow(dead_code)]

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::thread;
use std::time::{Duration, Instant};

use nix::libc;
use simuart_core::Transactor;

const DEADLINE: Duration = Duration::from_secs(2);

/// External tool attached to the slave side of an instance.
pub struct Peer {
    file: File,
}

impl Peer {
    pub fn attach(path: &str) -> Self {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(path)
            .unwrap_or_else(|e| panic!("open {path}: {e}"));
        Self { file }
    }

    pub fn send(&mut self, bytes: &[u8]) {
        self.file.write_all(bytes).unwrap();
        self.file.flush().unwrap();
    }

    /// Reads exactly `n` bytes, giving up after a couple of seconds.
    pub fn recv(&mut self, n: usize) -> Vec<u8> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(n);
        let mut buf = [0u8; 64];
        while out.len() < n {
            assert!(start.elapsed() < DEADLINE, "peer got {out:?}, wanted {n} bytes");
            let want = (n - out.len()).min(buf.len());
            match self.file.read(&mut buf[..want]) {
                Ok(k) => out.extend_from_slice(&buf[..k]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(Duration::from_millis(2)),
                Err(e) => panic!("peer read: {e}"),
            }
        }
        out
    }

    /// True if nothing arrives within a short window.
    pub fn is_quiet(&mut self) -> bool {
        thread::sleep(Duration::from_millis(50));
        let mut buf = [0u8; 1];
        matches!(self.file.read(&mut buf), Err(ref e) if e.kind() == ErrorKind::WouldBlock)
    }
}

/// Polls until a byte is latched. Data written on the slave reaches the
/// master asynchronously, so a single poll may come back empty.
pub fn poll_until_ready(t: &mut Transactor, name: &str) -> bool {
    let start = Instant::now();
    while start.elapsed() < DEADLINE {
        if t.poll_receivable(name).unwrap() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}

pub fn quiet_transactor() -> Transactor {
    Transactor::new(simuart_core::TransactorConfig {
        announce: false,
        trace_bytes: true,
        traffic_capacity: 64,
    })
}
