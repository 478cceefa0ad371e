//! The four operations a simulation driver issues against named UARTs.
//!
//! Each call completes without waiting on the host: reads report "nothing
//! pending" and writes report [`WriteStatus::Dropped`] instead of blocking the
//! simulation step. Only [`Transactor::poll_receivable`] refreshes an
//! instance's latch; [`Transactor::fetch_received`] reads it back as often as
//! asked.

use log::{debug, error, info, warn};

use crate::channel::{PtyChannel, WriteStatus};
use crate::config::TransactorConfig;
use crate::error::{Error, Result};
use crate::escape::describe_byte;
use crate::instance::{ChannelStats, UartInstance};
use crate::logbuf::{Direction, TrafficLog};
use crate::registry::{InstanceHandle, InstanceRegistry};

pub struct Transactor {
    config: TransactorConfig,
    registry: InstanceRegistry,
    traffic: TrafficLog,
}

impl Default for Transactor {
    fn default() -> Self {
        Self::new(TransactorConfig::default())
    }
}

impl Transactor {
    pub fn new(config: TransactorConfig) -> Self {
        let traffic = TrafficLog::new(config.traffic_capacity);
        Self {
            config,
            registry: InstanceRegistry::new(),
            traffic,
        }
    }

    pub fn config(&self) -> &TransactorConfig {
        &self.config
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    pub fn traffic(&self) -> &TrafficLog {
        &self.traffic
    }

    /// Opens a pty pair for `name` and registers it. Nothing is registered
    /// when the pair cannot be allocated.
    pub fn create(&mut self, name: &str) -> Result<InstanceHandle> {
        self.create_with(name, PtyChannel::open)
    }

    fn create_with<F>(&mut self, name: &str, open: F) -> Result<InstanceHandle>
    where
        F: FnOnce() -> Result<PtyChannel>,
    {
        if self.registry.contains(name) {
            warn!("refusing to create duplicate UART `{name}`");
            return Err(Error::DuplicateName(name.to_string()));
        }

        let channel = open().map_err(|e| {
            error!("UART `{name}`: {e}");
            e
        })?;
        let instance = UartInstance::new(name, channel);
        let path = instance.device_path().to_string();
        let handle = self.registry.register(instance)?;

        info!("UART `{name}` {handle} attached to {path}");
        if self.config.announce {
            println!("UART at Device: {path} is ready.");
        }
        Ok(handle)
    }

    pub fn device_path(&self, name: &str) -> Result<&str> {
        self.registry
            .lookup(name)
            .map(UartInstance::device_path)
            .ok_or_else(|| Error::InstanceNotFound(name.to_string()))
    }

    /// True iff a byte was newly read from the host into the latch.
    pub fn poll_receivable(&mut self, name: &str) -> Result<bool> {
        let instance = self.instance_mut(name)?;
        let byte = match instance.poll() {
            Ok(b) => b,
            Err(e) => {
                error!("{e}");
                return Err(e);
            }
        };
        let Some(byte) = byte else {
            return Ok(false);
        };

        if self.config.trace_bytes {
            info!("UART `{name}` from host: {}", describe_byte(byte));
        } else {
            debug!("UART `{name}` from host: {byte:#04x}");
        }
        self.traffic.push(name, Direction::Rx, byte);
        Ok(true)
    }

    /// The latched byte; stale until the next successful poll.
    pub fn fetch_received(&self, name: &str) -> Result<u8> {
        self.registry
            .lookup(name)
            .map(UartInstance::pending_byte)
            .ok_or_else(|| Error::InstanceNotFound(name.to_string()))
    }

    /// Best-effort write of one byte to the host.
    pub fn send_to_host(&mut self, name: &str, byte: u8) -> Result<WriteStatus> {
        let instance = self.instance_mut(name)?;
        let status = match instance.send(byte) {
            Ok(s) => s,
            Err(e) => {
                error!("{e}");
                return Err(e);
            }
        };

        match status {
            WriteStatus::Delivered => {
                if self.config.trace_bytes {
                    info!("UART `{name}` to host: {}", describe_byte(byte));
                } else {
                    debug!("UART `{name}` to host: {byte:#04x}");
                }
                self.traffic.push(name, Direction::Tx, byte);
            }
            WriteStatus::Dropped => {
                warn!("UART `{name}` backpressure, dropped {}", describe_byte(byte));
            }
        }
        Ok(status)
    }

    pub fn stats(&self, name: &str) -> Result<ChannelStats> {
        self.registry
            .lookup(name)
            .map(UartInstance::stats)
            .ok_or_else(|| Error::InstanceNotFound(name.to_string()))
    }

    fn instance_mut(&mut self, name: &str) -> Result<&mut UartInstance> {
        self.registry
            .lookup_mut(name)
            .ok_or_else(|| Error::InstanceNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transactor() -> Transactor {
        Transactor::new(TransactorConfig {
            announce: false,
            ..Default::default()
        })
    }

    #[test]
    fn failed_open_registers_nothing() {
        let mut t = transactor();
        let err = t
            .create_with("uart0", || {
                Err(Error::ChannelUnavailable {
                    reason: "pty pool exhausted".into(),
                    source: None,
                })
            })
            .unwrap_err();

        assert!(matches!(err, Error::ChannelUnavailable { .. }));
        assert!(!err.is_recoverable());
        assert!(t.registry().is_empty());
        assert!(matches!(t.fetch_received("uart0"), Err(Error::InstanceNotFound(_))));

        // The name stays free for a later attempt.
        t.create("uart0").unwrap();
        assert_eq!(t.registry().len(), 1);
    }

    #[test]
    fn duplicate_is_refused_before_opening() {
        let mut t = transactor();
        t.create("uart0").unwrap();

        let mut opened = false;
        let err = t
            .create_with("uart0", || {
                opened = true;
                PtyChannel::open()
            })
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateName(_)));
        assert!(!opened);
    }
}
