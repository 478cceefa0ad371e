use crate::channel::{PtyChannel, WriteStatus};
use crate::error::{Error, Result};

/// Byte counters for one instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub received: u64,
    pub sent: u64,
    pub dropped: u64,
}

/// A named transactor endpoint: one pty pair plus the receive latch.
#[derive(Debug)]
pub struct UartInstance {
    name: String,
    channel: PtyChannel,
    pending_byte: u8,
    stats: ChannelStats,
}

impl UartInstance {
    pub fn new(name: impl Into<String>, channel: PtyChannel) -> Self {
        Self {
            name: name.into(),
            channel,
            pending_byte: 0,
            stats: ChannelStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device_path(&self) -> &str {
        self.channel.device_path()
    }

    /// Latched byte. Reads as 0 until the first successful poll.
    pub fn pending_byte(&self) -> u8 {
        self.pending_byte
    }

    pub fn stats(&self) -> ChannelStats {
        self.stats
    }

    /// Pulls one byte from the host into the latch. The latch is left alone
    /// when nothing is pending.
    pub fn poll(&mut self) -> Result<Option<u8>> {
        match self.channel.try_read_byte() {
            Ok(Some(b)) => {
                self.pending_byte = b;
                self.stats.received += 1;
                Ok(Some(b))
            }
            Ok(None) => Ok(None),
            Err(source) => Err(Error::ChannelClosed {
                name: self.name.clone(),
                source,
            }),
        }
    }

    pub fn send(&mut self, byte: u8) -> Result<WriteStatus> {
        let status = self
            .channel
            .write_byte(byte)
            .map_err(|source| Error::ChannelClosed {
                name: self.name.clone(),
                source,
            })?;
        match status {
            WriteStatus::Delivered => self.stats.sent += 1,
            WriteStatus::Dropped => self.stats.dropped += 1,
        }
        Ok(status)
    }
}
