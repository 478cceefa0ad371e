use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::escape::escape_byte;

#[derive(Debug, Clone)]
pub struct TrafficEntry {
    pub timestamp: u64,
    pub instance: String,
    pub direction: Direction,
    pub byte: u8,
}

/// Direction as seen from the simulated design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host to design, picked up by a poll.
    Rx,
    /// Design to host.
    Tx,
}

/// Bounded record of bytes moved through the transactor. Oldest entries go first.
pub struct TrafficLog {
    entries: VecDeque<TrafficEntry>,
    max_entries: usize,
}

impl TrafficLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries.min(4096)),
            max_entries,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_entries > 0
    }

    pub fn push(&mut self, instance: &str, direction: Direction, byte: u8) {
        if !self.is_enabled() {
            return;
        }
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        self.entries.push_back(TrafficEntry {
            timestamp,
            instance: instance.to_string(),
            direction,
            byte,
        });

        if self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &TrafficEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One line per run of consecutive same-instance, same-direction bytes.
    pub fn to_text(&self, show_timestamp: bool, show_hex: bool) -> String {
        let mut result = String::new();
        let mut iter = self.entries.iter().peekable();
        while let Some(first) = iter.next() {
            let mut run = vec![first.byte];
            while let Some(next) = iter.peek() {
                if next.instance != first.instance || next.direction != first.direction {
                    break;
                }
                run.push(next.byte);
                iter.next();
            }

            if show_timestamp {
                let secs = first.timestamp / 1000;
                let millis = first.timestamp % 1000;
                let hours = (secs / 3600) % 24;
                let minutes = (secs / 60) % 60;
                let seconds = secs % 60;
                result.push_str(&format!("[{hours:02}:{minutes:02}:{seconds:02}.{millis:03}] "));
            }
            let prefix = match first.direction {
                Direction::Rx => "RX",
                Direction::Tx => "TX",
            };
            result.push_str(&format!("{} {prefix}: ", first.instance));
            if show_hex {
                let hex: Vec<String> = run.iter().map(|b| format!("{b:02X}")).collect();
                result.push_str(&hex.join(" "));
            } else {
                for b in run {
                    result.push_str(&escape_byte(b));
                }
            }
            result.push('\n');
        }
        result
    }
}
