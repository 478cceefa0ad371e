//! Core of the pty UART transactor: pty channels, the instance registry, the
//! four simulation-facing operations, and the simulator adapter.

pub mod bridge;
pub mod channel;
pub mod config;
pub mod error;
pub mod escape;
pub mod instance;
pub mod logbuf;
pub mod registry;
pub mod transactor;

pub use bridge::{Bridge, BridgeError, SimArg, SimValue, SystemTask};
pub use channel::{PtyChannel, WriteStatus, MAX_DEVICE_PATH};
pub use config::TransactorConfig;
pub use error::{Error, Result};
pub use escape::{describe_byte, escape_byte};
pub use instance::{ChannelStats, UartInstance};
pub use logbuf::{Direction, TrafficEntry, TrafficLog};
pub use registry::{InstanceHandle, InstanceRegistry};
pub use transactor::Transactor;
