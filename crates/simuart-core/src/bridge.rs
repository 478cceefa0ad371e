//! Simulator-facing adapter. Validates system-task arguments the way an
//! elaboration pass would, then dispatches to the [`Transactor`] it owns.

use std::str::FromStr;

use crate::error::Error;
use crate::registry::InstanceHandle;
use crate::transactor::Transactor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTask {
    /// `$uart_create(name)`
    UartCreate,
    /// `$transmit_valid(name)`: 1 when the host has sent a byte.
    TransmitValid,
    /// `$transmit_data(name)`: the byte latched by the last valid poll.
    TransmitData,
    /// `$receive_data(name, net)`: forwards the net's value to the host.
    ReceiveData,
}

impl SystemTask {
    pub const ALL: [SystemTask; 4] = [
        SystemTask::UartCreate,
        SystemTask::TransmitValid,
        SystemTask::TransmitData,
        SystemTask::ReceiveData,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SystemTask::UartCreate => "$uart_create",
            SystemTask::TransmitValid => "$transmit_valid",
            SystemTask::TransmitData => "$transmit_data",
            SystemTask::ReceiveData => "$receive_data",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            SystemTask::ReceiveData => 2,
            _ => 1,
        }
    }
}

impl FromStr for SystemTask {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SystemTask::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| BridgeError::UnknownTask(s.to_string()))
    }
}

/// A system-task argument as the simulator presents it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimArg {
    StringConst(String),
    Parameter(String),
    IntConst(i64),
    Net(i64),
}

impl SimArg {
    fn as_name(&self) -> Option<&str> {
        match self {
            SimArg::StringConst(s) | SimArg::Parameter(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimValue {
    Void,
    Int(i64),
    /// Single-character string result.
    Byte(u8),
    Handle(InstanceHandle),
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("unknown system task `{0}`")]
    UnknownTask(String),

    #[error("{task} requires {expected} argument(s)")]
    MissingArguments { task: &'static str, expected: usize },

    #[error("{task} can only have {expected} argument(s)")]
    TooManyArguments { task: &'static str, expected: usize },

    #[error("{task} argument {position} must be {expected}")]
    ArgumentType {
        task: &'static str,
        position: usize,
        expected: &'static str,
    },

    #[error(transparent)]
    Transactor(#[from] Error),
}

/// Argument checks run once per call site before simulation starts. Yields
/// the instance name.
pub fn check(task: SystemTask, args: &[SimArg]) -> Result<&str, BridgeError> {
    let expected = task.arity();
    if args.len() < expected {
        return Err(BridgeError::MissingArguments {
            task: task.name(),
            expected,
        });
    }
    if args.len() > expected {
        return Err(BridgeError::TooManyArguments {
            task: task.name(),
            expected,
        });
    }
    let Some(name) = args[0].as_name() else {
        return Err(BridgeError::ArgumentType {
            task: task.name(),
            position: 1,
            expected: "a string",
        });
    };
    if task == SystemTask::ReceiveData && !matches!(args[1], SimArg::Net(_)) {
        return Err(BridgeError::ArgumentType {
            task: task.name(),
            position: 2,
            expected: "a net",
        });
    }
    Ok(name)
}

pub struct Bridge {
    transactor: Transactor,
}

impl Bridge {
    pub fn new(transactor: Transactor) -> Self {
        Self { transactor }
    }

    pub fn transactor(&self) -> &Transactor {
        &self.transactor
    }

    pub fn into_transactor(self) -> Transactor {
        self.transactor
    }

    pub fn call_by_name(&mut self, task: &str, args: &[SimArg]) -> Result<SimValue, BridgeError> {
        self.call(task.parse()?, args)
    }

    pub fn call(&mut self, task: SystemTask, args: &[SimArg]) -> Result<SimValue, BridgeError> {
        let name = check(task, args)?;

        let value = match task {
            SystemTask::UartCreate => SimValue::Handle(self.transactor.create(name)?),
            SystemTask::TransmitValid => {
                SimValue::Int(self.transactor.poll_receivable(name)? as i64)
            }
            SystemTask::TransmitData => SimValue::Byte(self.transactor.fetch_received(name)?),
            SystemTask::ReceiveData => {
                let SimArg::Net(value) = args[1] else {
                    unreachable!("check() accepts only a net as argument 2");
                };
                // Only the low eight bits of the net are driven onto the line.
                // The transactor traces the byte and accounts for backpressure.
                self.transactor.send_to_host(name, value as u8)?;
                SimValue::Void
            }
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> SimArg {
        SimArg::StringConst(v.to_string())
    }

    #[test]
    fn parses_task_names() {
        assert_eq!("$uart_create".parse::<SystemTask>().unwrap(), SystemTask::UartCreate);
        assert_eq!("$receive_data".parse::<SystemTask>().unwrap(), SystemTask::ReceiveData);
        assert!(matches!(
            "$uart_destroy".parse::<SystemTask>(),
            Err(BridgeError::UnknownTask(_))
        ));
    }

    #[test]
    fn rejects_wrong_arity() {
        let err = check(SystemTask::TransmitValid, &[]).unwrap_err();
        assert_eq!(err.to_string(), "$transmit_valid requires 1 argument(s)");

        let err = check(SystemTask::TransmitData, &[s("a"), s("b")]).unwrap_err();
        assert_eq!(err.to_string(), "$transmit_data can only have 1 argument(s)");

        let err = check(SystemTask::ReceiveData, &[s("a")]).unwrap_err();
        assert!(matches!(err, BridgeError::MissingArguments { expected: 2, .. }));
    }

    #[test]
    fn rejects_wrong_argument_kinds() {
        let err = check(SystemTask::UartCreate, &[SimArg::Net(3)]).unwrap_err();
        assert_eq!(err.to_string(), "$uart_create argument 1 must be a string");

        let err = check(SystemTask::ReceiveData, &[s("uart0"), SimArg::IntConst(65)]).unwrap_err();
        assert_eq!(err.to_string(), "$receive_data argument 2 must be a net");
    }

    #[test]
    fn accepts_parameters_as_names() {
        check(SystemTask::UartCreate, &[SimArg::Parameter("UART".into())]).unwrap();
        check(SystemTask::ReceiveData, &[s("uart0"), SimArg::Net(0x41)]).unwrap();
    }

    #[test]
    fn unknown_instance_is_reported_not_fatal() {
        let mut bridge = Bridge::new(Transactor::default());
        let err = bridge.call(SystemTask::TransmitValid, &[s("nope")]).unwrap_err();
        match err {
            BridgeError::Transactor(e) => {
                assert!(matches!(e, Error::InstanceNotFound(ref n) if n == "nope"));
                assert!(e.is_recoverable());
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
