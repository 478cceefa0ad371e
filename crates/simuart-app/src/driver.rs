//! Stand-in for a simulator: issues the UART system tasks once per step.

use anyhow::{bail, Result};
use log::warn;
use simuart_core::{Bridge, BridgeError, SimArg, SimValue, SystemTask};

pub struct Driver {
    bridge: Bridge,
    names: Vec<String>,
    echo: bool,
}

impl Driver {
    pub fn new(bridge: Bridge, echo: bool) -> Self {
        Self {
            bridge,
            names: Vec::new(),
            echo,
        }
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub fn create(&mut self, name: &str) -> Result<()> {
        self.bridge.call(SystemTask::UartCreate, &[name_arg(name)])?;
        self.names.push(name.to_string());
        Ok(())
    }

    /// Pushes `bytes` to every instance, as a design would right after reset.
    pub fn greet(&mut self, bytes: &[u8]) -> Result<()> {
        for name in self.names.clone() {
            for &b in bytes {
                self.receive_data(&name, b)?;
            }
        }
        Ok(())
    }

    /// One simulation step over all instances. Returns the bytes taken from the host.
    pub fn step(&mut self) -> Result<usize> {
        let mut moved = 0;
        for name in self.names.clone() {
            match self.step_one(&name) {
                Ok(true) => moved += 1,
                Ok(false) => {}
                Err(BridgeError::Transactor(e)) if e.is_recoverable() => {
                    warn!("step skipped for `{name}`: {e}");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(moved)
    }

    fn step_one(&mut self, name: &str) -> Result<bool, BridgeError> {
        let args = [name_arg(name)];
        if self.bridge.call(SystemTask::TransmitValid, &args)? != SimValue::Int(1) {
            return Ok(false);
        }
        let SimValue::Byte(b) = self.bridge.call(SystemTask::TransmitData, &args)? else {
            return Ok(true);
        };
        if self.echo {
            self.receive_data(name, b)?;
        }
        Ok(true)
    }

    fn receive_data(&mut self, name: &str, byte: u8) -> Result<(), BridgeError> {
        let args = [name_arg(name), SimArg::Net(byte as i64)];
        self.bridge.call(SystemTask::ReceiveData, &args)?;
        Ok(())
    }
}

fn name_arg(name: &str) -> SimArg {
    SimArg::StringConst(name.to_string())
}

pub fn parse_greeting(text: &str) -> Result<Vec<u8>> {
    let cleaned: String = text.split_whitespace().collect();
    match hex::decode(&cleaned) {
        Ok(bytes) => Ok(bytes),
        Err(e) => bail!("greeting `{text}` is not hex: {e}"),
    }
}
