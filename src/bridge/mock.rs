//! In-memory bridge for tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};

use super::{Device, DeviceBridge, DeviceState};

/// Device that records every call and answers shell commands from a script.
#[derive(Debug)]
pub(crate) struct MockDevice {
    serial: String,
    state: DeviceState,
    fail_forward: bool,
    shell_replies: Mutex<Vec<(String, String)>>,
    pub(crate) forwards: Mutex<Vec<(u16, u16)>>,
    pub(crate) forward_kills: Mutex<Vec<u16>>,
    pub(crate) shell_commands: Mutex<Vec<String>>,
    pub(crate) pushes: Mutex<Vec<(Vec<u8>, String)>>,
}

impl MockDevice {
    pub(crate) fn new(serial: &str, state: DeviceState) -> Arc<Self> {
        Arc::new(Self::build(serial, state, false))
    }

    pub(crate) fn failing_forward(serial: &str) -> Arc<Self> {
        Arc::new(Self::build(serial, DeviceState::Online, true))
    }

    fn build(serial: &str, state: DeviceState, fail_forward: bool) -> Self {
        Self {
            serial: serial.to_string(),
            state,
            fail_forward,
            shell_replies: Mutex::new(Vec::new()),
            forwards: Mutex::new(Vec::new()),
            forward_kills: Mutex::new(Vec::new()),
            shell_commands: Mutex::new(Vec::new()),
            pushes: Mutex::new(Vec::new()),
        }
    }

    /// Answers shell command lines starting with `prefix` with `output`.
    pub(crate) fn on_shell(&self, prefix: &str, output: &str) {
        self.shell_replies
            .lock()
            .push((prefix.to_string(), output.to_string()));
    }
}

#[async_trait]
impl Device for MockDevice {
    fn serial(&self) -> &str {
        &self.serial
    }

    async fn state(&self) -> Result<DeviceState> {
        Ok(self.state.clone())
    }

    async fn forward(&self, local_port: u16, remote_port: u16) -> Result<()> {
        if self.fail_forward {
            return Err(Error::forward(local_port, "cannot bind listener"));
        }
        self.forwards.lock().push((local_port, remote_port));
        Ok(())
    }

    async fn forward_kill(&self, local_port: u16) -> Result<()> {
        self.forward_kills.lock().push(local_port);
        Ok(())
    }

    async fn run_shell_command(&self, command: &str, args: &[&str]) -> Result<String> {
        let line = std::iter::once(command)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.shell_commands.lock().push(line.clone());

        Ok(self
            .shell_replies
            .lock()
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default())
    }

    async fn push_file(&self, data: &[u8], remote_path: &str) -> Result<()> {
        self.pushes
            .lock()
            .push((data.to_vec(), remote_path.to_string()));
        Ok(())
    }
}

/// Bridge listing a fixed set of devices.
#[derive(Debug, Default)]
pub(crate) struct MockBridge {
    devices: Vec<Arc<MockDevice>>,
}

impl MockBridge {
    pub(crate) fn new(devices: Vec<Arc<MockDevice>>) -> Arc<Self> {
        Arc::new(Self { devices })
    }
}

#[async_trait]
impl DeviceBridge for MockBridge {
    async fn list_devices(&self) -> Result<Vec<Arc<dyn Device>>> {
        Ok(self
            .devices
            .iter()
            .map(|d| Arc::clone(d) as Arc<dyn Device>)
            .collect())
    }
}
