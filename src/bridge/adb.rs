//! Device Bridge over the `adb` command line tool.
//!
//! Every operation spawns `adb -H <host> -P <port> [-s <serial>] ...` through
//! `tokio::process`, so the adb server connection settings in
//! [`DriverOptions`](crate::DriverOptions) apply to all of them.
//!
//! The `adb` binary is resolved from `ADB_PATH`, then
//! `$ANDROID_SDK_ROOT/platform-tools`, then `$ANDROID_HOME/platform-tools`,
//! falling back to `adb` on `PATH`.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::{Error, Result};

use super::{Device, DeviceBridge, DeviceState};

// ============================================================================
// Constants
// ============================================================================

/// Default adb server host.
pub const DEFAULT_ADB_HOST: &str = "localhost";

/// Default adb server port.
pub const DEFAULT_ADB_PORT: u16 = 5037;

// ============================================================================
// AdbCommand
// ============================================================================

/// adb program plus server address, shared by the bridge and its devices.
#[derive(Debug, Clone)]
struct AdbCommand {
    program: PathBuf,
    host: String,
    port: u16,
}

impl AdbCommand {
    /// Runs adb with the given arguments and returns its output whatever
    /// the exit status.
    async fn spawn(&self, serial: Option<&str>, args: &[&str]) -> Result<Output> {
        let mut command = Command::new(&self.program);
        command
            .arg("-H")
            .arg(&self.host)
            .arg("-P")
            .arg(self.port.to_string());
        if let Some(serial) = serial {
            command.arg("-s").arg(serial);
        }
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        trace!(program = %self.program.display(), ?serial, ?args, "Running adb");

        command.output().await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::bridge("adb not found (set ADB_PATH or ANDROID_SDK_ROOT)")
            } else {
                Error::Io(e)
            }
        })
    }

    /// Runs adb with the given arguments and returns its output on success.
    async fn output(&self, serial: Option<&str>, args: &[&str]) -> Result<Output> {
        let output = self.spawn(serial, args).await?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(failure(&output))
        }
    }

    /// Runs `adb shell ...`.
    ///
    /// adb forwards the remote exit code, so a non-zero status alone says
    /// nothing about the bridge. Only adb's own diagnostics on stderr fail
    /// the call; any other output goes back to the caller.
    async fn shell(&self, serial: Option<&str>, args: &[&str]) -> Result<Output> {
        let output = self.spawn(serial, args).await?;
        if output.status.success() || !is_adb_diagnostic(&output.stderr) {
            if !output.status.success() {
                trace!(?serial, status = ?output.status.code(), "Remote command exited non-zero");
            }
            Ok(output)
        } else {
            Err(failure(&output))
        }
    }
}

/// Builds the bridge error for a failed adb invocation.
fn failure(output: &Output) -> Error {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    Error::bridge(failure_message(
        output.status.code().unwrap_or(-1),
        &stdout,
        &stderr,
    ))
}

/// Whether stderr carries an error reported by adb itself
/// (`error: device offline`, `adb: device unauthorized.`).
fn is_adb_diagnostic(stderr: &[u8]) -> bool {
    let stderr = String::from_utf8_lossy(stderr);
    let stderr = stderr.trim_start();
    stderr.starts_with("error:") || stderr.starts_with("adb: ")
}

/// Resolves the adb program path from the environment.
fn adb_program() -> PathBuf {
    if let Ok(path) = std::env::var("ADB_PATH") {
        return PathBuf::from(path);
    }
    for var in ["ANDROID_SDK_ROOT", "ANDROID_HOME"] {
        if let Ok(root) = std::env::var(var) {
            let candidate = PathBuf::from(root).join("platform-tools").join("adb");
            if candidate.is_file() {
                return candidate;
            }
        }
    }
    PathBuf::from("adb")
}

/// Formats a failed adb invocation.
fn failure_message(status: i32, stdout: &str, stderr: &str) -> String {
    let detail = [stdout.trim(), stderr.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if detail.is_empty() {
        format!("adb exited with status {status}")
    } else {
        format!("adb exited with status {status}: {detail}")
    }
}

// ============================================================================
// Device list parsing
// ============================================================================

/// One row of `adb devices -l`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DeviceEntry {
    serial: String,
    state: DeviceState,
    properties: FxHashMap<String, String>,
}

/// Parses `adb devices -l` output.
///
/// Skips the header, blank lines and daemon status lines (`* daemon ...`).
fn parse_device_list(output: &str) -> Vec<DeviceEntry> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty() && !line.starts_with("List of devices") && !line.starts_with('*')
        })
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let serial = fields.next()?;
            let state = fields.next()?;
            let properties = fields
                .filter_map(|field| field.split_once(':'))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();

            Some(DeviceEntry {
                serial: serial.to_string(),
                state: DeviceState::from_adb(state),
                properties,
            })
        })
        .collect()
}

// ============================================================================
// AdbBridge
// ============================================================================

/// [`DeviceBridge`] backed by the `adb` command line tool.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    adb: Arc<AdbCommand>,
}

impl Default for AdbBridge {
    fn default() -> Self {
        Self::new(DEFAULT_ADB_HOST, DEFAULT_ADB_PORT)
    }
}

impl AdbBridge {
    /// Creates a bridge talking to the adb server at `host:port`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            adb: Arc::new(AdbCommand {
                program: adb_program(),
                host: host.into(),
                port,
            }),
        }
    }

    /// Overrides the adb program path.
    #[must_use]
    pub fn with_program(self, program: impl Into<PathBuf>) -> Self {
        let mut adb = (*self.adb).clone();
        adb.program = program.into();
        Self { adb: Arc::new(adb) }
    }

    /// Returns a handle for a known serial without listing devices.
    #[must_use]
    pub fn device(&self, serial: impl Into<String>) -> AdbDevice {
        AdbDevice {
            adb: Arc::clone(&self.adb),
            serial: serial.into(),
            properties: FxHashMap::default(),
        }
    }
}

#[async_trait]
impl DeviceBridge for AdbBridge {
    async fn list_devices(&self) -> Result<Vec<Arc<dyn Device>>> {
        let output = self.adb.output(None, &["devices", "-l"]).await?;
        let entries = parse_device_list(&String::from_utf8_lossy(&output.stdout));

        debug!(count = entries.len(), "Listed adb devices");

        Ok(entries
            .into_iter()
            .map(|entry| {
                Arc::new(AdbDevice {
                    adb: Arc::clone(&self.adb),
                    serial: entry.serial,
                    properties: entry.properties,
                }) as Arc<dyn Device>
            })
            .collect())
    }
}

// ============================================================================
// AdbDevice
// ============================================================================

/// One device addressed by serial through adb.
#[derive(Clone)]
pub struct AdbDevice {
    adb: Arc<AdbCommand>,
    serial: String,
    properties: FxHashMap<String, String>,
}

impl fmt::Debug for AdbDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdbDevice")
            .field("serial", &self.serial)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

impl AdbDevice {
    /// Returns a property reported by `adb devices -l` (`model`, `product`, ...).
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    async fn run(&self, args: &[&str]) -> Result<Output> {
        self.adb.output(Some(&self.serial), args).await
    }

    async fn shell(&self, args: &[&str]) -> Result<Output> {
        self.adb.shell(Some(&self.serial), args).await
    }
}

#[async_trait]
impl Device for AdbDevice {
    fn serial(&self) -> &str {
        &self.serial
    }

    async fn state(&self) -> Result<DeviceState> {
        match self.run(&["get-state"]).await {
            Ok(output) => Ok(DeviceState::from_adb(&String::from_utf8_lossy(
                &output.stdout,
            ))),
            // get-state exits non-zero for these two
            Err(Error::Bridge { message }) if message.contains("unauthorized") => {
                Ok(DeviceState::Unauthorized)
            }
            Err(Error::Bridge { message }) if message.contains("offline") => {
                Ok(DeviceState::Offline)
            }
            Err(e) => Err(e),
        }
    }

    async fn forward(&self, local_port: u16, remote_port: u16) -> Result<()> {
        let local = format!("tcp:{local_port}");
        let remote = format!("tcp:{remote_port}");
        self.run(&["forward", &local, &remote])
            .await
            .map_err(|e| Error::forward(local_port, e.to_string()))?;

        debug!(serial = %self.serial, local_port, remote_port, "Port forwarded");
        Ok(())
    }

    async fn forward_kill(&self, local_port: u16) -> Result<()> {
        let local = format!("tcp:{local_port}");
        self.run(&["forward", "--remove", &local])
            .await
            .map_err(|e| Error::forward(local_port, e.to_string()))?;

        debug!(serial = %self.serial, local_port, "Port forward removed");
        Ok(())
    }

    async fn run_shell_command(&self, command: &str, args: &[&str]) -> Result<String> {
        let mut argv = Vec::with_capacity(args.len() + 2);
        argv.push("shell");
        argv.push(command);
        argv.extend_from_slice(args);

        let output = self.shell(&argv).await?;
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }

    async fn push_file(&self, data: &[u8], remote_path: &str) -> Result<()> {
        let staged = tempfile::Builder::new().prefix("uia2-push-").tempfile()?;
        tokio::fs::write(staged.path(), data).await?;

        let local = staged.path().to_string_lossy().into_owned();
        self.run(&["push", &local, remote_path]).await?;

        debug!(serial = %self.serial, remote_path, bytes = data.len(), "File pushed");
        Ok(())
    }
}

/// Writes an executable `adb` stand-in running `body` as a shell script.
///
/// The returned directory owns the script.
#[cfg(all(test, unix))]
pub(crate) fn fake_adb(body: &str) -> (tempfile::TempDir, PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("adb");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write fake adb");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod fake adb");
    (dir, path)
}

// ============================================================================
// Tests
// ============================================================================
