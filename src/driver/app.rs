//! Application lifecycle helpers.
//!
//! Thin wrappers over device shell commands:
//!
//! | Operation | Shell |
//! |-----------|-------|
//! | [`Driver::active_app_activity`] | `dumpsys activity activities \| grep mResumedActivity` |
//! | [`Driver::app_launch`] | `monkey -p <pkg> -c android.intent.category.LAUNCHER 1` |
//! | [`Driver::app_terminate`] | `am force-stop <pkg>` |
//! | [`Driver::app_install`] | `pm install [-r] <remote apk>` |
//! | [`Driver::app_uninstall`] | `pm uninstall [-k] <pkg>` |
//!
//! Every helper fails with [`Error::DeviceNotReady`] on a driver without a
//! device.

// ============================================================================
// Imports
// ============================================================================

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::ui::By;
use crate::wait::Poller;

use super::core::Driver;

// ============================================================================
// Constants
// ============================================================================

const RESUMED_ACTIVITY_COMMAND: &str = "dumpsys activity activities | grep mResumedActivity";
const LAUNCHER_CATEGORY: &str = "android.intent.category.LAUNCHER";
const MONKEY_ABORTED: &str = "monkey aborted";
const PM_SUCCESS: &str = "Success";

/// Default timeout while waiting for a launched app.
pub const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(45);

/// Default interval while waiting for a launched app.
pub const DEFAULT_LAUNCH_INTERVAL: Duration = Duration::from_millis(1500);

static RECORD_BRACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(.+?)\}").expect("record regex should compile"));

// ============================================================================
// Options
// ============================================================================

/// Options for [`Driver::app_launch`].
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    /// Selectors signalling the app is ready; any one resolving is enough.
    /// Empty means no waiting.
    pub wait_for: Vec<By>,

    /// Poller used for `wait_for`.
    pub poller: Poller,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            wait_for: Vec::new(),
            poller: Poller::new(DEFAULT_LAUNCH_TIMEOUT, DEFAULT_LAUNCH_INTERVAL),
        }
    }
}

impl LaunchOptions {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a readiness selector.
    #[inline]
    #[must_use]
    pub fn wait_for(mut self, by: impl Into<By>) -> Self {
        self.wait_for.push(by.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_poller(mut self, poller: Poller) -> Self {
        self.poller = poller;
        self
    }
}

/// Options for [`Driver::app_install`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Replace an existing installation (`-r`).
    pub reinstall: bool,
}

impl InstallOptions {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { reinstall: false }
    }

    #[inline]
    #[must_use]
    pub const fn reinstall() -> Self {
        Self { reinstall: true }
    }
}

/// Options for [`Driver::app_uninstall`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UninstallOptions {
    /// Keep data and cache directories (`-k`).
    pub keep_data: bool,
}

impl UninstallOptions {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { keep_data: false }
    }

    #[inline]
    #[must_use]
    pub const fn keep_data() -> Self {
        Self { keep_data: true }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Extracts `pkg/.Activity` from a resumed-activity record.
///
/// The record looks like
/// `mResumedActivity: ActivityRecord{8a3f0e1 u0 com.android.settings/.Settings t42}`.
fn parse_resumed_activity(output: &str) -> Result<String> {
    RECORD_BRACES
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|record| record.as_str().split_whitespace().nth(2))
        .map(str::to_string)
        .ok_or_else(|| Error::shell_command(RESUMED_ACTIVITY_COMMAND, output))
}

// ============================================================================
// Driver - Apps
// ============================================================================

impl Driver {
    /// Returns the resumed activity as `package/activity`.
    ///
    /// # Errors
    ///
    /// [`Error::ShellCommand`] if the dumpsys output carries no activity
    /// record.
    pub async fn active_app_activity(&self) -> Result<String> {
        let output = self.run_shell_command(RESUMED_ACTIVITY_COMMAND, &[]).await?;
        parse_resumed_activity(&output)
    }

    /// Returns the package of the resumed activity.
    pub async fn active_app_package_name(&self) -> Result<String> {
        let activity = self.active_app_activity().await?;
        Ok(activity
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string())
    }

    /// Launches `package` through its launcher intent.
    ///
    /// With readiness selectors, returns once any of them resolves.
    ///
    /// # Errors
    ///
    /// - [`Error::ShellCommand`] if monkey aborts (unknown package)
    /// - [`Error::WaitTimeout`] if no readiness selector resolves in time
    pub async fn app_launch(&self, package: &str, options: LaunchOptions) -> Result<()> {
        let output = self
            .run_shell_command("monkey", &["-p", package, "-c", LAUNCHER_CATEGORY, "1"])
            .await?;
        if output.contains(MONKEY_ABORTED) {
            return Err(Error::shell_command(format!("monkey -p {package}"), output));
        }
        info!(package, "App launched");

        if options.wait_for.is_empty() {
            return Ok(());
        }

        let selectors = &options.wait_for;
        options
            .poller
            .until(move || async move {
                let mut last = None;
                for by in selectors {
                    match self.find_element(by.clone()).await {
                        Ok(_) => return Ok(true),
                        Err(e) => last = Some(e),
                    }
                }
                last.map_or(Ok(false), Err)
            })
            .await
    }

    /// Force-stops `package`.
    pub async fn app_terminate(&self, package: &str) -> Result<()> {
        self.run_shell_command("am", &["force-stop", package])
            .await?;
        debug!(package, "App terminated");
        Ok(())
    }

    /// Pushes a local APK to the device and installs it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if the file name does not end in `.apk`
    /// - [`Error::Io`] if the file cannot be read
    /// - [`Error::ShellCommand`] if `pm` does not report success
    pub async fn app_install(&self, apk_path: impl AsRef<Path>, options: InstallOptions) -> Result<()> {
        let device = self.ready_device()?;
        let apk_path = apk_path.as_ref();

        let file_name = apk_path
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| name.to_ascii_lowercase().ends_with(".apk"))
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "apk file must have an extension of '.apk': {}",
                    apk_path.display()
                ))
            })?;

        let data = tokio::fs::read(apk_path).await?;
        let remote_path = format!(
            "{}/{file_name}",
            self.options().device_temp_path.trim_end_matches('/')
        );
        debug!(serial = device.serial(), %remote_path, bytes = data.len(), "Pushing apk");
        device.push_file(&data, &remote_path).await?;

        let mut args = vec!["install"];
        if options.reinstall {
            args.push("-r");
        }
        args.push(&remote_path);

        let output = device.run_shell_command("pm", &args).await?;
        if !output.contains(PM_SUCCESS) {
            return Err(Error::shell_command(format!("pm {}", args.join(" ")), output));
        }

        info!(serial = device.serial(), apk = file_name, "App installed");
        Ok(())
    }

    /// Uninstalls `package`.
    ///
    /// # Errors
    ///
    /// [`Error::ShellCommand`] if `pm` does not report success.
    pub async fn app_uninstall(&self, package: &str, options: UninstallOptions) -> Result<()> {
        let mut args = vec!["uninstall"];
        if options.keep_data {
            args.push("-k");
        }
        args.push(package);

        let output = self.run_shell_command("pm", &args).await?;
        if !output.contains(PM_SUCCESS) {
            return Err(Error::shell_command(format!("pm {}", args.join(" ")), output));
        }

        info!(package, "App uninstalled");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;
    use std::sync::Arc;

    use crate::bridge::mock::MockDevice;
    use crate::bridge::{Device, DeviceState};
    use crate::driver::DriverOptions;
    use crate::identifiers::SessionId;
    use crate::protocol::Method;
    use crate::transport::mock::{MockReply, MockTransport};
    use crate::transport::{CommandExecutor, Endpoint, Session};

    const RESUMED: &str = "  mResumedActivity: ActivityRecord{8a3f0e1 u0 com.android.settings/.Settings t42}\n";

    fn driver(mock: &Arc<MockTransport>, device: Option<Arc<MockDevice>>) -> Driver {
        let executor = CommandExecutor::attach(
            mock.clone(),
            Session::new(SessionId::new("s1"), Endpoint::network("device", 6790)),
        );
        Driver::new(
            executor,
            device.map(|d| d as Arc<dyn Device>),
            None,
            DriverOptions::new(),
        )
    }

    fn device() -> Arc<MockDevice> {
        MockDevice::new("emulator-5554", DeviceState::Online)
    }

    #[test]
    fn test_parse_resumed_activity() {
        assert_eq!(
            parse_resumed_activity(RESUMED).expect("activity"),
            "com.android.settings/.Settings"
        );
    }

    #[test]
    fn test_parse_resumed_activity_without_record() {
        let err = parse_resumed_activity("\n").unwrap_err();
        assert!(matches!(err, Error::ShellCommand { .. }));
        assert!(matches!(parse_resumed_activity("{a b}"), Err(Error::ShellCommand { .. })));
    }

    #[test]
    fn test_option_defaults() {
        let launch = LaunchOptions::default();
        assert!(launch.wait_for.is_empty());
        assert_eq!(launch.poller.timeout, Duration::from_secs(45));
        assert_eq!(launch.poller.interval, Duration::from_millis(1500));
        assert!(!InstallOptions::default().reinstall);
        assert!(InstallOptions::reinstall().reinstall);
        assert!(!UninstallOptions::new().keep_data);
        assert!(UninstallOptions::keep_data().keep_data);
    }

    #[tokio::test]
    async fn test_active_app_package_name() {
        let device = device();
        device.on_shell("dumpsys activity activities", RESUMED);
        let d = driver(&MockTransport::new(), Some(device));

        assert_eq!(
            d.active_app_activity().await.expect("activity"),
            "com.android.settings/.Settings"
        );
        assert_eq!(
            d.active_app_package_name().await.expect("package"),
            "com.android.settings"
        );
    }

    #[tokio::test]
    async fn test_helpers_without_device() {
        let d = driver(&MockTransport::new(), None);
        assert!(matches!(d.active_app_activity().await, Err(Error::DeviceNotReady)));
        assert!(matches!(
            d.app_launch("com.example", LaunchOptions::new()).await,
            Err(Error::DeviceNotReady)
        ));
        assert!(matches!(d.app_terminate("com.example").await, Err(Error::DeviceNotReady)));
        assert!(matches!(
            d.app_install("app.apk", InstallOptions::new()).await,
            Err(Error::DeviceNotReady)
        ));
        assert!(matches!(
            d.app_uninstall("com.example", UninstallOptions::new()).await,
            Err(Error::DeviceNotReady)
        ));
    }

    #[tokio::test]
    async fn test_app_launch_runs_monkey() {
        let device = device();
        device.on_shell("monkey", "Events injected: 1");
        let d = driver(&MockTransport::new(), Some(device.clone()));

        d.app_launch("com.android.settings", LaunchOptions::new())
            .await
            .expect("launch");
        assert_eq!(
            *device.shell_commands.lock(),
            vec!["monkey -p com.android.settings -c android.intent.category.LAUNCHER 1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_app_launch_aborted() {
        let device = device();
        device.on_shell("monkey", "** No activities found to run, monkey aborted.");
        let d = driver(&MockTransport::new(), Some(device));

        let err = d
            .app_launch("com.missing", LaunchOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ShellCommand { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_app_launch_aborted_over_adb() {
        use crate::bridge::adb::fake_adb;
        use crate::bridge::AdbBridge;

        let (_dir, program) = fake_adb(
            "echo '** No activities found to run, monkey aborted.'\nexit 252",
        );
        let device = AdbBridge::default().with_program(program).device("emulator-5554");
        let executor = CommandExecutor::attach(
            MockTransport::new(),
            Session::new(SessionId::new("s1"), Endpoint::network("device", 6790)),
        );
        let d = Driver::new(
            executor,
            Some(Arc::new(device) as Arc<dyn Device>),
            None,
            DriverOptions::new(),
        );

        let err = d
            .app_launch("com.missing", LaunchOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ShellCommand { .. }));
        assert!(!err.is_connection_error());
    }

    #[tokio::test]
    async fn test_app_launch_waits_for_any_selector() {
        let device = device();
        device.on_shell("monkey", "Events injected: 1");
        let mock = MockTransport::new();
        mock.on_sequence(
            Method::Post,
            "/session/s1/element",
            vec![
                MockReply::status(404, r#"{"value":{"error":"no such element","message":"-"}}"#),
                MockReply::status(404, r#"{"value":{"error":"no such element","message":"-"}}"#),
                MockReply::ok(r#"{"value":{"ELEMENT":"ready"}}"#),
            ],
        );
        let d = driver(&mock, Some(device));

        let options = LaunchOptions::new()
            .wait_for(By::id("com.example:id/splash"))
            .wait_for(By::id("com.example:id/home"))
            .with_poller(Poller::new(Duration::from_secs(1), Duration::from_millis(5)));
        d.app_launch("com.example", options).await.expect("launch");

        let bodies: Vec<String> = mock
            .requests_to("/session/s1/element")
            .iter()
            .map(|r| MockTransport::body_json(r)["selector"].as_str().unwrap_or("").to_string())
            .collect();
        assert_eq!(
            bodies,
            vec!["com.example:id/splash", "com.example:id/home", "com.example:id/splash"]
        );
    }

    #[tokio::test]
    async fn test_app_launch_wait_timeout_keeps_last_error() {
        let device = device();
        device.on_shell("monkey", "Events injected: 1");
        let mock = MockTransport::new();
        mock.on(
            Method::Post,
            "/session/s1/element",
            MockReply::status(404, r#"{"value":{"error":"no such element","message":"-"}}"#),
        );
        let d = driver(&mock, Some(device));

        let options = LaunchOptions::new()
            .wait_for(By::id("never"))
            .with_poller(Poller::new(Duration::from_millis(30), Duration::from_millis(5)));
        let err = d.app_launch("com.example", options).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(err.last_error(), Some(Error::ElementNotFound { .. })));
    }

    #[tokio::test]
    async fn test_app_terminate() {
        let device = device();
        let d = driver(&MockTransport::new(), Some(device.clone()));
        d.app_terminate("com.example").await.expect("terminate");
        assert_eq!(*device.shell_commands.lock(), vec!["am force-stop com.example".to_string()]);
    }

    #[tokio::test]
    async fn test_app_install_requires_apk_extension() {
        let d = driver(&MockTransport::new(), Some(device()));
        let err = d
            .app_install("/tmp/app.zip", InstallOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_app_install_pushes_and_installs() {
        let mut apk = tempfile::Builder::new()
            .suffix(".APK")
            .tempfile()
            .expect("temp apk");
        apk.write_all(b"PK\x03\x04").expect("write apk");
        let name = apk
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .expect("file name")
            .to_string();

        let device = device();
        device.on_shell("pm install", "Performing Streamed Install\nSuccess\n");
        let d = driver(&MockTransport::new(), Some(device.clone()));

        d.app_install(apk.path(), InstallOptions::reinstall())
            .await
            .expect("install");

        let remote = format!("/data/local/tmp/{name}");
        assert_eq!(*device.pushes.lock(), vec![(b"PK\x03\x04".to_vec(), remote.clone())]);
        assert_eq!(
            *device.shell_commands.lock(),
            vec![format!("pm install -r {remote}")]
        );
    }

    #[tokio::test]
    async fn test_app_install_failure_output() {
        let apk = tempfile::Builder::new()
            .suffix(".apk")
            .tempfile()
            .expect("temp apk");

        let device = device();
        device.on_shell("pm install", "Failure [INSTALL_FAILED_INVALID_APK]");
        let d = driver(&MockTransport::new(), Some(device));

        let err = d
            .app_install(apk.path(), InstallOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ShellCommand { .. }));
        assert!(err.to_string().contains("INSTALL_FAILED_INVALID_APK"));
    }

    #[tokio::test]
    async fn test_app_uninstall_keep_data() {
        let device = device();
        device.on_shell("pm uninstall", "Success");
        let d = driver(&MockTransport::new(), Some(device.clone()));

        d.app_uninstall("com.example", UninstallOptions::keep_data())
            .await
            .expect("uninstall");
        assert_eq!(
            *device.shell_commands.lock(),
            vec!["pm uninstall -k com.example".to_string()]
        );
    }

    #[tokio::test]
    async fn test_app_uninstall_failure() {
        let device = device();
        device.on_shell("pm uninstall", "Failure [DELETE_FAILED_INTERNAL_ERROR]");
        let d = driver(&MockTransport::new(), Some(device));

        let err = d
            .app_uninstall("com.example", UninstallOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ShellCommand { .. }));
    }
}
