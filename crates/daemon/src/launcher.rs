// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child Launcher: spawns a managed child exactly per the seven-step
//! contract (name check, port check, environment composition, output
//! redirection, spawn, handle release, registration).

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::net::TcpListener;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use pynodex_core::record::{LogMode, ProcessRecord, ProcessRecordBuilder, Status, CONSOLE_SENTINEL};
use pynodex_core::Clock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("port {0} is out of range [1024, 65535]")]
    PortOutOfRange(u16),

    #[error("working directory does not exist: {0}")]
    CwdMissing(String),

    #[error("failed to bind 127.0.0.1:{0}: already in use")]
    PortInUse(u16),

    #[error("failed to open log file {path}: {source}")]
    LogFile { path: String, #[source] source: std::io::Error },

    #[error("failed to spawn command: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Check whether `port` is free by binding and immediately releasing a
/// stream socket on the loopback interface. Advisory only — a TOCTOU race
/// between this check and the child's own bind is accepted (spec design).
pub fn port_is_free(port: u16) -> bool {
    TcpListener::bind(("127.0.0.1", port)).is_ok()
}

pub fn validate_port(port: u16) -> Result<(), LauncherError> {
    if !(1024..=65535).contains(&port) {
        return Err(LauncherError::PortOutOfRange(port));
    }
    if !port_is_free(port) {
        return Err(LauncherError::PortInUse(port));
    }
    Ok(())
}

/// Resolve the concrete stdout/stderr log paths for a record about to be
/// (re)started, and whether it represents the console sentinel.
fn resolve_log_paths(
    name: &str,
    log_mode: LogMode,
    custom_log_path: Option<&str>,
    logs_dir: &Path,
    unsupervised: bool,
) -> (String, String) {
    match log_mode {
        LogMode::NoCapture if unsupervised => {
            (CONSOLE_SENTINEL.to_string(), CONSOLE_SENTINEL.to_string())
        }
        // Inside the daemon, no-capture still gets real files: the daemon
        // always captures output for processes it supervises.
        LogMode::NoCapture | LogMode::Default => {
            let stdout = logs_dir.join(format!("{name}_stdout.log"));
            let stderr = logs_dir.join(format!("{name}_stderr.log"));
            (stdout.display().to_string(), stderr.display().to_string())
        }
        LogMode::CustomPath => {
            let path = custom_log_path.unwrap_or_default().to_string();
            (path.clone(), path)
        }
    }
}

/// Spawns children and turns the result into a fresh [`ProcessRecord`].
pub struct Launcher<'a> {
    pub logs_dir: &'a Path,
}

impl<'a> Launcher<'a> {
    pub fn new(logs_dir: &'a Path) -> Self {
        Self { logs_dir }
    }

    /// Spawn `builder`'s command and build the resulting record.
    ///
    /// `unsupervised` is true only for a direct (non-daemon) start path;
    /// the daemon itself always passes `false`, so `"no-capture"` inside the
    /// daemon still captures to real files (spec §4.3 step 4).
    pub fn launch(
        &self,
        builder: &ProcessRecordBuilder,
        clock: &impl Clock,
        unsupervised: bool,
    ) -> Result<ProcessRecord, LauncherError> {
        if let Some(cwd) = &builder.cwd {
            if !Path::new(cwd).is_dir() {
                return Err(LauncherError::CwdMissing(cwd.clone()));
            }
        }

        std::fs::create_dir_all(self.logs_dir).ok();

        let (stdout_log, stderr_log) = resolve_log_paths(
            &builder.name,
            builder.log_mode,
            builder.custom_log_path.as_deref(),
            self.logs_dir,
            unsupervised,
        );

        let mut command = Command::new("sh");
        command.arg("-c").arg(&builder.command);

        if let Some(cwd) = &builder.cwd {
            command.current_dir(cwd);
        }

        let env = compose_environment(&builder.env);
        command.env_clear();
        command.envs(env);

        configure_stdio(&mut command, &stdout_log, &stderr_log, unsupervised)?;

        // New process group (pgid == child's own pid) so signals sent to the
        // daemon's process group never reach the child transitively. Uses
        // the stable safe `process_group` API rather than an unsafe
        // `pre_exec` + `setsid` (this workspace forbids unsafe code).
        command.process_group(0);

        let child = command.spawn()?;
        let pid = child.id();
        // Drop our handle to the `Child`; we never `wait()` on it (the
        // supervisor tracks it purely by PID via the OS probe) and letting
        // it go out of scope releases our copies of the log file handles.
        std::mem::drop(child);

        Ok(ProcessRecord {
            name: builder.name.clone(),
            command: builder.command.clone(),
            cwd: builder.cwd.clone(),
            env: builder.env.clone(),
            port: builder.port,
            pid: Some(pid),
            status: Status::running(),
            start_time: clock.epoch_ms(),
            stdout_log,
            stderr_log,
            max_cpu_restart: builder.max_cpu_restart,
            max_memory_restart: builder.max_memory_restart.clone(),
            restart_delay_ms: builder.restart_delay_ms,
            no_autorestart: builder.no_autorestart,
            watch: builder.watch,
            cron: builder.cron.clone(),
            time_prefix_logs: builder.time_prefix_logs,
        })
    }
}

fn compose_environment(overlay: &HashMap<String, String>) -> HashMap<String, String> {
    let mut env: HashMap<String, String> = std::env::vars().collect();
    for (key, value) in overlay {
        env.insert(key.clone(), value.clone());
    }
    env
}

fn configure_stdio(
    command: &mut Command,
    stdout_log: &str,
    stderr_log: &str,
    unsupervised: bool,
) -> Result<(), LauncherError> {
    if unsupervised && stdout_log == CONSOLE_SENTINEL {
        command.stdout(Stdio::inherit());
        command.stderr(Stdio::inherit());
        command.stdin(Stdio::null());
        return Ok(());
    }

    let open = |path: &str| -> Result<std::fs::File, LauncherError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| LauncherError::LogFile { path: path.to_string(), source })
    };

    if stdout_log == stderr_log {
        let file = open(stdout_log)?;
        let stderr_file = file.try_clone().map_err(|source| LauncherError::LogFile {
            path: stderr_log.to_string(),
            source,
        })?;
        command.stdout(file);
        command.stderr(stderr_file);
    } else {
        command.stdout(open(stdout_log)?);
        command.stderr(open(stderr_log)?);
    }
    command.stdin(Stdio::null());
    Ok(())
}

/// Resolve an absolute log directory path, creating it if necessary.
pub fn ensure_logs_dir(path: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(path)?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pynodex_core::SystemClock;

    fn builder(name: &str, command: &str) -> ProcessRecordBuilder {
        ProcessRecordBuilder {
            name: name.to_string(),
            command: command.to_string(),
            cwd: None,
            env: HashMap::new(),
            port: None,
            log_mode: LogMode::Default,
            custom_log_path: None,
            max_cpu_restart: None,
            max_memory_restart: None,
            restart_delay_ms: None,
            no_autorestart: false,
            watch: false,
            cron: None,
            time_prefix_logs: false,
        }
    }

    #[test]
    fn launch_spawns_and_captures_default_logs() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Launcher::new(dir.path());
        let record = launcher.launch(&builder("sleeper", "sleep 5"), &SystemClock, false).unwrap();

        assert!(record.pid.is_some());
        assert_eq!(record.stdout_log, dir.path().join("sleeper_stdout.log").display().to_string());
        assert!(Path::new(&record.stdout_log).exists());

        // Clean up: the spawned child would otherwise outlive the test.
        if let Some(pid) = record.pid {
            let _ = nix::sys::signal::kill(
                nix::unistd::Pid::from_raw(pid as i32),
                nix::sys::signal::Signal::SIGKILL,
            );
        }
    }

    #[test]
    fn launch_rejects_missing_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Launcher::new(dir.path());
        let mut record_builder = builder("ghost-cwd", "echo hi");
        record_builder.cwd = Some("/no/such/directory/at/all".to_string());

        let err = launcher.launch(&record_builder, &SystemClock, false).unwrap_err();
        assert!(matches!(err, LauncherError::CwdMissing(_)));
    }

    #[test]
    fn unsupervised_no_capture_uses_console_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Launcher::new(dir.path());
        let mut record_builder = builder("console", "true");
        record_builder.log_mode = LogMode::NoCapture;

        let record = launcher.launch(&record_builder, &SystemClock, true).unwrap();
        assert_eq!(record.stdout_log, CONSOLE_SENTINEL);
        assert_eq!(record.stderr_log, CONSOLE_SENTINEL);
    }

    #[test]
    fn daemon_side_no_capture_still_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Launcher::new(dir.path());
        let mut record_builder = builder("daemon-side", "true");
        record_builder.log_mode = LogMode::NoCapture;

        let record = launcher.launch(&record_builder, &SystemClock, false).unwrap();
        assert_ne!(record.stdout_log, CONSOLE_SENTINEL);
    }

    #[test]
    fn validate_port_rejects_privileged_range() {
        assert!(matches!(validate_port(80), Err(LauncherError::PortOutOfRange(80))));
    }
}
