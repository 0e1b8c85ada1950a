// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle Engine: Start / Stop / Restart / Reload / Clear.
//!
//! Every public operation loads the registry fresh via [`RegistryStore`],
//! mutates its in-memory copy, and saves before returning. The supervisor
//! loop never runs two operations concurrently, so no additional locking is
//! introduced around the registry itself (see the crate-level docs).

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid as NixPid;

use pynodex_core::record::{ProcessRecord, ProcessRecordBuilder, Status};
use pynodex_core::{Clock, CoreError, Registry};
use pynodex_storage::RegistryStore;

use crate::error::LifecycleError;
use crate::launcher::{validate_port, Launcher};
use crate::probe::{OsProbe, ProcessSnapshot};

pub const ALL: &str = "all";

const GRACEFUL_WAIT: Duration = Duration::from_secs(5);
const FORCED_WAIT: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The process was signaled and is now gone.
    Stopped,
    /// The record had no PID, or the PID was already gone at lookup time.
    AlreadyGone,
}

/// Coordinates the registry store, OS probe, and child launcher to
/// implement every lifecycle transition.
pub struct LifecycleEngine<'a, C: Clock> {
    store: RegistryStore,
    probe: &'a mut OsProbe,
    logs_dir: std::path::PathBuf,
    clock: C,
}

impl<'a, C: Clock> LifecycleEngine<'a, C> {
    pub fn new(
        registry_path: impl AsRef<std::path::Path>,
        logs_dir: impl AsRef<std::path::Path>,
        probe: &'a mut OsProbe,
        clock: C,
    ) -> Self {
        Self {
            store: RegistryStore::new(&registry_path),
            probe,
            logs_dir: logs_dir.as_ref().to_path_buf(),
            clock,
        }
    }

    fn load(&self) -> Result<Registry, LifecycleError> {
        Ok(self.store.load()?)
    }

    fn save(&self, registry: &Registry) -> Result<(), LifecycleError> {
        Ok(self.store.save(registry)?)
    }

    /// Step 1 + 2 of the launcher contract, checked against the registry
    /// before the launcher itself ever spawns anything.
    fn check_collisions(registry: &Registry, name: &str, port: Option<u16>) -> Result<(), LifecycleError> {
        if registry.contains(name) {
            return Err(CoreError::AlreadyExists(name.to_string()).into());
        }
        if let Some(port) = port {
            validate_port(port).map_err(LifecycleError::Launcher)?;
            if let Some(holder) = registry.port_holder(port) {
                return Err(CoreError::PortConflict(port, holder.to_string()).into());
            }
        }
        Ok(())
    }

    pub fn start(&mut self, builder: &ProcessRecordBuilder) -> Result<ProcessRecord, LifecycleError> {
        let mut registry = self.load()?;
        Self::check_collisions(&registry, &builder.name, builder.port)?;

        let launcher = Launcher::new(&self.logs_dir);
        let record = launcher.launch(builder, &self.clock, false)?;
        registry.insert(record.clone())?;
        self.save(&registry)?;
        Ok(record)
    }

    /// Stop a single named process: graceful signal, wait, escalate, wait.
    /// Removes the record unless the OS forbade the signal.
    pub fn stop(&mut self, name: &str) -> Result<StopOutcome, LifecycleError> {
        let mut registry = self.load()?;
        let outcome = self.stop_record(&mut registry, name)?;
        self.save(&registry)?;
        Ok(outcome)
    }

    fn stop_record(&mut self, registry: &mut Registry, name: &str) -> Result<StopOutcome, LifecycleError> {
        let Some(record) = registry.get(name) else {
            return Err(CoreError::NotFound(name.to_string()).into());
        };
        let Some(pid) = record.pid else {
            registry.remove(name)?;
            return Ok(StopOutcome::AlreadyGone);
        };

        match send_signal_and_wait(pid)? {
            SignalResult::Gone => {
                registry.remove(name)?;
                Ok(StopOutcome::Stopped)
            }
            SignalResult::Forbidden => Err(LifecycleError::OsDenied(format!(
                "not permitted to signal pid {pid} for '{name}'"
            ))),
        }
    }

    /// Restart every targeted name: stop (tolerating already-dead), then
    /// start with the record's stored parameters. A per-name failure does
    /// not abort the batch; returns the count of names successfully
    /// restarted.
    pub fn restart(&mut self, target: &str) -> Result<usize, LifecycleError> {
        let names = self.resolve_targets(target)?;
        let mut restarted = 0;
        for name in names {
            let mut registry = self.load()?;
            let Some(record) = registry.get(&name).cloned() else { continue };
            let builder = ProcessRecordBuilder::from_record(&record);

            let _ = self.stop_record(&mut registry, &name);
            self.save(&registry)?;

            let mut registry = self.load()?;
            let launcher = Launcher::new(&self.logs_dir);
            match launcher.launch(&builder, &self.clock, false) {
                Ok(new_record) => {
                    // `stop_record` already removed `name` from the registry,
                    // so this is always an insert, never a replace.
                    let inserted = if registry.get(&name).is_none() {
                        registry.insert(new_record).is_ok()
                    } else {
                        registry.replace(new_record).is_ok()
                    };
                    if inserted {
                        restarted += 1;
                    }
                }
                Err(err) => {
                    tracing::warn!(name = %name, error = %err, "restart failed to relaunch");
                }
            }
            self.save(&registry)?;
        }
        Ok(restarted)
    }

    /// Start a new instance before stopping the old one (not zero-downtime,
    /// per spec). On start failure, stop the old instance and retry once.
    pub fn reload(&mut self, target: &str) -> Result<usize, LifecycleError> {
        let names = self.resolve_targets(target)?;
        let mut reloaded = 0;
        for name in names {
            let mut registry = self.load()?;
            let Some(old_record) = registry.get(&name).cloned() else { continue };
            let builder = ProcessRecordBuilder::from_record(&old_record);
            let launcher = Launcher::new(&self.logs_dir);

            let first_attempt = launcher.launch(&builder, &self.clock, false);
            let launched = match first_attempt {
                Ok(new_record) => Some(new_record),
                Err(_) => {
                    let _ = self.stop_record(&mut registry, &name);
                    launcher.launch(&builder, &self.clock, false).ok()
                }
            };

            if let Some(new_record) = launched {
                if let Some(old_pid) = old_record.pid {
                    let _ = send_signal_and_wait(old_pid);
                }
                // `replace` requires the name to already be present; the old
                // record is still registered under `name` at this point.
                if registry.get(&name).is_none() {
                    registry.insert(new_record).ok();
                } else {
                    registry.replace(new_record).ok();
                }
                reloaded += 1;
            }
            self.save(&registry)?;
        }
        Ok(reloaded)
    }

    /// Stop then remove each targeted record and delete its log files.
    /// Targeting `all` also purges and recreates the whole log directory.
    pub fn clear(&mut self, target: &str) -> Result<(), LifecycleError> {
        let names = self.resolve_targets(target)?;
        for name in names {
            let mut registry = self.load()?;
            if let Some(record) = registry.get(&name).cloned() {
                let _ = self.stop_record(&mut registry, &name);
                registry.remove(&name).ok();
                delete_log_files(&record);
            }
            self.save(&registry)?;
        }

        if target == ALL {
            let _ = std::fs::remove_dir_all(&self.logs_dir);
            std::fs::create_dir_all(&self.logs_dir).ok();
        }
        Ok(())
    }

    /// Persist the current in-memory registry view unchanged.
    pub fn save_current(&self) -> Result<(), LifecycleError> {
        let registry = self.load()?;
        self.save(&registry)
    }

    /// Merge each record with a live OS probe for the `list` response.
    pub fn list(&mut self) -> Result<HashMap<String, (ProcessRecord, Status)>, LifecycleError> {
        let registry = self.load()?;
        let mut merged = HashMap::new();
        for (name, record) in registry.iter() {
            let live_status = match record.pid {
                Some(pid) => match self.probe.probe(pid) {
                    ProcessSnapshot::Found { .. } => Status::running(),
                    ProcessSnapshot::NotFound => Status::dead_not_found(),
                    ProcessSnapshot::AccessDenied => Status::access_denied(),
                },
                None => Status::stopped(),
            };
            merged.insert(name.clone(), (record.clone(), live_status));
        }
        Ok(merged)
    }

    fn resolve_targets(&self, target: &str) -> Result<Vec<String>, LifecycleError> {
        if target == ALL {
            let registry = self.load()?;
            return Ok(registry.iter().map(|(name, _)| name.clone()).collect());
        }
        Ok(vec![target.to_string()])
    }
}

enum SignalResult {
    Gone,
    Forbidden,
}

fn send_signal_and_wait(pid: u32) -> Result<SignalResult, LifecycleError> {
    let Ok(raw_pid) = i32::try_from(pid) else { return Ok(SignalResult::Gone) };
    let nix_pid = NixPid::from_raw(raw_pid);

    match kill(nix_pid, Signal::SIGTERM) {
        Err(Errno::ESRCH) => return Ok(SignalResult::Gone),
        Err(Errno::EPERM) => return Ok(SignalResult::Forbidden),
        _ => {}
    }

    if wait_for_exit(nix_pid, GRACEFUL_WAIT) {
        return Ok(SignalResult::Gone);
    }

    match kill(nix_pid, Signal::SIGKILL) {
        Err(Errno::ESRCH) => return Ok(SignalResult::Gone),
        Err(Errno::EPERM) => return Ok(SignalResult::Forbidden),
        _ => {}
    }

    if wait_for_exit(nix_pid, FORCED_WAIT) {
        Ok(SignalResult::Gone)
    } else {
        // Still alive after the forced wait: treat as gone from the
        // registry's perspective per spec table (only "forbidden by OS"
        // keeps the record); log so an operator can investigate.
        tracing::warn!(pid = raw_pid, "process did not exit after SIGKILL within the forced wait");
        Ok(SignalResult::Gone)
    }
}

fn wait_for_exit(pid: NixPid, timeout: Duration) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    loop {
        match kill(pid, None) {
            Err(Errno::ESRCH) => return true,
            _ => {
                if std::time::Instant::now() >= deadline {
                    return false;
                }
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

fn delete_log_files(record: &ProcessRecord) {
    if record.has_capture_files() {
        let _ = std::fs::remove_file(&record.stdout_log);
        if record.stderr_log != record.stdout_log {
            let _ = std::fs::remove_file(&record.stderr_log);
        }
    }
}
