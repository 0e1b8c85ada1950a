// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Policy Monitor: the periodic sweep that detects exits, enforces the
//! CPU/memory ceilings, and auto-restarts opted-in children.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use pynodex_core::record::{ProcessRecordBuilder, Status};
use pynodex_core::{parse_memory_limit, Clock, Registry};
use pynodex_storage::RegistryStore;

use crate::error::LifecycleError;
use crate::lifecycle::LifecycleEngine;
use crate::probe::{OsProbe, ProcessSnapshot};

/// Runs one sweep at a time; holds no state between calls beyond the paths
/// it was constructed with (the registry itself is the source of truth,
/// reloaded fresh at the start of every sweep per the re-entrancy rule).
pub struct PolicyMonitor<C: Clock> {
    registry_path: PathBuf,
    logs_dir: PathBuf,
    clock: C,
}

impl<C: Clock> PolicyMonitor<C> {
    pub fn new(registry_path: impl AsRef<std::path::Path>, logs_dir: impl AsRef<std::path::Path>, clock: C) -> Self {
        Self {
            registry_path: registry_path.as_ref().to_path_buf(),
            logs_dir: logs_dir.as_ref().to_path_buf(),
            clock,
        }
    }

    /// Perform one sweep over every record in the registry. State changes
    /// from steps 1-5 are persisted before any restart is attempted; each
    /// restart then reloads and saves the registry again on its own.
    pub fn sweep(&self, probe: &mut OsProbe) -> Result<(), LifecycleError> {
        let store = RegistryStore::new(&self.registry_path);
        let mut registry = store.load()?;
        let names: Vec<String> = registry.iter().map(|(name, _)| name.clone()).collect();

        let mut to_restart = Vec::new();
        let mut changed = false;

        for name in &names {
            let Some(record) = registry.get(name).cloned() else { continue };

            match record.pid {
                Some(pid) => match probe.probe(pid) {
                    ProcessSnapshot::NotFound => {
                        set_status(&mut registry, name, Status::dead_not_found());
                        changed = true;
                        tracing::warn!(name = %name, "process not found, marking dead");
                        if !record.no_autorestart {
                            to_restart.push(name.clone());
                        }
                    }
                    ProcessSnapshot::AccessDenied => {
                        // Step 5: leave untouched, metrics unobservable.
                    }
                    ProcessSnapshot::Found { cpu_percent, rss_mb, .. } => {
                        set_status(&mut registry, name, Status::running());
                        changed = true;

                        let over_cpu = record
                            .max_cpu_restart
                            .is_some_and(|ceiling| f64::from(cpu_percent) > ceiling);
                        let over_memory = record
                            .max_memory_restart
                            .as_deref()
                            .and_then(parse_memory_limit)
                            .is_some_and(|ceiling_mb| rss_mb > ceiling_mb);

                        if over_cpu {
                            tracing::warn!(name = %name, cpu_percent, "exceeded max_cpu_restart, restarting");
                            to_restart.push(name.clone());
                        } else if over_memory {
                            tracing::warn!(name = %name, rss_mb, "exceeded max_memory_restart, restarting");
                            to_restart.push(name.clone());
                        }
                    }
                },
                None if record.status.is_running() => {
                    set_status(&mut registry, name, Status::dead_not_found());
                    changed = true;
                    tracing::warn!(name = %name, "record marked running with no pid, treating as crashed");
                    if !record.no_autorestart {
                        to_restart.push(name.clone());
                    }
                }
                None => {}
            }
        }

        if changed {
            store.save(&registry)?;
        }

        for name in to_restart {
            self.restart_one(&name, probe);
        }

        Ok(())
    }

    fn restart_one(&self, name: &str, probe: &mut OsProbe) {
        let store = RegistryStore::new(&self.registry_path);
        let registry = match store.load() {
            Ok(registry) => registry,
            Err(err) => {
                tracing::warn!(name, error = %err, "restart helper could not load registry");
                return;
            }
        };
        let Some(record) = registry.get(name).cloned() else { return };
        let builder = ProcessRecordBuilder::from_record(&record);

        if let Some(delay_ms) = record.restart_delay_ms {
            thread::sleep(Duration::from_millis(delay_ms));
        }

        let mut engine = LifecycleEngine::new(&self.registry_path, &self.logs_dir, probe, self.clock.clone());
        match engine.stop(name) {
            Ok(_) => {}
            Err(LifecycleError::OsDenied(reason)) => {
                tracing::warn!(name, reason, "restart helper could not stop process, skipping");
                return;
            }
            // Not found (already removed by a concurrent operation): tolerate
            // and still attempt the start, matching "stop, tolerating already dead".
            Err(err) => tracing::warn!(name, error = %err, "restart helper stop failed, continuing"),
        }

        match engine.start(&builder) {
            Ok(new_record) => {
                tracing::info!(name, pid = new_record.pid, "policy monitor restarted process");
            }
            Err(err) => {
                tracing::warn!(name, error = %err, "policy monitor failed to restart process");
            }
        }
    }
}

fn set_status(registry: &mut Registry, name: &str, status: Status) {
    if let Some(record) = registry.get_mut(name) {
        record.status = status;
    }
}
