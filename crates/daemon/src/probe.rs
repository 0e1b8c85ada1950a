// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OS Probe: point-in-time facts about a PID, straight from the kernel.
//!
//! Liveness and permission are checked with a signal-0 `kill` (the standard
//! Unix idiom: `ESRCH` means gone, `EPERM` means alive but owned by someone
//! else), then `sysinfo` fills in the resource metrics when readable.

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid as NixPid;
use sysinfo::{Pid, System};

/// A point-in-time snapshot of one OS process, or the reason none was found.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessSnapshot {
    Found {
        pid: u32,
        cpu_percent: f32,
        /// Resident set size, in megabytes (1 MB = 1024² bytes).
        rss_mb: f64,
        memory_percent: f32,
        cmdline: String,
        create_time: u64,
    },
    NotFound,
    /// The PID exists but belongs to another user; metrics are unobservable.
    AccessDenied,
}

/// Thin wrapper over a persistent `sysinfo::System`.
///
/// Kept alive across calls (rather than constructed fresh per probe) so
/// `cpu_percent` reflects a real delta between refreshes instead of always
/// reading zero on the first sample.
pub struct OsProbe {
    system: System,
}

impl OsProbe {
    pub fn new() -> Self {
        Self { system: System::new_all() }
    }

    /// Probe one PID for its current liveness and resource usage.
    pub fn probe(&mut self, pid: u32) -> ProcessSnapshot {
        let Ok(raw_pid) = i32::try_from(pid) else {
            return ProcessSnapshot::NotFound;
        };
        let nix_pid = NixPid::from_raw(raw_pid);

        match kill(nix_pid, None) {
            Err(Errno::ESRCH) => return ProcessSnapshot::NotFound,
            Err(Errno::EPERM) => return ProcessSnapshot::AccessDenied,
            Err(_) => return ProcessSnapshot::NotFound,
            Ok(()) => {}
        }

        self.system.refresh_all();
        let sys_pid = Pid::from_u32(pid);
        match self.system.process(sys_pid) {
            Some(process) => {
                let rss_bytes = process.memory();
                let rss_mb = rss_bytes as f64 / (1024.0 * 1024.0);
                let total_bytes = self.system.total_memory().max(1);
                let memory_percent = (rss_bytes as f64 / total_bytes as f64 * 100.0) as f32;
                let cmdline = process
                    .cmd()
                    .iter()
                    .map(|part| part.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(" ");

                ProcessSnapshot::Found {
                    pid,
                    cpu_percent: process.cpu_usage(),
                    rss_mb,
                    memory_percent,
                    cmdline,
                    create_time: process.start_time(),
                }
            }
            // Alive per kill(2) but sysinfo hasn't observed it yet (race just
            // after spawn, or a kernel thread sysinfo doesn't enumerate).
            None => ProcessSnapshot::Found {
                pid,
                cpu_percent: 0.0,
                rss_mb: 0.0,
                memory_percent: 0.0,
                cmdline: String::new(),
                create_time: 0,
            },
        }
    }
}

impl Default for OsProbe {
    fn default() -> Self {
        Self::new()
    }
}
