// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory process registry: a name-keyed map with the uniqueness
//! invariants the supervisor enforces on every mutation.
//!
//! The supervisor loop is single-threaded and cooperative (one request or
//! one monitor sweep runs to completion before the next begins), so this
//! type carries no internal locking — unlike most collections in this
//! codebase, which guard shared state with `parking_lot::Mutex`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::record::ProcessRecord;

/// A name-keyed collection of process records.
///
/// Keyed by `BTreeMap` rather than a hash map so iteration (`list`, registry
/// snapshots on disk) is always in a deterministic, sorted order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    processes: BTreeMap<String, ProcessRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self { processes: BTreeMap::new() }
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ProcessRecord> {
        self.processes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ProcessRecord> {
        self.processes.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.processes.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ProcessRecord)> {
        self.processes.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.processes.values()
    }

    /// Find the name of the record currently bound to `port`, if any.
    pub fn port_holder(&self, port: u16) -> Option<&str> {
        self.processes
            .values()
            .find(|record| record.port == Some(port))
            .map(|record| record.name.as_str())
    }

    /// Insert a brand-new record.
    ///
    /// Rejects an empty name, a name already present, and a port already
    /// bound to a different record — the three invariants the supervisor
    /// checks before spawning a child.
    pub fn insert(&mut self, record: ProcessRecord) -> Result<(), CoreError> {
        if record.name.trim().is_empty() {
            return Err(CoreError::EmptyName(record.name));
        }
        if self.processes.contains_key(&record.name) {
            return Err(CoreError::AlreadyExists(record.name));
        }
        if let Some(port) = record.port {
            if let Some(holder) = self.port_holder(port) {
                return Err(CoreError::PortConflict(port, holder.to_string()));
            }
        }
        self.processes.insert(record.name.clone(), record);
        Ok(())
    }

    /// Replace an existing record in place (restart/reload/monitor updates).
    /// Does not re-check the port invariant: the record already owns it.
    pub fn replace(&mut self, record: ProcessRecord) -> Result<(), CoreError> {
        if !self.processes.contains_key(&record.name) {
            return Err(CoreError::NotFound(record.name));
        }
        self.processes.insert(record.name.clone(), record);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<ProcessRecord, CoreError> {
        self.processes.remove(name).ok_or_else(|| CoreError::NotFound(name.to_string()))
    }

    pub fn clear(&mut self) {
        self.processes.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::record::Status;

    fn record(name: &str, port: Option<u16>) -> ProcessRecord {
        ProcessRecord {
            name: name.to_string(),
            command: "sleep 100".to_string(),
            cwd: None,
            env: HashMap::new(),
            port,
            pid: Some(1),
            status: Status::running(),
            start_time: 0,
            stdout_log: "/tmp/a_stdout.log".to_string(),
            stderr_log: "/tmp/a_stderr.log".to_string(),
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
    fn rejects_empty_name() {
        let mut registry = Registry::new();
        let err = registry.insert(record("", None)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::UserInput);
    }

    #[test]
    fn rejects_duplicate_name() {
        let mut registry = Registry::new();
        registry.insert(record("web", None)).unwrap();
        let err = registry.insert(record("web", None)).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists(name) if name == "web"));
    }

    #[test]
    fn rejects_conflicting_port() {
        let mut registry = Registry::new();
        registry.insert(record("web", Some(8000))).unwrap();
        let err = registry.insert(record("web2", Some(8000))).unwrap_err();
        assert!(matches!(err, CoreError::PortConflict(8000, holder) if holder == "web"));
    }

    #[test]
    fn allows_distinct_ports() {
        let mut registry = Registry::new();
        registry.insert(record("web", Some(8000))).unwrap();
        registry.insert(record("api", Some(8001))).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn remove_missing_is_not_found() {
        let mut registry = Registry::new();
        let err = registry.remove("ghost").unwrap_err();
        assert!(matches!(err, CoreError::NotFound(name) if name == "ghost"));
    }

    #[test]
    fn replace_requires_existing_entry() {
        let mut registry = Registry::new();
        let err = registry.replace(record("web", None)).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn iteration_is_sorted_by_name() {
        let mut registry = Registry::new();
        registry.insert(record("zeta", None)).unwrap();
        registry.insert(record("alpha", None)).unwrap();
        let names: Vec<&str> = registry.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
