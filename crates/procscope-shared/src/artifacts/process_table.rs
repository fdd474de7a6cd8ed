use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Immutable snapshot of a single OS process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: i32,
    pub parent_pid: i32,
    /// Full command line, as reported by the host
    pub command: String,
    pub executable_path: String,
}

/// Flat PID-keyed snapshot of all processes on a host.
///
/// Records are captured once per query and never mutated in place. A PID
/// present here may already have exited on the host by the time it is looked
/// up again, so every parent lookup goes through [`ProcessTable::get`] and
/// tolerates a miss.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessTable {
    records: HashMap<i32, ProcessRecord>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any previous record for the same PID.
    pub fn insert(&mut self, record: ProcessRecord) {
        self.records.insert(record.pid, record);
    }

    pub fn get(&self, pid: i32) -> Option<&ProcessRecord> {
        self.records.get(&pid)
    }

    pub fn contains(&self, pid: i32) -> bool {
        self.records.contains_key(&pid)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.records.values()
    }

    /// All PIDs whose command text contains `filter` as a plain substring.
    ///
    /// The empty filter matches every process. No regex semantics.
    pub fn matching_pids(&self, filter: &str) -> Vec<i32> {
        self.records
            .values()
            .filter(|record| record.command.contains(filter))
            .map(|record| record.pid)
            .collect()
    }
}

impl FromIterator<ProcessRecord> for ProcessTable {
    fn from_iter<I: IntoIterator<Item = ProcessRecord>>(iter: I) -> Self {
        let mut table = ProcessTable::new();
        for record in iter {
            table.insert(record);
        }
        table
    }
}

impl super::ArtifactExt for ProcessTable {}
