use crate::prelude::*;
use crate::snapshot::ProcessSnapshotSource;
use itertools::Itertools;
use procscope_shared::{ProcessRecord, ProcessTable};
use sysinfo::{ProcessRefreshKind, RefreshKind, System, UpdateKind};

/// Snapshot source for the machine procscope itself runs on, backed by
/// sysinfo.
#[derive(Debug, Default)]
pub struct LocalSource;

impl LocalSource {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSnapshotSource for LocalSource {
    fn label(&self) -> String {
        "local".to_string()
    }

    fn snapshot(&self) -> Result<ProcessTable> {
        let system = System::new_with_specifics(
            RefreshKind::nothing().with_processes(
                ProcessRefreshKind::nothing()
                    .with_cmd(UpdateKind::Always)
                    .with_exe(UpdateKind::Always),
            ),
        );

        let mut table = ProcessTable::new();
        for (pid, process) in system.processes() {
            // Kernel threads report an empty cmdline; fall back to the name
            // so the filter still has text to match against.
            let command = if process.cmd().is_empty() {
                process.name().to_string_lossy().into_owned()
            } else {
                process
                    .cmd()
                    .iter()
                    .map(|arg| arg.to_string_lossy())
                    .join(" ")
            };

            table.insert(ProcessRecord {
                pid: pid.as_u32() as i32,
                parent_pid: process
                    .parent()
                    .map(|parent| parent.as_u32() as i32)
                    .unwrap_or(0),
                command,
                executable_path: process
                    .exe()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default(),
            });
        }

        debug!("Captured {} local processes", table.len());
        Ok(table)
    }
}
