use crate::prelude::*;
use crate::snapshot::ProcessSnapshotSource;
use procscope_shared::{ProcessRecord, ProcessTable};
use std::process::Command;

/// Columns requested from the remote `ps`. The `=` suffix suppresses the
/// header line.
const PS_COLUMNS: &str = "pid=,ppid=,comm=,args=";

/// Snapshot source for a remote host reached over ssh.
///
/// Runs `ssh <host> ps -e -o pid=,ppid=,comm=,args=` and parses the output.
/// The ssh command itself can be overridden (e.g. `ssh -J bastion`).
#[derive(Debug)]
pub struct RemoteSource {
    host: String,
    ssh_command: Vec<String>,
}

impl RemoteSource {
    pub fn new(host: &str, ssh_override: Option<&str>) -> Result<Self> {
        let ssh_command = match ssh_override {
            Some(raw) => shell_words::split(raw)
                .with_context(|| format!("Failed to parse ssh command override {raw:?}"))?,
            None => vec!["ssh".to_string()],
        };
        if ssh_command.is_empty() {
            bail!("The ssh command override is empty");
        }

        Ok(Self {
            host: host.to_string(),
            ssh_command,
        })
    }
}

impl ProcessSnapshotSource for RemoteSource {
    fn label(&self) -> String {
        self.host.clone()
    }

    fn snapshot(&self) -> Result<ProcessTable> {
        let output = Command::new(&self.ssh_command[0])
            .args(&self.ssh_command[1..])
            .arg(&self.host)
            .args(["ps", "-e", "-o", PS_COLUMNS])
            .output()
            .with_context(|| format!("Failed to run {} for {}", self.ssh_command[0], self.host))?;

        if !output.status.success() {
            bail!(
                "ps on {} failed ({}): {}",
                self.host,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let table = parse_ps_output(&String::from_utf8_lossy(&output.stdout));
        debug!("Captured {} processes from {}", table.len(), self.host);
        Ok(table)
    }
}

/// Parse `ps -e -o pid=,ppid=,comm=,args=` output into a table.
///
/// Malformed lines are skipped, not fatal: a remote `ps` racing with process
/// churn occasionally emits truncated lines.
pub(crate) fn parse_ps_output(output: &str) -> ProcessTable {
    let mut table = ProcessTable::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(pid), Some(ppid), Some(comm)) = (fields.next(), fields.next(), fields.next())
        else {
            debug!("Skipping malformed ps line: {line:?}");
            continue;
        };
        let (Ok(pid), Ok(parent_pid)) = (pid.parse::<i32>(), ppid.parse::<i32>()) else {
            debug!("Skipping ps line with non-numeric pid: {line:?}");
            continue;
        };

        let args = fields.collect::<Vec<_>>().join(" ");
        // Kernel threads have no args column; `comm` (shown bracketed by
        // some ps builds) is all the text there is.
        let command = if args.is_empty() {
            comm.to_string()
        } else {
            args.clone()
        };
        let executable_path = args
            .split_whitespace()
            .next()
            .filter(|first| first.starts_with('/'))
            .unwrap_or_default()
            .to_string();

        table.insert(ProcessRecord {
            pid,
            parent_pid,
            command,
            executable_path,
        });
    }

    table
}
