use crate::prelude::*;
use crate::snapshot::ProcessSnapshotSource;
use libc::pid_t;
use procscope_shared::{ProcessRecord, ProcessTable};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation handle shared between the requester and the
/// preparation phases. Cloning hands out another view of the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A process vetted for debugger attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachTarget {
    pub record: ProcessRecord,
    pub executable_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareOutcome {
    Prepared(AttachTarget),
    Cancelled,
}

/// Prepare `pid` for attach in discrete phases.
///
/// Each phase checks the cancellation flag before doing any work and exits
/// early when it is set, so a cancelled preparation never reports partial
/// side effects as success.
pub fn prepare_target(
    source: &dyn ProcessSnapshotSource,
    table: &ProcessTable,
    pid: pid_t,
    cancel: &CancelFlag,
) -> Result<PrepareOutcome> {
    // Phase 1: locate the record in the snapshot.
    if cancel.is_cancelled() {
        return Ok(PrepareOutcome::Cancelled);
    }
    let record = table
        .get(pid)
        .with_context(|| format!("Process {pid} is not in the snapshot, it may have exited"))?
        .clone();

    // Phase 2: resolve the executable.
    if cancel.is_cancelled() {
        return Ok(PrepareOutcome::Cancelled);
    }
    if record.command.starts_with('[') {
        bail!("Process {pid} is a kernel thread and cannot be attached to");
    }
    let executable_path = if record.executable_path.is_empty() {
        record
            .command
            .split_whitespace()
            .next()
            .map(str::to_string)
            .with_context(|| format!("Process {pid} has no executable path or command"))?
    } else {
        record.executable_path.clone()
    };
    debug!("Resolved executable for {pid}: {executable_path}");

    // Phase 3: confirm the process is still alive on the host.
    if cancel.is_cancelled() {
        return Ok(PrepareOutcome::Cancelled);
    }
    let fresh = source
        .snapshot()
        .with_context(|| format!("Failed to re-probe {} before attach", source.label()))?;
    if !fresh.contains(pid) {
        bail!("Process {pid} exited during preparation");
    }

    Ok(PrepareOutcome::Prepared(AttachTarget {
        record,
        executable_path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubSource {
        alive: Vec<i32>,
        probes: Mutex<usize>,
    }

    impl StubSource {
        fn with_alive(alive: Vec<i32>) -> Self {
            Self {
                alive,
                probes: Mutex::new(0),
            }
        }

        fn probe_count(&self) -> usize {
            *self.probes.lock().unwrap()
        }
    }

    impl ProcessSnapshotSource for StubSource {
        fn label(&self) -> String {
            "stub".to_string()
        }

        fn snapshot(&self) -> Result<ProcessTable> {
            *self.probes.lock().unwrap() += 1;
            Ok(self
                .alive
                .iter()
                .map(|&pid| ProcessRecord {
                    pid,
                    parent_pid: 1,
                    command: format!("proc-{pid}"),
                    executable_path: format!("/usr/bin/proc-{pid}"),
                })
                .collect())
        }
    }

    fn table_with(pid: i32, command: &str, executable_path: &str) -> ProcessTable {
        [ProcessRecord {
            pid,
            parent_pid: 1,
            command: command.to_string(),
            executable_path: executable_path.to_string(),
        }]
        .into_iter()
        .collect()
    }

    #[test]
    fn prepares_a_live_process() {
        let source = StubSource::with_alive(vec![99]);
        let table = table_with(99, "myd --serve", "/usr/bin/myd");

        let outcome = prepare_target(&source, &table, 99, &CancelFlag::new()).unwrap();

        let PrepareOutcome::Prepared(target) = outcome else {
            panic!("expected a prepared target");
        };
        assert_eq!(target.executable_path, "/usr/bin/myd");
        assert_eq!(target.record.pid, 99);
    }

    #[test]
    fn falls_back_to_the_command_for_the_executable() {
        let source = StubSource::with_alive(vec![99]);
        let table = table_with(99, "/opt/tool/bin/serve --port 80", "");

        let outcome = prepare_target(&source, &table, 99, &CancelFlag::new()).unwrap();

        let PrepareOutcome::Prepared(target) = outcome else {
            panic!("expected a prepared target");
        };
        assert_eq!(target.executable_path, "/opt/tool/bin/serve");
    }

    #[test]
    fn a_cancelled_flag_short_circuits_before_any_probe() {
        let source = StubSource::with_alive(vec![99]);
        let table = table_with(99, "myd", "/usr/bin/myd");
        let cancel = CancelFlag::new();
        cancel.cancel();

        let outcome = prepare_target(&source, &table, 99, &cancel).unwrap();

        assert_eq!(outcome, PrepareOutcome::Cancelled);
        assert_eq!(source.probe_count(), 0);
    }

    #[test]
    fn a_missing_pid_is_an_error() {
        let source = StubSource::with_alive(vec![]);
        let table = ProcessTable::new();

        let err = prepare_target(&source, &table, 123, &CancelFlag::new()).unwrap_err();
        assert!(err.to_string().contains("123"));
    }

    #[test]
    fn kernel_threads_are_rejected() {
        let source = StubSource::with_alive(vec![2]);
        let table = table_with(2, "[kthreadd]", "");

        let err = prepare_target(&source, &table, 2, &CancelFlag::new()).unwrap_err();
        assert!(err.to_string().contains("kernel thread"));
    }

    #[test]
    fn a_process_that_exits_mid_preparation_is_an_error() {
        let source = StubSource::with_alive(vec![]);
        let table = table_with(99, "myd", "/usr/bin/myd");

        let err = prepare_target(&source, &table, 99, &CancelFlag::new()).unwrap_err();
        assert!(err.to_string().contains("exited"));
        assert_eq!(source.probe_count(), 1);
    }

    #[test]
    fn clones_share_the_same_flag() {
        let cancel = CancelFlag::new();
        let view = cancel.clone();
        view.cancel();
        assert!(cancel.is_cancelled());
    }
}
