use crate::prelude::*;
use crate::snapshot::ProcessSnapshotSource;
use procscope_shared::ProcessTable;
use std::sync::mpsc;
use std::thread;

/// Capture a snapshot off the calling thread.
///
/// Enumeration can block on a slow host, so it runs on a dedicated named
/// thread; the receiver gets exactly one message, the table or the error.
/// There is no retry, timeout, or cancellation for this hop: dropping the
/// receiver simply abandons the result.
pub fn spawn_fetch<S>(source: S) -> Result<mpsc::Receiver<Result<ProcessTable>>>
where
    S: ProcessSnapshotSource + 'static,
{
    let (tx, rx) = mpsc::channel();
    let label = source.label();

    thread::Builder::new()
        .name(format!("snapshot-{label}"))
        .spawn(move || {
            let result = source.snapshot();
            if let Err(err) = &result {
                warn!("Snapshot of {label} failed: {err:#}");
            }
            // The receiver may be gone; nothing left to report to.
            let _ = tx.send(result);
        })
        .context("Failed to spawn the snapshot worker thread")?;

    Ok(rx)
}
