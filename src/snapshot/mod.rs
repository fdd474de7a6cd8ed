use crate::prelude::*;
use procscope_shared::ProcessTable;

mod local;
mod remote;
pub mod worker;

pub use local::LocalSource;
pub use remote::RemoteSource;

/// A host able to produce a flat process snapshot.
///
/// Sources are constructor-injected wherever they are consumed; nothing in
/// the crate reaches for a global to find one.
pub trait ProcessSnapshotSource: Send {
    /// Short human-readable description of the host, for logs and headers.
    fn label(&self) -> String;

    /// Capture a fresh flat snapshot of all processes on the host.
    fn snapshot(&self) -> Result<ProcessTable>;
}

impl ProcessSnapshotSource for Box<dyn ProcessSnapshotSource> {
    fn label(&self) -> String {
        (**self).label()
    }

    fn snapshot(&self) -> Result<ProcessTable> {
        (**self).snapshot()
    }
}
