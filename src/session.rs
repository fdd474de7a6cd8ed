use crate::filter::ProcessFilter;
use crate::forest::build_forest;
use procscope_shared::{ProcessForest, ProcessTable};
use std::sync::Mutex;

/// A captured snapshot paired with a live filter.
///
/// Front-ends hand the session their snapshot once and then drive it through
/// [`FilterSession::set_filter`] as the user types; the forest is rebuilt
/// only when the filter actually changes. Each rebuild starts from scratch,
/// there is no incremental update of a previous forest.
pub struct FilterSession {
    table: ProcessTable,
    filter: ProcessFilter,
    forest: Mutex<ProcessForest>,
}

impl FilterSession {
    /// Build a session over a snapshot, with the initial (empty) filter
    /// already applied.
    pub fn new(table: ProcessTable) -> Self {
        let filter = ProcessFilter::new();
        let forest = Mutex::new(build_forest(&table, &filter.get()));
        Self {
            table,
            filter,
            forest,
        }
    }

    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    /// The filter value holder, for observers interested in changes.
    pub fn filter(&self) -> &ProcessFilter {
        &self.filter
    }

    /// Update the filter and rebuild the forest when it changed. Returns
    /// whether a rebuild happened.
    pub fn set_filter(&self, text: &str) -> bool {
        if !self.filter.set(text) {
            return false;
        }
        let rebuilt = build_forest(&self.table, text);
        *self.forest.lock().expect("forest mutex poisoned") = rebuilt;
        true
    }

    pub fn forest(&self) -> ProcessForest {
        self.forest.lock().expect("forest mutex poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procscope_shared::ProcessRecord;

    fn table() -> ProcessTable {
        [
            (1, 0, "init"),
            (10, 1, "bash --login"),
            (20, 10, "vim notes.txt"),
            (30, 1, "cron"),
        ]
        .into_iter()
        .map(|(pid, parent_pid, command)| ProcessRecord {
            pid,
            parent_pid,
            command: command.to_string(),
            executable_path: String::new(),
        })
        .collect()
    }

    #[test]
    fn starts_with_the_unfiltered_forest() {
        let session = FilterSession::new(table());
        assert_eq!(session.forest().node_count(), 4);
    }

    #[test]
    fn changing_the_filter_rebuilds() {
        let session = FilterSession::new(table());

        assert!(session.set_filter("vim"));
        let forest = session.forest();
        assert!(forest.contains(20));
        assert!(!forest.contains(30));
    }

    #[test]
    fn an_equal_filter_does_not_rebuild() {
        let session = FilterSession::new(table());

        assert!(!session.set_filter(""), "initial filter is already empty");
        assert!(session.set_filter("vim"));
        assert!(!session.set_filter("vim"));
    }

    #[test]
    fn observers_see_filter_changes() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let session = FilterSession::new(table());
        let changes = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&changes);
        session.filter().subscribe(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        });

        session.set_filter("vim");
        session.set_filter("vim");
        session.set_filter("cron");

        assert_eq!(changes.load(Ordering::SeqCst), 2);
    }
}
