use std::sync::{Arc, Mutex};

pub type SubscriptionId = u64;

type Observer = Arc<dyn Fn(&str) + Send + Sync>;

/// Observable filter string shared between a front-end and the forest
/// builder.
///
/// The value defaults to the empty string and is never absent. Setting an
/// equal string is a no-op and does not notify, so consumers never rebuild
/// for a filter that did not actually change. Notification is synchronous on
/// the thread that called [`ProcessFilter::set`]; marshaling to another
/// thread is the observer's concern.
#[derive(Default)]
pub struct ProcessFilter {
    value: Mutex<String>,
    observers: Mutex<ObserverList>,
}

#[derive(Default)]
struct ObserverList {
    next_id: SubscriptionId,
    entries: Vec<(SubscriptionId, Observer)>,
}

impl ProcessFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> String {
        self.value.lock().expect("filter mutex poisoned").clone()
    }

    /// Update the filter. Returns whether the value actually changed;
    /// observers are notified only in that case.
    pub fn set(&self, value: &str) -> bool {
        {
            let mut current = self.value.lock().expect("filter mutex poisoned");
            if *current == value {
                return false;
            }
            *current = value.to_string();
        }

        // The value lock is released before observers run, so an observer may
        // call `get` (or even `set`) without deadlocking.
        let observers: Vec<Observer> = {
            let list = self.observers.lock().expect("observer mutex poisoned");
            list.entries.iter().map(|(_, obs)| Arc::clone(obs)).collect()
        };
        for observer in observers {
            observer(value);
        }
        true
    }

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut list = self.observers.lock().expect("observer mutex poisoned");
        let id = list.next_id;
        list.next_id += 1;
        list.entries.push((id, Arc::new(observer)));
        id
    }

    /// Returns whether the subscription was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut list = self.observers.lock().expect("observer mutex poisoned");
        let before = list.entries.len();
        list.entries.retain(|(entry_id, _)| *entry_id != id);
        list.entries.len() != before
    }
}
