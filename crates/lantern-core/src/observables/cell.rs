//! A mutable cell with synchronous observers.
//!
//! Replaces reactive-stream state holders with something explicit: a value
//! plus a registry of subscriber callbacks invoked on every publish.
//! Publishing is atomic with respect to readers - `get` sees the old or the
//! new value, never a partial one.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct CellInner<T> {
    value: RwLock<T>,
    subscribers: Mutex<HashMap<u64, Callback<T>>>,
    next_id: Mutex<u64>,
}

pub struct ObservableCell<T> {
    inner: Arc<CellInner<T>>,
}

impl<T> Clone for ObservableCell<T> {
    fn clone(&self) -> Self {
        ObservableCell {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ObservableCell<T> {
    pub fn new(initial: T) -> Self {
        ObservableCell {
            inner: Arc::new(CellInner {
                value: RwLock::new(initial),
                subscribers: Mutex::new(HashMap::new()),
                next_id: Mutex::new(0),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Replace the value and notify every subscriber with the new one.
    pub fn publish(&self, value: T) {
        *self.inner.value.write() = value.clone();
        self.notify(&value);
    }

    /// Read-modify-write under the lock: `f` receives the current value and
    /// returns `Some(next)` to publish or `None` to leave it untouched.
    /// Concurrent callers serialize, so compare-and-publish races cannot
    /// lose updates.
    pub fn update_if<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> Option<T>,
    {
        let published = {
            let mut value = self.inner.value.write();
            match f(&value) {
                Some(next) => {
                    *value = next.clone();
                    Some(next)
                }
                None => None,
            }
        };
        match published {
            Some(value) => {
                self.notify(&value);
                true
            }
            None => false,
        }
    }

    /// Register an observer. The returned handle unsubscribes when dropped
    /// (or explicitly through [`Subscription::cancel`]).
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut next = self.inner.next_id.lock();
            let id = *next;
            *next += 1;
            id
        };
        self.inner.subscribers.lock().insert(id, Arc::new(callback));

        let weak: Weak<CellInner<T>> = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.subscribers.lock().remove(&id);
                }
            })),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    fn notify(&self, value: &T) {
        // Snapshot the callbacks so a subscriber may subscribe/unsubscribe
        // from within its own callback without deadlocking.
        let callbacks: Vec<Callback<T>> =
            self.inner.subscribers.lock().values().cloned().collect();
        for callback in callbacks {
            callback(value);
        }
    }
}

/// Cancellation handle for one observer registration.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn publish_notifies_subscribers() {
        let cell = ObservableCell::new(0u64);
        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = Arc::clone(&seen);
        let sub = cell.subscribe(move |v| {
            seen2.store(*v as usize, Ordering::SeqCst);
        });

        cell.publish(42);
        assert_eq!(seen.load(Ordering::SeqCst), 42);
        assert_eq!(cell.get(), 42);
        drop(sub);
    }

    #[test]
    fn dropping_the_subscription_unsubscribes() {
        let cell = ObservableCell::new(0u64);
        let sub = cell.subscribe(|_| {});
        assert_eq!(cell.observer_count(), 1);
        drop(sub);
        assert_eq!(cell.observer_count(), 0);

        let sub = cell.subscribe(|_| {});
        assert_eq!(cell.observer_count(), 1);
        sub.cancel();
        assert_eq!(cell.observer_count(), 0);
    }

    #[test]
    fn update_if_publishes_only_on_some() {
        let cell = ObservableCell::new(10u64);
        let fired = Arc::new(AtomicUsize::new(0));
        let fired2 = Arc::clone(&fired);
        let _sub = cell.subscribe(move |_| {
            fired2.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!cell.update_if(|cur| if *cur < 5 { Some(99) } else { None }));
        assert_eq!(cell.get(), 10);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        assert!(cell.update_if(|cur| Some(cur + 1)));
        assert_eq!(cell.get(), 11);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
