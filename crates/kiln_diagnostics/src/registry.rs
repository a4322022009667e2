//! Thread-safe fan-out over registered diagnostic listeners.
//!
//! The listener list is copy-on-write: mutations swap in a new `Arc<Vec<_>>`
//! under the write lock, and a dispatch clones the current `Arc` under the read
//! lock and then iterates without holding any lock. A dispatch racing with
//! `add`/`remove` therefore sees either the old or the new list, never a torn
//! one, and listeners are free to touch the registry from inside `accept`.
//!
//! ```text
//!    dispatch(&Diagnostic)
//!        │  (snapshot = Arc::clone(list))
//!        ├──► L1.accept() ──► Err / panic ──► ListenerFailure
//!        ├──► L2.accept()
//!        └──► LN.accept()
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::diagnostic::Diagnostic;
use crate::error::{ListenerError, ListenerFailure, ListenerOperation};
use crate::listener::DiagnosticListener;

/// Opaque token identifying one registration in a [`ListenerRegistry`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Entry {
    handle: ListenerHandle,
    listener: Arc<dyn DiagnosticListener>,
}

/// An ordered, thread-safe collection of diagnostic listeners.
///
/// Registration order is dispatch order. The same listener may be added more
/// than once; each registration then receives every dispatch.
pub struct ListenerRegistry {
    entries: RwLock<Arc<Vec<Entry>>>,
    next_handle: AtomicU64,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Arc::new(Vec::new())),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Appends a listener and returns the handle that removes it again.
    pub fn add(&self, listener: Arc<dyn DiagnosticListener>) -> ListenerHandle {
        let handle = ListenerHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(listener = listener.name(), %handle, "registering diagnostic listener");
        self.mutate(|entries| entries.push(Entry { handle, listener }));
        handle
    }

    /// Removes the registration identified by `handle`.
    ///
    /// Returns `false` if no such registration exists; that is not an error.
    pub fn remove(&self, handle: ListenerHandle) -> bool {
        let mut removed = false;
        self.mutate(|entries| {
            if let Some(pos) = entries.iter().position(|e| e.handle == handle) {
                entries.remove(pos);
                removed = true;
            }
        });
        if removed {
            tracing::debug!(%handle, "unregistered diagnostic listener");
        }
        removed
    }

    /// Removes every registration.
    pub fn remove_all(&self) {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(Vec::new());
    }

    /// Returns the first listener, in registration order, matching `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Option<Arc<dyn DiagnosticListener>>
    where
        P: FnMut(&dyn DiagnosticListener) -> bool,
    {
        self.snapshot()
            .iter()
            .find(|e| predicate(e.listener.as_ref()))
            .map(|e| Arc::clone(&e.listener))
    }

    /// Returns the first listener whose [`name`](DiagnosticListener::name) equals `name`.
    pub fn find_by_name(&self, name: &str) -> Option<Arc<dyn DiagnosticListener>> {
        self.find(|l| l.name() == name)
    }

    /// Delivers `diagnostic` to every registered listener in order.
    ///
    /// Listeners that return an error or panic are skipped over; one
    /// [`ListenerFailure`] per failing listener is returned.
    pub fn dispatch(&self, diagnostic: &Diagnostic) -> Vec<ListenerFailure> {
        self.for_each(ListenerOperation::Accept, |l| l.accept(diagnostic))
    }

    /// Flushes every registered listener in order, with the same isolation as
    /// [`dispatch`](Self::dispatch).
    pub fn flush_all(&self) -> Vec<ListenerFailure> {
        self.for_each(ListenerOperation::Flush, |l| l.flush())
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    fn snapshot(&self) -> Arc<Vec<Entry>> {
        let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    fn mutate(&self, f: impl FnOnce(&mut Vec<Entry>)) {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut next: Vec<Entry> = guard
            .iter()
            .map(|e| Entry {
                handle: e.handle,
                listener: Arc::clone(&e.listener),
            })
            .collect();
        f(&mut next);
        *guard = Arc::new(next);
    }

    fn for_each<F>(&self, operation: ListenerOperation, mut call: F) -> Vec<ListenerFailure>
    where
        F: FnMut(&dyn DiagnosticListener) -> Result<(), ListenerError>,
    {
        let snapshot = self.snapshot();
        let mut failures = Vec::new();
        for entry in snapshot.iter() {
            let listener = entry.listener.as_ref();
            let cause = match panic::catch_unwind(AssertUnwindSafe(|| call(listener))) {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };
            failures.push(ListenerFailure {
                handle: entry.handle,
                listener: listener.name().to_string(),
                operation,
                cause,
            });
        }
        failures
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_list()
            .entries(snapshot.iter().map(|e| (e.handle, e.listener.name())))
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
