//! Reader/writer admission control for a single store.
//!
//! Readers are admitted together as long as no writer is admitted. A writer
//! waits until every admitted reader has left, but admitted writers do not
//! exclude one another. Callers that need mutations applied in a strict order
//! must serialize them externally.
//!
//! Admission is re-entrant per thread: a thread that already holds an admission
//! on a guard is admitted again without waiting, which lets hooks and
//! predicates call back into the store. Requesting a write while the thread's
//! outermost admission is a read is refused, since it could never be granted.

use crate::error::{GraphError, Result};
use log::trace;
use parking_lot::{Condvar, Mutex};
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_GUARD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static HELD: RefCell<HashMap<u64, Held>> = RefCell::new(HashMap::new());
}

/// The two admission classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Shared, read-only access
    Read,
    /// Mutating access
    Write,
}

#[derive(Debug, Clone, Copy)]
struct Held {
    outermost: Admission,
    depth: usize,
}

/// Admission controller shared by every handle of one store.
///
/// Cloning yields another handle to the same counters.
#[derive(Clone)]
pub struct ConcurrencyGuard {
    inner: Arc<Inner>,
}

struct Inner {
    id: u64,
    state: Mutex<LockState>,
    changed: Condvar,
}

#[derive(Default, Debug)]
struct LockState {
    readers: usize,
    writers: usize,
}

/// Snapshot of admission counters for observability.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockSnapshot {
    /// Number of admitted readers.
    pub readers: usize,
    /// Number of admitted writers.
    pub writers: usize,
}

/// Held read admission; released on drop.
pub struct ReaderGuard {
    release: Release,
}

/// Held write admission; released on drop.
pub struct WriterGuard {
    release: Release,
}

struct Release {
    inner: Arc<Inner>,
    admission: Admission,
    nested: bool,
    // Admission is tracked per thread, so guards must not migrate.
    _not_send: PhantomData<*const ()>,
}

impl Drop for Release {
    fn drop(&mut self) {
        let id = self.inner.id;
        HELD.with(|held| {
            let mut held = held.borrow_mut();
            if let Some(entry) = held.get_mut(&id) {
                entry.depth -= 1;
                if entry.depth == 0 {
                    held.remove(&id);
                }
            }
        });
        if self.nested {
            return;
        }
        let mut state = self.inner.state.lock();
        let remaining = match self.admission {
            Admission::Read => {
                state.readers -= 1;
                state.readers
            }
            Admission::Write => {
                state.writers -= 1;
                state.writers
            }
        };
        if remaining == 0 {
            self.inner.changed.notify_all();
        }
        trace!("released {:?} admission, {} remaining", self.admission, remaining);
    }
}

impl ReaderGuard {
    /// Release the admission now.
    pub fn release(self) {}

    /// Whether this admission was inherited from an outer one on this thread.
    pub fn is_nested(&self) -> bool {
        self.release.nested
    }
}

impl WriterGuard {
    /// Release the admission now.
    pub fn release(self) {}

    /// Whether this admission was inherited from an outer one on this thread.
    pub fn is_nested(&self) -> bool {
        self.release.nested
    }
}

impl ConcurrencyGuard {
    /// Create a guard with no admissions.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                id: NEXT_GUARD_ID.fetch_add(1, Ordering::Relaxed),
                state: Mutex::new(LockState::default()),
                changed: Condvar::new(),
            }),
        }
    }

    /// Block until read admission is granted.
    pub fn acquire_read(&self) -> ReaderGuard {
        // A nested read is compatible with either outer admission.
        let nested = matches!(self.enter_nested(Admission::Read), Ok(true));
        if !nested {
            let mut state = self.inner.state.lock();
            while state.writers > 0 {
                self.inner.changed.wait(&mut state);
            }
            state.readers += 1;
            drop(state);
            self.enter_outermost(Admission::Read);
        }
        ReaderGuard {
            release: self.release(Admission::Read, nested),
        }
    }

    /// Block until write admission is granted.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidOperation`] if the calling thread currently
    /// holds a read admission on this guard.
    pub fn acquire_write(&self) -> Result<WriterGuard> {
        let nested = self.enter_nested(Admission::Write)?;
        if !nested {
            let mut state = self.inner.state.lock();
            while state.readers > 0 {
                self.inner.changed.wait(&mut state);
            }
            state.writers += 1;
            drop(state);
            self.enter_outermost(Admission::Write);
        }
        Ok(WriterGuard {
            release: self.release(Admission::Write, nested),
        })
    }

    /// Run `f` under read admission.
    pub fn with_read<R>(&self, f: impl FnOnce() -> R) -> R {
        let _admission = self.acquire_read();
        f()
    }

    /// Run `f` under write admission, propagating its failure unchanged.
    pub fn with_write<R>(&self, f: impl FnOnce() -> Result<R>) -> Result<R> {
        let _admission = self.acquire_write()?;
        f()
    }

    /// Current admission counters.
    pub fn snapshot(&self) -> LockSnapshot {
        let state = self.inner.state.lock();
        LockSnapshot {
            readers: state.readers,
            writers: state.writers,
        }
    }

    /// Returns `Ok(true)` when the thread already holds an admission and the
    /// new one was recorded as nested.
    fn enter_nested(&self, wanted: Admission) -> Result<bool> {
        HELD.with(|held| {
            let mut held = held.borrow_mut();
            match held.get_mut(&self.inner.id) {
                Some(entry) => {
                    if entry.outermost == Admission::Read && wanted == Admission::Write {
                        return Err(GraphError::InvalidOperation {
                            message: "cannot mutate the graph while holding a read admission"
                                .to_string(),
                        });
                    }
                    entry.depth += 1;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn enter_outermost(&self, admission: Admission) {
        HELD.with(|held| {
            held.borrow_mut().insert(
                self.inner.id,
                Held {
                    outermost: admission,
                    depth: 1,
                },
            );
        });
    }

    fn release(&self, admission: Admission, nested: bool) -> Release {
        Release {
            inner: Arc::clone(&self.inner),
            admission,
            nested,
            _not_send: PhantomData,
        }
    }
}

impl Default for ConcurrencyGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConcurrencyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrencyGuard")
            .field("id", &self.inner.id)
            .field("state", &self.snapshot())
            .finish()
    }
}
