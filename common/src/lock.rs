use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

/// The lock could not be acquired within the given time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("lock not acquired within {0:?}")]
pub struct LockTimeout(pub Duration);

/// Mutual exclusion whose acquisition gives up after a bounded wait.
///
/// The protected value lives in a slot that the guard takes out on acquisition
/// and puts back when it is dropped. Waiters block on a condition variable until
/// the slot is filled again or their timeout expires.
pub struct BoundedLock<T> {
    slot: Mutex<Option<T>>,
    released: Condvar,
}

impl<T> BoundedLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            slot: Mutex::new(Some(value)),
            released: Condvar::new(),
        }
    }

    /// Tries to acquire the lock, waiting at most `timeout`.
    ///
    /// Returns `None` if another holder kept the lock for the whole window.
    /// A zero timeout degenerates to a plain try-lock.
    pub fn try_lock_for(&self, timeout: Duration) -> Option<BoundedLockGuard<'_, T>> {
        // The inner mutex is only held for slot bookkeeping, never while user code runs,
        // so a poisoned slot still holds consistent data.
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut slot, _) = self
            .released
            .wait_timeout_while(slot, timeout, |slot| slot.is_none())
            .unwrap_or_else(PoisonError::into_inner);

        slot.take().map(|value| BoundedLockGuard {
            lock: self,
            value: Some(value),
        })
    }

    /// Runs `f` with exclusive access, or reports a [`LockTimeout`] without running it.
    ///
    /// The lock is released on every exit path of `f`, unwinding included.
    pub fn with_lock<R>(
        &self,
        timeout: Duration,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, LockTimeout> {
        let mut guard = self.try_lock_for(timeout).ok_or(LockTimeout(timeout))?;
        Ok(f(&mut guard))
    }
}

impl<T: Default> Default for BoundedLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Exclusive access to the value of a [`BoundedLock`]. Releases the lock on drop.
pub struct BoundedLockGuard<'a, T> {
    lock: &'a BoundedLock<T>,
    // Always `Some` until the guard is dropped.
    value: Option<T>,
}

impl<T> Deref for BoundedLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value.as_ref().expect("guard value taken before drop")
    }
}

impl<T> DerefMut for BoundedLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_mut().expect("guard value taken before drop")
    }
}

impl<T> Drop for BoundedLockGuard<'_, T> {
    fn drop(&mut self) {
        let mut slot = self.lock.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = self.value.take();
        drop(slot);
        self.lock.released.notify_one();
    }
}
