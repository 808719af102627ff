//! Shared state behind a short-held lock
//!
//! Tasks publish and read the latest pose snapshot through [`SharedState`].
//! Closures must stay short: no awaits, no bus transactions, no filter math.

/// Lock-scoped access to a value shared between tasks.
///
/// Implementations: `EmbassyState<T>` (critical-section mutex) on target and
/// [`MockState<T>`] (`RefCell`) on host.
pub trait SharedState<T> {
    /// Run `f` with shared access
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R;

    /// Run `f` with exclusive access
    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R;
}

#[cfg(feature = "embassy")]
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

/// Critical-section mutex around a `RefCell`, usable from a `static`
#[cfg(feature = "embassy")]
pub struct EmbassyState<T> {
    inner: Mutex<CriticalSectionRawMutex, core::cell::RefCell<T>>,
}

#[cfg(feature = "embassy")]
impl<T> EmbassyState<T> {
    /// Wrap `value`; const so it can initialize a `static`
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(core::cell::RefCell::new(value)),
        }
    }
}

#[cfg(feature = "embassy")]
impl<T> SharedState<T> for EmbassyState<T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Single-threaded `RefCell` state for host tests.
///
/// Panics on a nested `with_mut`, which on target would be a lock held
/// across another lock.
pub struct MockState<T> {
    inner: core::cell::RefCell<T>,
}

impl<T> MockState<T> {
    /// Wrap `value`
    pub fn new(value: T) -> Self {
        Self {
            inner: core::cell::RefCell::new(value),
        }
    }
}

impl<T> SharedState<T> for MockState<T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.inner.borrow())
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        f(&mut self.inner.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Snapshot {
        sequence: u32,
        frame: [u8; 4],
    }

    #[test]
    fn publish_then_read() {
        let state = MockState::new(Snapshot::default());
        state.with_mut(|s| {
            s.sequence += 1;
            s.frame = [1, 2, 3, 4];
        });
        assert_eq!(state.with(|s| s.sequence), 1);
        assert_eq!(state.with(|s| s.frame), [1, 2, 3, 4]);
    }

    #[test]
    fn last_write_wins() {
        let state = MockState::new(0u32);
        for v in 1..=5 {
            state.with_mut(|s| *s = v);
        }
        assert_eq!(state.with(|s| *s), 5);
    }

    #[cfg(feature = "embassy")]
    #[test]
    fn embassy_state_from_static() {
        static STATE: EmbassyState<u32> = EmbassyState::new(0);
        STATE.with_mut(|s| *s += 7);
        assert_eq!(STATE.with(|s| *s), 7);
    }

    #[test]
    #[should_panic(expected = "already borrowed")]
    fn nested_lock_panics() {
        let state = MockState::new(0u32);
        state.with(|_| {
            let _ = state.inner.borrow_mut();
        });
    }
}
