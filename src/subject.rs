// Shared subject - the object a worker mutates and the controller inspects

use std::sync::{Arc, PoisonError, RwLock};

/// Handle to the object under work, shared between a worker and its controller.
///
/// The pause handshake decides *when* each side may look at the subject; the
/// `RwLock` underneath makes every individual access exclusive (writes) or shared
/// (reads) so a controller that reads outside a pause window still sees a whole
/// value, never a torn one.
///
/// Cloning the handle shares the same subject.
#[derive(Debug, Default)]
pub struct SharedSubject<S> {
    inner: Arc<RwLock<S>>,
}

impl<S> SharedSubject<S> {
    pub fn new(subject: S) -> Self {
        Self {
            inner: Arc::new(RwLock::new(subject)),
        }
    }

    /// Execute a function with read access to the subject
    ///
    /// # Example
    /// ```ignore
    /// let filled = board.read(|b| b.filled_cells());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Execute a function with write access to the subject
    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut S) -> R,
    {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Number of handles currently sharing the subject
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<S: Clone> SharedSubject<S> {
    /// Clone the current value out of the lock
    pub fn snapshot(&self) -> S {
        self.read(S::clone)
    }
}

// Manual Clone implementation to avoid requiring S: Clone
impl<S> Clone for SharedSubject<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_subject() {
        let first = SharedSubject::new(vec![1, 2, 3]);
        let second = first.clone();

        first.update(|v| v.push(4));

        assert_eq!(second.snapshot(), vec![1, 2, 3, 4]);
        assert_eq!(first.handle_count(), 2);
    }

    #[test]
    fn test_read_with_closure() {
        let subject = SharedSubject::new(String::from("board"));
        assert_eq!(subject.read(|s| s.len()), 5);
    }

    #[test]
    fn test_update_returns_value() {
        let subject = SharedSubject::new(10_u32);
        let previous = subject.update(|n| std::mem::replace(n, 11));
        assert_eq!(previous, 10);
        assert_eq!(subject.snapshot(), 11);
    }
}
