//! Generic object pool used to keep instance churn out of the per-tick path.

use crate::error::AudioError;

/// A free-list cache of reusable objects.
///
/// Behavior is supplied through three closures: a fallible creation
/// function invoked when the free list is empty, a reset function run on
/// every release, and an identity check used to reject double releases.
pub struct Pool<T> {
    idle: Vec<T>,
    create: Box<dyn FnMut() -> Result<T, AudioError>>,
    reset: Box<dyn FnMut(&mut T)>,
    same: Box<dyn Fn(&T, &T) -> bool>,
    total: usize,
}

impl<T> Pool<T> {
    pub fn new<C, R, S>(create: C, reset: R, same: S) -> Self
    where
        C: FnMut() -> Result<T, AudioError> + 'static,
        R: FnMut(&mut T) + 'static,
        S: Fn(&T, &T) -> bool + 'static,
    {
        Self {
            idle: Vec::new(),
            create: Box::new(create),
            reset: Box::new(reset),
            same: Box::new(same),
            total: 0,
        }
    }

    /// Take an instance out of the pool, constructing a fresh one when no
    /// released instance is available. Creation failures are surfaced to
    /// the caller; nothing is retried here.
    pub fn get(&mut self) -> Result<T, AudioError> {
        if let Some(item) = self.idle.pop() {
            return Ok(item);
        }

        let item = (self.create)()?;
        self.total += 1;
        Ok(item)
    }

    /// Return an instance to the free list after resetting it.
    ///
    /// # Panics
    ///
    /// Panics if the instance is already on the free list. Releasing the
    /// same instance twice is a usage error, not a recoverable condition.
    pub fn release(&mut self, mut item: T) {
        for existing in &self.idle {
            if (self.same)(existing, &item) {
                panic!("pool release: instance is already idle in the pool");
            }
        }

        (self.reset)(&mut item);
        self.idle.push(item);
    }

    /// Number of instances ever constructed by this pool.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of instances currently lent out.
    pub fn active(&self) -> usize {
        self.total - self.idle.len()
    }

    /// Number of instances waiting on the free list.
    pub fn idle(&self) -> usize {
        self.idle.len()
    }
}
