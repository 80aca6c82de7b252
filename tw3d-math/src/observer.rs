//! Change notification and lazily derived values for the mutable types.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

/// Boxed change callback.
pub type ObserverFn = Box<dyn FnMut()>;

/// Optional change callback attached to a mutable value.
#[derive(Default)]
pub struct Observer {
    callback: Option<ObserverFn>,
}

impl Observer {
    /// An observer slot with nothing attached
    pub fn none() -> Self {
        Self { callback: None }
    }

    pub fn new(callback: impl FnMut() + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Attach a callback, returning the one it replaces
    pub fn replace(&mut self, callback: impl FnMut() + 'static) -> Option<ObserverFn> {
        trace!("replacing observer callback");
        self.callback.replace(Box::new(callback))
    }

    pub fn clear(&mut self) -> Option<ObserverFn> {
        self.callback.take()
    }

    pub fn is_attached(&self) -> bool {
        self.callback.is_some()
    }

    /// Invoke the callback if one is attached
    pub fn notify(&mut self) {
        if let Some(callback) = self.callback.as_mut() {
            callback();
        }
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Validity of a cached derived value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Must be recomputed on the next read
    Stale,
    /// Holds a value matching the current owner state
    Fresh,
}

/// Lazily computed value derived from an owning matrix.
pub struct DerivedCache<T> {
    name: &'static str,
    slot: OnceCell<Rc<T>>,
}

impl<T> DerivedCache<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: OnceCell::new(),
        }
    }

    pub fn state(&self) -> CacheState {
        if self.slot.get().is_some() {
            CacheState::Fresh
        } else {
            CacheState::Stale
        }
    }

    /// Return the cached value, computing it first if the cache is stale.
    pub fn get_or_compute(&self, compute: impl FnOnce() -> T) -> Rc<T> {
        let value = self.slot.get_or_init(|| {
            trace!(cache = self.name, "recomputing derived value");
            Rc::new(compute())
        });
        Rc::clone(value)
    }

    /// Mark the cached value stale.
    pub fn invalidate(&mut self) {
        self.slot.take();
    }
}

impl<T> fmt::Debug for DerivedCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedCache")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_observer_notify() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let mut observer = Observer::new(move || counter.set(counter.get() + 1));

        assert!(observer.is_attached());
        observer.notify();
        observer.notify();
        assert_eq!(count.get(), 2);

        observer.clear();
        observer.notify();
        assert_eq!(count.get(), 2);
        assert!(!observer.is_attached());
    }

    #[test]
    fn test_observer_replace() {
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let (a, b) = (Rc::clone(&first), Rc::clone(&second));

        let mut observer = Observer::new(move || a.set(a.get() + 1));
        let previous = observer.replace(move || b.set(b.get() + 1));
        assert!(previous.is_some());

        observer.notify();
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn test_cache_lifecycle() {
        let mut cache = DerivedCache::new("test");
        assert_eq!(cache.state(), CacheState::Stale);

        let computed = Cell::new(0);
        let first = cache.get_or_compute(|| {
            computed.set(computed.get() + 1);
            42
        });
        let second = cache.get_or_compute(|| {
            computed.set(computed.get() + 1);
            7
        });
        assert_eq!(*second, 42);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(computed.get(), 1);
        assert_eq!(cache.state(), CacheState::Fresh);

        cache.invalidate();
        assert_eq!(cache.state(), CacheState::Stale);
        let third = cache.get_or_compute(|| 7);
        assert_eq!(*third, 7);
        assert!(!Rc::ptr_eq(&first, &third));
    }
}
