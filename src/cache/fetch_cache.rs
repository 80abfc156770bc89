//! Keyed, memoizing fetch cache with push notification on completion
//!
//! All state lives behind `Rc<RefCell<..>>`: the cache is meant for a single
//! reactive thread. Borrows are always released before calling out to a
//! fetcher or a listener, so both may re-enter the cache.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use super::derived::Derived;
use crate::error::CoexprError;

/// Status of one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Pending,
    Complete,
    Error,
}

#[derive(Debug)]
enum FetchState<T> {
    Pending,
    Complete(Rc<T>),
    Error(String),
}

/// Shared handle on the result of one fetch.
///
/// Every `get` of an equal key returns a clone of the same handle.
#[derive(Debug)]
pub struct FetchHandle<T> {
    state: Rc<RefCell<FetchState<T>>>,
}

impl<T> Clone for FetchHandle<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> FetchHandle<T> {
    fn pending() -> Self {
        Self {
            state: Rc::new(RefCell::new(FetchState::Pending)),
        }
    }

    pub fn status(&self) -> FetchStatus {
        match &*self.state.borrow() {
            FetchState::Pending => FetchStatus::Pending,
            FetchState::Complete(_) => FetchStatus::Complete,
            FetchState::Error(_) => FetchStatus::Error,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status() == FetchStatus::Complete
    }

    pub fn value(&self) -> Option<Rc<T>> {
        match &*self.state.borrow() {
            FetchState::Complete(value) => Some(Rc::clone(value)),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<String> {
        match &*self.state.borrow() {
            FetchState::Error(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Whether both handles refer to the same fetch
    pub fn ptr_eq(&self, other: &FetchHandle<T>) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// View the fetch as a derived value; `resource` names it in errors
    pub fn derive(&self, resource: &str) -> Derived<Rc<T>> {
        match &*self.state.borrow() {
            FetchState::Pending => Derived::Pending,
            FetchState::Complete(value) => Derived::Ready(Rc::clone(value)),
            FetchState::Error(reason) => Derived::Failed(CoexprError::fetch_failed(resource, reason.clone())),
        }
    }

    fn settle(&self, result: std::result::Result<T, String>) -> bool {
        let mut state = self.state.borrow_mut();
        if !matches!(*state, FetchState::Pending) {
            return false;
        }
        *state = match result {
            Ok(value) => FetchState::Complete(Rc::new(value)),
            Err(reason) => FetchState::Error(reason),
        };
        true
    }
}

/// Identifies a registered completion listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<K> = Rc<dyn Fn(&K)>;

struct CacheInner<K, T> {
    entries: HashMap<K, FetchHandle<T>>,
    listeners: Vec<(ListenerId, Listener<K>)>,
    next_listener: u64,
    version: u64,
    fetch_count: usize,
}

/// Cache side of a completion: bump the version and notify listeners
trait Notify<K, T> {
    fn completed(&self, key: &K, handle: &FetchHandle<T>, resource: &str, error: Option<&str>);
}

impl<K: Eq + Hash + Clone + Debug, T> Notify<K, T> for RefCell<CacheInner<K, T>> {
    fn completed(&self, key: &K, handle: &FetchHandle<T>, resource: &str, error: Option<&str>) {
        if let Some(reason) = error {
            log::warn!("Fetch of {} for {:?} failed: {}", resource, key, reason);
        }

        let listeners: Vec<Listener<K>> = {
            let mut inner = self.borrow_mut();
            let current = inner.entries.get(key).map_or(false, |h| h.ptr_eq(handle));
            if !current {
                log::debug!("Ignoring stale {} result for {:?}", resource, key);
                return;
            }
            inner.version += 1;
            inner.listeners.iter().map(|(_, l)| Rc::clone(l)).collect()
        };

        if error.is_none() {
            log::debug!("Fetched {} for {:?}", resource, key);
        }
        for listener in listeners {
            listener(key);
        }
    }
}

/// Delivers the result of one fetch back into its cache.
///
/// May be resolved synchronously inside `Fetcher::fetch` or kept and
/// resolved later. Dropping it unresolved fails the fetch. A completer
/// whose cache is gone settles its own handle and notifies nobody.
pub struct Completer<K, T> {
    key: K,
    handle: FetchHandle<T>,
    cache: Weak<dyn Notify<K, T>>,
    resource: Rc<str>,
}

impl<K, T> Completer<K, T> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn resolve(self, result: std::result::Result<T, String>) {
        self.finish(result);
    }

    pub fn succeed(self, value: T) {
        self.resolve(Ok(value));
    }

    pub fn fail(self, reason: impl Into<String>) {
        self.resolve(Err(reason.into()));
    }

    fn finish(&self, result: std::result::Result<T, String>) {
        let error = result.as_ref().err().cloned();
        if !self.handle.settle(result) {
            return;
        }
        if let Some(cache) = self.cache.upgrade() {
            cache.completed(&self.key, &self.handle, &self.resource, error.as_deref());
        }
    }
}

impl<K, T> Drop for Completer<K, T> {
    fn drop(&mut self) {
        if self.handle.status() == FetchStatus::Pending {
            self.finish(Err("fetch abandoned".to_string()));
        }
    }
}

/// A source of values for a cache
pub trait Fetcher<K, T> {
    /// Start fetching `completer.key()`; resolve the completer when done
    fn fetch(&self, completer: Completer<K, T>);
}

/// Memoizing asynchronous cache.
///
/// Guarantees at most one fetch per distinct key: the first `get` issues the
/// fetch, every later `get` of an equal key returns the same handle. Cloning
/// the cache shares its state.
pub struct FetchCache<K, T> {
    inner: Rc<RefCell<CacheInner<K, T>>>,
    fetcher: Rc<dyn Fetcher<K, T>>,
    resource: Rc<str>,
}

impl<K, T> Clone for FetchCache<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            fetcher: Rc::clone(&self.fetcher),
            resource: Rc::clone(&self.resource),
        }
    }
}

impl<K, T> FetchCache<K, T>
where
    K: Eq + Hash + Clone + Debug + 'static,
    T: 'static,
{
    /// Create a cache; `resource` names the data in logs and errors
    pub fn new<F: Fetcher<K, T> + 'static>(resource: &str, fetcher: F) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CacheInner {
                entries: HashMap::new(),
                listeners: Vec::new(),
                next_listener: 0,
                version: 0,
                fetch_count: 0,
            })),
            fetcher: Rc::new(fetcher),
            resource: Rc::from(resource),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Handle for `key`, issuing the fetch if this key was never requested
    pub fn get(&self, key: &K) -> FetchHandle<T> {
        let existing = self.inner.borrow().entries.get(key).cloned();
        if let Some(handle) = existing {
            return handle;
        }

        let handle = FetchHandle::pending();
        {
            let mut inner = self.inner.borrow_mut();
            inner.entries.insert(key.clone(), handle.clone());
            inner.fetch_count += 1;
        }
        log::debug!("Fetching {} for {:?}", self.resource, key);

        let cache: Weak<dyn Notify<K, T>> = Rc::downgrade(&self.inner) as Weak<dyn Notify<K, T>>;
        self.fetcher.fetch(Completer {
            key: key.clone(),
            handle: handle.clone(),
            cache,
            resource: Rc::clone(&self.resource),
        });
        handle
    }

    /// Handle for `key` if it was already requested; never fetches
    pub fn peek(&self, key: &K) -> Option<FetchHandle<T>> {
        self.inner.borrow().entries.get(key).cloned()
    }

    /// Forget a settled `key` so the next `get` fetches again.
    /// A pending fetch is kept: there is never more than one per key.
    pub fn invalidate(&self, key: &K) -> bool {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            let settled = inner
                .entries
                .get(key)
                .map_or(false, |h| h.status() != FetchStatus::Pending);
            settled && inner.entries.remove(key).is_some()
        };
        if removed {
            log::debug!("Invalidated {} for {:?}", self.resource, key);
        }
        removed
    }

    /// Register a listener called with the key of every completed fetch
    pub fn subscribe<L: Fn(&K) + 'static>(&self, listener: L) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(l, _)| *l != id);
        inner.listeners.len() != before
    }

    /// Subscribe and get a guard that unsubscribes on dispose or drop
    pub fn watch<L: Fn(&K) + 'static>(&self, listener: L) -> Subscription {
        let id = self.subscribe(listener);
        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.retain(|(l, _)| *l != id);
            }
        })
    }

    pub fn n_listeners(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Incremented on every completion (success or error) of a current fetch
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of fetches issued so far
    pub fn fetch_count(&self) -> usize {
        self.inner.borrow().fetch_count
    }
}

/// Guard over a listener registration
pub struct Subscription {
    disposer: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new<F: FnOnce() + 'static>(disposer: F) -> Self {
        Self {
            disposer: Some(Box::new(disposer)),
        }
    }

    /// Chain another teardown step onto this subscription
    pub fn and_then<F: FnOnce() + 'static>(mut self, next: F) -> Self {
        let first = self.disposer.take();
        Subscription::new(move || {
            if let Some(first) = first {
                first();
            }
            next();
        })
    }

    pub fn is_active(&self) -> bool {
        self.disposer.is_some()
    }

    /// Remove the listener now
    pub fn dispose(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            disposer();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.teardown();
    }
}
