//! Dependent-fetch caching: memoized asynchronous fetches and derived values

mod derived;
mod fetch_cache;
mod sources;

pub use derived::Derived;
pub use fetch_cache::{Completer, FetchCache, FetchHandle, FetchStatus, Fetcher, ListenerId, Subscription};
pub use sources::{FnSource, TableSource};
