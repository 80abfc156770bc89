//! Simple fetchers: closures and in-memory tables

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use super::fetch_cache::{Completer, Fetcher};

/// Fetcher backed by a closure that receives the completer
pub struct FnSource<F>(pub F);

impl<K, T, F> Fetcher<K, T> for FnSource<F>
where
    F: Fn(Completer<K, T>),
{
    fn fetch(&self, completer: Completer<K, T>) {
        (self.0)(completer)
    }
}

/// Fetcher that resolves immediately from an in-memory table.
///
/// Keys missing from the table resolve to `fallback` when one is set,
/// otherwise to an error.
#[derive(Debug, Clone)]
pub struct TableSource<K, T> {
    table: HashMap<K, T>,
    fallback: Option<T>,
}

impl<K: Eq + Hash, T: Clone> TableSource<K, T> {
    pub fn new(table: HashMap<K, T>) -> Self {
        Self {
            table,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: T) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

impl<T: Clone> TableSource<(), T> {
    /// A table holding one value under the unit key
    pub fn single(value: T) -> Self {
        let mut table = HashMap::new();
        table.insert((), value);
        TableSource::new(table)
    }
}

impl<K, T> Fetcher<K, T> for TableSource<K, T>
where
    K: Eq + Hash + Clone + Debug,
    T: Clone,
{
    fn fetch(&self, completer: Completer<K, T>) {
        match self.table.get(completer.key()).or(self.fallback.as_ref()) {
            Some(value) => {
                let value = value.clone();
                completer.succeed(value)
            }
            None => {
                let reason = format!("no record for {:?}", completer.key());
                completer.fail(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{FetchCache, FetchStatus};

    #[test]
    fn test_table_source_fallback() {
        let mut table = HashMap::new();
        table.insert(1u32, vec![1.0]);
        let strict = FetchCache::new("values", TableSource::new(table.clone()));
        let lenient = FetchCache::new("values", TableSource::new(table).with_fallback(Vec::new()));

        assert_eq!(strict.get(&1).status(), FetchStatus::Complete);
        assert_eq!(strict.get(&2).status(), FetchStatus::Error);
        assert!(lenient.get(&2).value().unwrap().is_empty());
    }
}
