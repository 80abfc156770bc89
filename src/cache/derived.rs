//! Tri-state value of a computation that depends on asynchronous fetches

use crate::error::CoexprError;

/// Outcome of reading a derived value
#[derive(Debug)]
pub enum Derived<T> {
    /// At least one dependency has not completed yet
    Pending,
    /// Every dependency completed and the value was computed
    Ready(T),
    /// A dependency failed
    Failed(CoexprError),
}

impl<T> Derived<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Derived::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Derived::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Derived::Failed(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Derived::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CoexprError> {
        match self {
            Derived::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Derived<U> {
        match self {
            Derived::Pending => Derived::Pending,
            Derived::Ready(value) => Derived::Ready(f(value)),
            Derived::Failed(err) => Derived::Failed(err),
        }
    }

    /// Convert into a `Result`, treating pending as `None`
    pub fn into_result(self) -> crate::error::Result<Option<T>> {
        match self {
            Derived::Pending => Ok(None),
            Derived::Ready(value) => Ok(Some(value)),
            Derived::Failed(err) => Err(err),
        }
    }
}
