//! Display-mode filtering and the highlighted comparison gene

mod store;

pub use store::{DisplayMode, SelectionStore};
