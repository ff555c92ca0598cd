//! dream - a concurrency-safe, in-memory key-value store
//!
//! Values are stored under string keys as a tagged [`Value`] and read back
//! either as-is or through typed getters that fall back to the type's default
//! on absence or type mismatch. A store built with a cleanup interval runs a
//! background sweeper that drops entries older than that interval.
//!
//! - `store`: the single-threaded map, its entries and value types
//! - `sweeper`: the cancellable background expiry task
//! - `db`: the shared, locked [`Store`] handle tying the two together
//! - `config`: construction options

pub mod config;
pub mod store;
mod sweeper;
mod db;

/// Re-export commonly used types
pub use config::StoreConfig;
pub use db::Store;
pub use store::{FromValue, Value};
pub use sweeper::SweeperState;
