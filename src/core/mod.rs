//! Core persistence layer: the versioned preference store and the shared
//! primitives it is built on.

pub mod config;
pub mod db;
pub mod error;
pub mod migration;
pub mod output;
pub mod schemas;
pub mod store;
pub mod time;
