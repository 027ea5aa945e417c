//! Tools for link archive databases: filter, merge, feed export, JSON
//! conversion in both directions and search.

pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod models;
pub mod tools;

pub use error::{AppError, Result};
