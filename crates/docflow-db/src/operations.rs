//! Database operations.

pub mod collections;
