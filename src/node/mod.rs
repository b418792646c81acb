//! High-level node API
//!
//! A node owns one in-process transport and creates typed publishers and
//! subscribers that share it.

mod builder;

pub use builder::{Node, NodeBuilder};
