//! skilltree: per-user skill trees with deterministic layout.
//!
//! Layers, innermost first:
//! - [`domain`]: entities, layout engine, arena forest (no I/O)
//! - [`application`]: transactional Tree Store and services
//! - [`infrastructure`]: stores, filesystem, DI container
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
