//! Khetbari library crate — re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual game entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can import sim types, systems, and resources without needing a
//! window or GPU.

pub mod shared;
pub mod input;
pub mod sim;
pub mod care;
pub mod actions;
pub mod economy;
pub mod weather;
pub mod advisor;
pub mod snapshot;
pub mod ui;
