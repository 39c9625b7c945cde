//! Configuration storage for the manager daemon.

pub mod config;
