//! Command-line interface: one subcommand per storage backend.

pub mod commands;

pub use commands::run;
