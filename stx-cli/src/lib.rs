#![forbid(missing_docs)]

//! Building blocks of the `stx` command line tool

/// Subcommands
pub mod commands;
/// Configuration file handling
pub mod config;
