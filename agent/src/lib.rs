//! allocheck-agent: command-line front end for the allocheck pipeline.
//!
//! Handles everything outside the pure core: settings, reading the export,
//! policy and thesis files, and writing the markdown report.

pub mod commands;
pub mod error;
pub mod settings;
