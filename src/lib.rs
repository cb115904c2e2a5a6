//! sqlward - natural-language to SQL with a query-safety gate.
//!
//! This library exposes the core modules for use in integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod eval;
pub mod judge;
pub mod logging;
pub mod oracle;
pub mod pipeline;
pub mod probe;
pub mod safety;
pub mod warehouse;
