//! Netwalker test suite.
//!
//! Organized the way the engine itself is layered:
//! - `unit/` - pure function and struct tests (no I/O)
//! - `integration/` - multi-module flows against the in-memory fake transport
//! - `e2e/` - full job runs through `netwalker::job::run_job`

mod unit;
mod integration;
mod e2e;
