//! Frontier-based exploration module.
//!
//! This module provides:
//! - Frontier records and scoring
//! - The exploration engine (coverage grid, field-of-view scans, retained
//!   frontier set)
//! - The top-level exploration driver loop

pub mod driver;
pub mod engine;
pub mod frontier;

pub use driver::{run_session, SessionOutcome};
pub use engine::ExplorationEngine;
pub use frontier::Frontier;
