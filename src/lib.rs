//! `credit-risk` library crate.
//!
//! The binary (`credit-risk`) is a thin wrapper around this library so that:
//!
//! - the scoring pipeline is testable without spawning processes
//! - one loaded `ScoringContext` can be embedded behind any front-end
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod models;
pub mod preprocess;
pub mod report;
pub mod risk;
