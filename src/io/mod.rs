//! Input/output helpers.
//!
//! - fitted artifact loading + validation (`artifacts`)
//! - batch CSV ingest + validation (`ingest`)
//! - result and sample exports (`export`)

pub mod artifacts;
pub mod export;
pub mod ingest;

pub use artifacts::*;
pub use export::*;
pub use ingest::*;
