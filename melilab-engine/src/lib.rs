//! # Melilab Analytics Engine
//!
//! Turns raw per-grain pollen species counts from the laboratory record
//! source into derived honey-quality analytics:
//! - per-pool percentage composition and special-mark listing
//! - monofloral/multifloral classification
//! - pool × species pivot matrix
//! - cross-pool species × month scatter aggregate
//! - per-pool chart statistics
//! - harvest-date suggestion from drum extraction dates
//!
//! Every service is a pure function over an immutable record snapshot;
//! concurrency appears only in the cross-pool statistics fan-out.

pub mod client;
pub mod services;

pub use client::{ClientError, LabClient};
