//! Solar diagnostic report engine.
//!
//! Turns a client's billing history into a yearly consumption profile,
//! sizes a photovoltaic array against it, and projects the investment's
//! cash flows, payback and internal rate of return.
//!
//! The engine ([`analyzer`], [`sizer`], [`projector`], [`irr`]) is pure and
//! synchronous; every function takes an [`EngineConfig`] holding the tariff
//! and product constants. [`reports`] and [`output`] turn the results into
//! tables and files.
pub mod analyzer;
pub mod billing;
pub mod config;
pub mod diagnosis;
pub mod error;
pub mod irr;
pub mod loader;
pub mod output;
pub mod projector;
pub mod reports;
pub mod sizer;
pub mod types;
pub mod util;

pub use analyzer::analyze;
pub use config::EngineConfig;
pub use diagnosis::Diagnosis;
pub use error::{Error, Result};
pub use projector::project;
pub use sizer::{describe_system, recommend_capacity};
