//! Type-guided random program synthesis from input/output examples.
//!
//! A function is described by its argument sorts, return sort, test cases and
//! the modules whose operators it may call. [`session::SynthesisSession`]
//! generates random well-typed expression trees, filters them against the
//! tests and keeps the survivors in bounded gene pools maintained by
//! one-on-one tournaments.

pub mod config;
pub mod engines;
pub mod error;
pub mod functions;
pub mod session;
pub mod types;

pub use error::{Result, RuntimeFailure, SynthesisError};
pub use session::SynthesisSession;
