//! Synthesis provider: the trait seam plus the Replicate implementation.
//!
//! The provider is an opaque function from two image URLs and a text prompt
//! to a result image URL. It is non-deterministic, slow (tens of seconds),
//! and may fail for content or quota reasons; callers treat any error as
//! terminal for the job that triggered it.

pub mod api;
pub mod provider;

pub use provider::{ReplicateProvider, SynthesisConfig, SynthesisError, SynthesisProvider};
