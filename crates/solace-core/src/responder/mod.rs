//! Scripted response generation.
//!
//! A deterministic rule engine: keyword branches are checked in a fixed
//! priority order, and the winning branch composes its reply from static
//! phrase pools, with one uniformly random pick per pool reference.

pub mod branch;
pub mod engine;
pub mod pools;

pub use branch::Branch;
pub use engine::ResponseEngine;
