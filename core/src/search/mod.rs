//! Search module - Tree-of-Thoughts beam search with a learned scorer
//!
//! Oracle proposals, value-network pruning, brute-force finish

pub mod beam;
pub mod generator;
pub mod scoring;

pub use beam::*;
pub use generator::*;
pub use scoring::*;
