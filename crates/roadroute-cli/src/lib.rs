//! Road route CLI library.
//!
//! This crate provides command-line interface utilities for the road network
//! router, including terminal styling and output formatting.

pub mod output;
pub mod terminal;
