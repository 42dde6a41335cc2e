//! Shared utilities for the Cookshelf cookbook registry.
//!
//! This crate provides cross-cutting concerns used by all other Cookshelf
//! crates: the unified error type and checksum helpers for cookbook files.

pub mod errors;
pub mod hash;
