//! Cookbook dependency resolution: merging run-list constraints with
//! environment pins, newest-satisfying version selection, and transitive
//! dependency closure.

pub mod cache;
pub mod conflict;
pub mod merge;
pub mod resolver;
pub mod select;
pub mod table;
