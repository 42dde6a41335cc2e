//! Core data types for the Cookshelf cookbook registry.
//!
//! This crate defines cookbook versions and version constraints, run-list
//! entries, uploaded cookbook manifests, packages and their versions, the
//! package repository and checksum store interfaces, the registry front end
//! that ties them together, and registry configuration.
//!
//! This crate is intentionally free of async code and network I/O.

pub mod checksum_store;
pub mod config;
pub mod constraint;
pub mod manifest;
pub mod package;
pub mod registry;
pub mod repository;
pub mod run_list;
pub mod version;
