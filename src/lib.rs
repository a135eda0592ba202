//! Normalize and aggregate compliance control statements.
//!
//! Source documents describe how organizational components implement
//! security and privacy controls, in whatever format and control-id
//! dialect each organization favors. This crate parses those documents,
//! canonicalizes control identifiers and component names, combines
//! per-document recognition artifacts into one provenance-preserving
//! model, and re-collates that model against selector specifications with
//! coverage reporting.

pub mod canonical;
pub mod combine;
pub mod components;
pub mod document;
pub mod error;
pub mod recognize;
pub mod report;
pub mod sample;
pub mod selector;
pub mod statement;
pub mod tagged;
