//! Source merging for layered configuration.

pub mod merge_policy;
