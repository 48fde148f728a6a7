//! `MyMoney` - persistence and query core for a desktop expense tracker
//!
//! This crate provides the storage layer behind a single-user expense
//! tracker: account registration and login, expense records with
//! month/year filtering, a per-account spending target, and the
//! aggregation queries that drive the category pie chart, the daily-trend
//! line chart, and the exceeded-target report. The windowed presentation
//! layer is an external consumer; nothing here depends on a rendering
//! library.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Application configuration (database path) from env and `config.toml`
pub mod config;
/// The persistence core: connection, schema, and the three stores
pub mod db;
/// Unified error types and result handling
pub mod errors;
/// Plain records crossing the core/presentation boundary
pub mod models;
