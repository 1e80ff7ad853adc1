//! # journal-mirror
//!
//! A command-line tool for mirroring a family journal's moments (text notes,
//! photos, videos) from the journal service's HTTP API to a local directory
//! tree.
//!
//! ## Overview
//!
//! `journal-mirror` fetches journaled entries for a date range and writes
//! them under `root/{journalId}/{yyyy}/{mm}/{dd}/`, alongside day- and
//! month-level JSON manifests indexing what was mirrored. Paths are a pure
//! function of each entry, so re-running a sync overwrites files in place
//! instead of duplicating them, and the manifests record each entry's remote
//! version so later runs can detect which dates changed.
//!
//! ## Key behaviors
//!
//! - **Whole-month fetching**: the remote API only serves whole months, so a
//!   range is covered month by month and trimmed locally
//! - **Partial-failure tolerance**: one entry failing to download never stops
//!   the rest; failures are reported per entry at the end of the run
//! - **Bounded parallelism**: downloads run on a small worker pool sized by
//!   configuration
//! - **Change detection**: mirrored manifests are diffed against a fresh
//!   fetch to find dates with remote edits
//!
//! ## Architecture
//!
//! The library is organized into modules that handle different aspects of
//! the mirroring process:
//!
//! - Configuration ([`config`], [`settings`])
//! - The error taxonomy ([`error`])
//! - Remote data model ([`archive`]) and wire parsing ([`parser`])
//! - The HTTP client ([`api`])
//! - The sync pipeline and local mirror layout ([`mirror`])
//! - Run reporting ([`report`]) and logging ([`logger`])

/// Platform-agnostic configuration directory management.
///
/// Locates the configuration directory following platform conventions (XDG
/// on Linux, Application Support on macOS, AppData on Windows) and derives
/// the settings and log file paths from it.
pub mod config;

/// Connection and mirror settings.
///
/// A single `Settings` struct loaded from TOML at process start, validated
/// up front (absolute API URL, non-empty auth header pair, worker count
/// within bounds), and passed explicitly into every collaborator.
pub mod settings;

/// The error taxonomy for the mirror library.
///
/// Distinguishes fatal errors (configuration, arguments, API fetches,
/// storage root) from per-entry download failures, which are recorded in
/// the run report and never abort a run.
pub mod error;

/// Remote data model: journals, children, and entries.
///
/// Read-only value objects rebuilt fresh on every fetch. `Entry` enforces
/// the type/content invariants at construction (a text entry has a caption
/// and no source URL; media entries always have one).
pub mod archive;

/// Wire-format parsing for the journal service's JSON responses.
///
/// Maps raw entry and journal records into the typed model, skipping
/// deleted records and failed video transcodes, and normalizes per-day sort
/// positions (including the remote's highest-value-first override
/// convention).
pub mod parser;

/// Authenticated HTTP client for the journal service.
///
/// Issues journal, day, and month queries with the configured auth header,
/// decompresses gzip/deflate bodies, rejects non-"ok" response envelopes,
/// and downloads entry media without ever leaving partial files.
pub mod api;

/// The sync pipeline and local mirror layout.
///
/// Implements range fetching (month by month, trimmed locally), the
/// two-phase write (content first, then ordered day/month manifests),
/// deterministic path construction, and manifest-based change detection.
pub mod mirror;

/// Per-run reporting.
///
/// One outcome record per entry (success with written paths, or failure
/// with the attempted path and reason) plus run totals, printed as a
/// colored summary.
pub mod report;

/// Logging configuration and utilities.
///
/// Sets up console logging (configurable via `RUST_LOG`) plus a persistent
/// log file in the config directory with size-based rotation.
pub mod logger;
