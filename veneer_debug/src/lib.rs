// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON-lines export for veneer diagnostics.
//!
//! This crate provides [`TraceSink`](veneer_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`json::JsonLinesSink`]: one JSON object per event and line, for piping
//!   into `jq` or loading into a notebook.

pub mod json;
pub mod pretty;
