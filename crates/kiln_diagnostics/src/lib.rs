//! Build diagnostic aggregation, severity filtering, and multi-listener fan-out.
//!
//! This crate provides structured [`Diagnostic`] records with severity levels,
//! codes, and source locations. The thread-safe [`Aggregator`] counts warnings
//! and errors, applies the severity threshold and warning throttle, tracks
//! whether the build has failed, and dispatches each accepted diagnostic to every
//! registered [`DiagnosticListener`] through a [`ListenerRegistry`].
//! Reference listeners live in [`listeners`]; [`DiagnosticRenderer`]
//! implementations format diagnostics for terminal or JSON output.

#![warn(missing_docs)]

pub mod aggregator;
pub mod code;
pub mod diagnostic;
pub mod error;
pub mod listener;
pub mod listeners;
pub mod registry;
pub mod renderer;
pub mod severity;
pub mod summary;

pub use aggregator::{throttle_sentinel, Aggregator, AggregatorBuilder, DEFAULT_THROTTLE_LIMIT};
pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use error::{DiagnosticsError, ListenerError, ListenerFailure, ListenerOperation};
pub use listener::DiagnosticListener;
pub use registry::{ListenerHandle, ListenerRegistry};
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use summary::BuildSummary;
