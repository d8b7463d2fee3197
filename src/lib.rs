//! stubtree is a configurable HTTP stub server.
//!
//! It answers requests from a declarative tree of endpoints, each with
//! method-specific actions that pick among canned responses. The
//! configuration is validated with location-tagged errors, compiled into
//! an immutable tree, and cached until it is invalidated or reloaded.
//!
//! # Architecture
//!
//! - [`engine`] -- Path segmentation, the endpoint tree, declaration-order
//!   matching, and response selection.
//! - [`config`] -- The configuration document, validation, sources, and the
//!   caching [`ConfigStore`](config::store::ConfigStore).
//! - [`mock`] -- The fallback handler that turns engine outcomes into HTTP.
//! - [`control`] -- `POST /_control/reload`.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`server`] -- Axum server setup, shared application state, and
//!   graceful shutdown.
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, init, validate, health).
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod health;
pub mod logging;
pub mod mock;
pub mod server;
