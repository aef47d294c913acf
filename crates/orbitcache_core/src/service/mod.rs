//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate fetch, parse, store and propagation into the two use cases
//!   (cache refresh and position query).
//! - Keep the CLI decoupled from storage details.

pub mod element_service;
