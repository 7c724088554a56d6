//! Core types shared across ncedit facilities
//!
//! This crate provides foundational types used by both error handling
//! and logging facilities:
//!
//! - **Correlation types**: MessageId, SessionId, TraceId, EditContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{EditContext, MessageId, SessionId, TraceId};
