//! Core types for secrethook
//!
//! This crate provides the event, generation and error types shared by the
//! backend adapter and the lifecycle handler.

pub mod error;
pub mod event;

pub use error::{BackendKind, HookError, Result};
pub use event::{Action, GenerationResult, LifecycleEvent};
