//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store reads/writes around scheduling decisions.
//! - Keep callers decoupled from storage details.

mod id_locks;
pub mod task_service;
