//! Task store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the narrow `get`/`put`/`delete`/`scan` store contract.
//! - Keep SQL details out of the service and scheduling layers.
//!
//! # Invariants
//! - Writes call `Task::validate()` before touching SQL.
//! - Reads reject corrupt persisted rows instead of masking them.

pub mod task_repo;
