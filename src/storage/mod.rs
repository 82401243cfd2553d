//! In-memory state shared between handlers

pub mod pending;

pub use pending::{BeginError, PendingRequest, PendingRequests, RequestToken};
