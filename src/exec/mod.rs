// src/exec/mod.rs

//! Remote execution layer.
//!
//! - [`backend`] provides the `RemoteBackend` trait the runtime dispatches
//!   through, and which tests can replace with a fake implementation.
//! - [`worker_pool`] owns the worker contexts that run remotely placed tasks.

pub mod backend;
pub mod worker_pool;

pub use backend::{LocalOnly, RemoteBackend};
pub use worker_pool::WorkerPool;
