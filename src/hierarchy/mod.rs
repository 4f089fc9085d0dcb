// src/hierarchy/mod.rs

//! Task tree bookkeeping.
//!
//! - [`node`] defines task ids, parent links and phases.
//! - [`tracker`] owns the live tasks and the fan-in counters.

pub mod node;
pub mod tracker;

pub use node::{ParentLink, RemoteOrigin, ReplyToken, TaskId, TaskNode, TaskPhase};
pub use tracker::HierarchyTracker;
