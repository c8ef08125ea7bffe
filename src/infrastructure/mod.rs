//! Infrastructure layer - Storage backends, adapter registry and wiring

pub mod adapter;
pub mod cache;
pub mod logging;
pub mod storage;
