//! Model integration tests
//!
//! Lifecycle of a single model: construction, URL resolution and the
//! fetch/save/destroy operations with their status bookkeeping.

mod lifecycle;
