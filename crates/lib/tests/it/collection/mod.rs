//! Collection integration tests
//!
//! Reconciliation properties of `set`/`add`/`remove` and the remote sync
//! operations (`fetch`, `create`) against a scripted transport.

mod reconciliation;
mod sync;
