//! Per-operation asynchronous state.
//!
//! Each network operation moves through `idle -> loading -> idle`, leaving either no
//! error or the captured cause behind. Errors are stored, never returned: callers await
//! the operation and then poll the status.

use std::{future::Future, sync::Arc};

use serde_json::Value;

use crate::{
    Error, Result,
    observer::{ChangeEvent, ChangeSource, Observers},
};

/// The network operations that carry their own loading/error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Save,
    Delete,
    Create,
}

impl Operation {
    /// Change key reported while the loading flag flips.
    pub fn loading_key(&self) -> &'static str {
        match self {
            Operation::Fetch => "fetch_loading",
            Operation::Save => "save_loading",
            Operation::Delete => "delete_loading",
            Operation::Create => "create_loading",
        }
    }

    /// Change key reported when the error slot changes.
    pub fn error_key(&self) -> &'static str {
        match self {
            Operation::Fetch => "fetch_error",
            Operation::Save => "save_error",
            Operation::Delete => "delete_error",
            Operation::Create => "create_error",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Fetch => "fetch",
            Operation::Save => "save",
            Operation::Delete => "destroy",
            Operation::Create => "create",
        };
        f.write_str(name)
    }
}

/// Snapshot of one operation's state.
#[derive(Debug, Clone, Default)]
pub struct OperationStatus {
    loading: bool,
    error: Option<Arc<Error>>,
}

impl OperationStatus {
    /// Whether a request for this operation is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The error captured by the most recent completed run, if it failed.
    pub fn error(&self) -> Option<Arc<Error>> {
        self.error.clone()
    }

    /// Whether the most recent completed run failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Not loading and no captured error.
    pub fn is_idle(&self) -> bool {
        !self.loading && self.error.is_none()
    }
}

/// Objects whose operation state can be tracked.
pub(crate) trait StatusTarget: Send + Sync {
    /// Mutate the status slot for `op`.
    fn update_status(&self, op: Operation, update: &mut dyn FnMut(&mut OperationStatus));

    /// Source reported in change events.
    fn change_source(&self) -> ChangeSource;

    /// Registry receiving the status change events.
    fn status_observers(&self) -> &Observers;
}

fn error_value(error: Option<&Arc<Error>>) -> Value {
    error.map_or(Value::Null, |e| Value::String(e.to_string()))
}

/// Clears the loading flag when dropped, whether the operation finished or was abandoned.
struct LoadingGuard<'a> {
    target: &'a dyn StatusTarget,
    op: Operation,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.target
            .update_status(self.op, &mut |status| status.loading = false);
        self.target.status_observers().emit_all(vec![ChangeEvent::new(
            self.target.change_source(),
            self.op.loading_key(),
            Value::Bool(false),
        )]);
    }
}

/// Run `work` as operation `op` on `target`, capturing any error into its status.
///
/// Sets the loading flag and clears the previous error before starting; on failure the
/// error is stored; the loading flag is cleared in every case, including when the
/// returned future is dropped before completion.
pub(crate) async fn track<T, F>(target: &dyn StatusTarget, op: Operation, work: F) -> Option<T>
where
    F: Future<Output = Result<T>>,
{
    target.update_status(op, &mut |status| {
        status.loading = true;
        status.error = None;
    });
    let source = target.change_source();
    target.status_observers().emit_all(vec![
        ChangeEvent::new(source.clone(), op.loading_key(), Value::Bool(true)),
        ChangeEvent::new(source.clone(), op.error_key(), Value::Null),
    ]);

    let _guard = LoadingGuard { target, op };

    match work.await {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(operation = %op, source = ?source, "Operation failed: {err}");
            let err = Arc::new(err);
            let value = error_value(Some(&err));
            target.update_status(op, &mut |status| status.error = Some(err.clone()));
            target
                .status_observers()
                .emit_all(vec![ChangeEvent::new(source, op.error_key(), value)]);
            None
        }
    }
}
