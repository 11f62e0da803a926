//! Change notification port for reactive UI layers.
//!
//! Every mutating setter on model and collection state reports what changed to the
//! registered [`ChangeObserver`]s. The core never depends on anyone listening: an empty
//! [`Observers`] registry is a valid no-op hook.
//!
//! Observers are always invoked after internal locks have been released, so an observer
//! may freely read the model or collection that produced the event.

use std::sync::{Arc, PoisonError, RwLock};

use handle_trait::Handle;
use serde_json::Value;
use tokio::sync::mpsc;

/// Which object produced a change event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    /// A model, identified by its client id.
    Model { cid: String },
    /// A collection, identified by its configured name.
    Collection { name: String },
}

/// A single tracked-property mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// The object whose property changed
    pub source: ChangeSource,
    /// The property name (attribute name, status flag or membership key)
    pub key: String,
    /// The new value
    pub value: Value,
}

impl ChangeEvent {
    pub(crate) fn new(source: ChangeSource, key: impl Into<String>, value: Value) -> Self {
        Self {
            source,
            key: key.into(),
            value,
        }
    }
}

/// Trait for observers notified on every tracked-property mutation.
pub trait ChangeObserver: Send + Sync {
    /// Called once per mutated property, after the mutation is visible.
    fn on_change(&self, event: &ChangeEvent);
}

impl<F> ChangeObserver for F
where
    F: Fn(&ChangeEvent) + Send + Sync,
{
    fn on_change(&self, event: &ChangeEvent) {
        self(event)
    }
}

/// Observer forwarding events into an unbounded channel.
struct ChannelObserver {
    sender: mpsc::UnboundedSender<ChangeEvent>,
}

impl ChangeObserver for ChannelObserver {
    fn on_change(&self, event: &ChangeEvent) {
        // A dropped receiver only means nobody is rendering anymore.
        if self.sender.send(event.clone()).is_err() {
            tracing::trace!(key = %event.key, "Change subscriber dropped");
        }
    }
}

/// A shareable registry of change observers.
///
/// Cloning (or calling `handle()`) yields another handle to the same registry: a
/// collection hands its registry to every model it materialises, so observers registered
/// later still see member changes.
#[derive(Clone, Default, Handle)]
pub struct Observers {
    inner: Arc<RwLock<Vec<Arc<dyn ChangeObserver>>>>,
}

impl Observers {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    pub fn add(&self, observer: Arc<dyn ChangeObserver>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Subscribe to all future events through a channel.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ChangeEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.add(Arc::new(ChannelObserver { sender }));
        receiver
    }

    /// Deliver events to every registered observer, in registration order.
    pub(crate) fn emit_all(&self, events: Vec<ChangeEvent>) {
        if events.is_empty() {
            return;
        }
        // Snapshot so observers can register further observers without deadlocking.
        let observers: Vec<Arc<dyn ChangeObserver>> = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for event in &events {
            for observer in &observers {
                observer.on_change(event);
            }
        }
    }

    /// Check if any observers are registered.
    pub fn has_observers(&self) -> bool {
        !self.is_empty()
    }

    /// Get the number of registered observers.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("observers", &format!("<{} observers>", self.len()))
            .finish()
    }
}
