//! Reconciliation: the single primitive behind `set`, `add` and `reset`.
//!
//! Each input item is resolved against the index. Existing members are optionally
//! merged; unknown items are optionally materialised and indexed; members missing from
//! the input are optionally removed. Finally the backing sequence is either replaced
//! wholesale by the resolved set (full resync) or the new members are spliced in at
//! the requested position.

use std::collections::HashSet;

use serde_json::Value;

use super::{Collection, CollectionState, Item, Pending, WeakCollection};
use crate::{Model, model::Parts};

/// Flags for [`Collection::set`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOptions {
    /// Materialise items not already in the collection
    pub add: bool,
    /// Remove members absent from the input
    pub remove: bool,
    /// Merge the attributes of items that are already members
    pub merge: bool,
    /// Insertion position for new members; negative counts from the end
    pub at: Option<isize>,
    /// Pass raw attribute items through the element schema's `parse` first
    pub parse: bool,
}

impl Default for SetOptions {
    fn default() -> Self {
        Self {
            add: true,
            remove: true,
            merge: true,
            at: None,
            parse: false,
        }
    }
}

impl SetOptions {
    /// Insert new members at `at` instead of appending.
    pub fn at(mut self, at: isize) -> Self {
        self.at = Some(at);
        self
    }

    /// Parse raw attribute items before reconciling.
    pub fn parsed(mut self) -> Self {
        self.parse = true;
        self
    }
}

/// Flags for [`Collection::add_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Insertion position; negative counts from the end
    pub at: Option<isize>,
    /// Merge attributes into members that already exist
    pub merge: bool,
}

impl From<AddOptions> for SetOptions {
    fn from(options: AddOptions) -> Self {
        Self {
            add: true,
            remove: false,
            merge: options.merge,
            at: options.at,
            parse: false,
        }
    }
}

/// Turn a requested insertion index into an absolute position.
///
/// Indices past the end append. Negative indices count from one past the end, so `-1`
/// also appends; anything before the start clamps to 0.
pub(crate) fn normalize_at(at: isize, len: usize) -> usize {
    let len = len as isize;
    let mut at = at.min(len);
    if at < 0 {
        at += len + 1;
    }
    at.max(0) as usize
}

/// Insert `insert` at `at`, shifting the tail right.
pub(crate) fn splice(models: &mut Vec<Model>, insert: Vec<Model>, at: usize) {
    let at = at.min(models.len());
    let tail = models.split_off(at);
    models.extend(insert);
    models.extend(tail);
}

impl Collection {
    /// Run raw attribute items through the element schema's `parse`.
    ///
    /// Items the parser rejects are dropped so reconciliation stays infallible.
    pub(super) fn pre_parse(&self, items: Vec<Item>, parse: bool) -> Vec<Item> {
        if !parse {
            return items;
        }
        items
            .into_iter()
            .filter_map(|item| match item {
                Item::Attributes(attributes) => {
                    match self.inner.schema.parse(Value::Object(attributes)) {
                        Ok(parsed) => Some(Item::Attributes(parsed)),
                        Err(err) => {
                            tracing::warn!(
                                collection = %self.inner.name,
                                "Dropping item rejected by parse: {err}"
                            );
                            None
                        }
                    }
                }
                model => Some(model),
            })
            .collect()
    }

    pub(super) fn reconcile(
        &self,
        state: &mut CollectionState,
        items: Vec<Item>,
        options: &SetOptions,
        pending: &mut Pending,
        weak: &WeakCollection,
    ) -> Vec<Model> {
        let at = options.at.map(|at| normalize_at(at, state.models.len()));
        let id_attribute = self.inner.schema.id_attribute();

        let mut resolved = Vec::with_capacity(items.len());
        let mut final_set = Vec::with_capacity(items.len());
        let mut seen = HashSet::with_capacity(items.len());
        let mut to_add = Vec::new();
        let mut merged = 0usize;

        for item in items {
            if let Some(existing) = self.resolve_item(state, &item) {
                if options.merge && !item.is(&existing) {
                    let applied = existing.apply(item.attributes());
                    if applied.touches(id_attribute) {
                        self.rekey(state, &existing);
                        pending.rekeyed.push(existing.clone());
                    }
                    pending.notify(existing.observers(), applied.events);
                    merged += 1;
                }
                if seen.insert(existing.cid().to_string()) {
                    final_set.push(existing.clone());
                }
                resolved.push(existing);
            } else if options.add {
                let model = self.materialize(item, weak);
                self.add_reference(state, &model, weak);
                seen.insert(model.cid().to_string());
                final_set.push(model.clone());
                to_add.push(model.clone());
                resolved.push(model);
            }
        }

        let removed = if options.remove {
            let stale: Vec<Model> = state
                .models
                .iter()
                .filter(|model| !seen.contains(model.cid()))
                .cloned()
                .collect();
            self.remove_models(state, stale, weak).len()
        } else {
            0
        };

        let added = to_add.len();
        if options.add && options.remove && !final_set.is_empty() {
            if !super::same_members(&state.models, &final_set) {
                state.models = final_set;
                pending.membership_changed = true;
            }
        } else if !to_add.is_empty() {
            let at = at.unwrap_or(state.models.len());
            splice(&mut state.models, to_add, at);
            pending.membership_changed = true;
        }
        if removed > 0 {
            pending.membership_changed = true;
        }

        tracing::trace!(
            collection = %self.inner.name,
            added,
            merged,
            removed,
            length = state.models.len(),
            "Reconciled"
        );
        resolved
    }

    /// Turn an unknown item into a member: wrap attributes, or adopt a bare model.
    fn materialize(&self, item: Item, weak: &WeakCollection) -> Model {
        match item {
            Item::Model(model) => {
                if model.collection().is_none() {
                    model.set_collection(Some(weak.clone()));
                }
                model
            }
            Item::Attributes(attributes) => Model::from_parts(Parts {
                schema: self.inner.schema.clone(),
                attributes,
                collection: Some(weak.clone()),
                transport: self.inner.transport.clone(),
                observers: self.inner.observers.clone(),
                url_root: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_at() {
        assert_eq!(normalize_at(1, 3), 1);
        assert_eq!(normalize_at(0, 3), 0);
        assert_eq!(normalize_at(3, 3), 3);
        assert_eq!(normalize_at(10, 3), 3);
        assert_eq!(normalize_at(-1, 3), 3);
        assert_eq!(normalize_at(-4, 3), 0);
        assert_eq!(normalize_at(-10, 3), 0);
        assert_eq!(normalize_at(-1, 0), 0);
    }

    #[test]
    fn test_splice_preserves_order() {
        let a = Model::new(Default::default());
        let b = Model::new(Default::default());
        let c = Model::new(Default::default());
        let x = Model::new(Default::default());
        let y = Model::new(Default::default());

        let mut models = vec![a.clone(), b.clone(), c.clone()];
        splice(&mut models, vec![x.clone(), y.clone()], 1);

        let cids: Vec<&str> = models.iter().map(Model::cid).collect();
        assert_eq!(cids, vec![a.cid(), x.cid(), y.cid(), b.cid(), c.cid()]);

        splice(&mut models, vec![Model::new(Default::default())], 99);
        assert_eq!(models.len(), 6);
    }

    #[test]
    fn test_add_options_disable_remove() {
        let options = SetOptions::from(AddOptions {
            at: Some(2),
            merge: false,
        });
        assert!(options.add);
        assert!(!options.remove);
        assert!(!options.merge);
        assert_eq!(options.at, Some(2));
    }
}
