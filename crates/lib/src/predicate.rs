//! Predicates for collection queries.
//!
//! A query either runs caller code against each model or matches a pattern of
//! expected attribute values. Both forms compile to the same closure before use.

use std::{fmt, sync::Arc};

use crate::{Attributes, Model, attributes};

/// Compiled predicate, ready to test models.
pub type Matcher = Box<dyn Fn(&Model) -> bool + Send + Sync>;

/// A test applied to each model of a collection.
#[derive(Clone)]
pub enum Predicate {
    /// Arbitrary caller code.
    Function(Arc<dyn Fn(&Model) -> bool + Send + Sync>),
    /// Every key of the pattern must deep-equal the model's attribute of the same name.
    AttributeMatch(Attributes),
}

impl Predicate {
    /// Predicate running `f` against each model.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Model) -> bool + Send + Sync + 'static,
    {
        Predicate::Function(Arc::new(f))
    }

    /// Predicate matching models whose attributes contain `pattern`.
    pub fn matching(pattern: Attributes) -> Self {
        Predicate::AttributeMatch(pattern)
    }

    /// Convert into a closure.
    pub fn compile(self) -> Matcher {
        match self {
            Predicate::Function(f) => Box::new(move |model| f(model)),
            Predicate::AttributeMatch(pattern) => {
                Box::new(move |model| attributes::matches(&model.attributes(), &pattern))
            }
        }
    }
}

impl From<Attributes> for Predicate {
    fn from(pattern: Attributes) -> Self {
        Predicate::AttributeMatch(pattern)
    }
}

impl<F> From<F> for Predicate
where
    F: Fn(&Model) -> bool + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Predicate::func(f)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Function(_) => f.write_str("Predicate::Function(..)"),
            Predicate::AttributeMatch(pattern) => {
                f.debug_tuple("Predicate::AttributeMatch").field(pattern).finish()
            }
        }
    }
}
