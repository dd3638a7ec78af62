//! Priority-pattern builder.
//!
//! A service's `supported_interface_types` can be described as a set, a
//! mapping, or a tuple of either, unioned together. This collapses that
//! union into one builder API that accumulates a normalized list of
//! `(type, priority | Unlocated)` pairs.

use std::any::{type_name, TypeId};

/// A claimed interface type's priority. `Unlocated` (a bare-set
/// entries) never wins a conflict against anything, including another
/// `Unlocated` claim for the same type - ties and unlocated collisions are
/// both `interface-conflict`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriorityLevel {
    Unlocated,
    Numeric(i64),
}

#[derive(Clone, Copy, Debug)]
pub struct Claim {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub level: PriorityLevel,
}

/// Accumulates the interface types a `Service` claims, and at what
/// priority. Built incrementally with `set`/`priority`, or assembled from
/// several patterns with `compose`.
#[derive(Clone, Debug, Default)]
pub struct Priority {
    claims: Vec<Claim>,
}

impl Priority {
    pub fn new() -> Self {
        Self { claims: Vec::new() }
    }

    /// Claims `T` without a numeric priority (a bare-set entry).
    pub fn set<T: 'static>(mut self) -> Self {
        self.claims.push(Claim {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            level: PriorityLevel::Unlocated,
        });
        self
    }

    /// Claims `T` at numeric priority `n` (a mapping entry).
    pub fn priority<T: 'static>(mut self, n: i64) -> Self {
        self.claims.push(Claim {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            level: PriorityLevel::Numeric(n),
        });
        self
    }

    /// Flattens several patterns into one (a tuple entry).
    pub fn compose(patterns: impl IntoIterator<Item = Priority>) -> Self {
        let mut claims = Vec::new();
        for pattern in patterns {
            claims.extend(pattern.claims);
        }
        Self { claims }
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }
}
