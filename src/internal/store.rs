// SPDX-License-Identifier: MPL-2.0

//! Append-only storage for every incompatibility the solver has seen,
//! indexed by term key for unit propagation.

use std::hash::BuildHasherDefault;
use std::sync::Arc;

use rustc_hash::FxHasher;

use crate::incompatibility::Incompatibility;
use crate::requirement::Requirement;

type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// The reference storage for all incompatibilities.
///
/// Incompatibilities are never removed. The per-key index preserves
/// insertion order, which propagation relies on for determinism.
pub(crate) struct IncompatibilityStore<R: Requirement> {
    /// The authoritative sequence, in insertion order.
    all: Vec<Arc<Incompatibility<R>>>,
    /// For each key, every stored incompatibility holding a term with
    /// that key, in insertion order.
    by_key: FxIndexMap<R::Key, Vec<Arc<Incompatibility<R>>>>,
}

impl<R: Requirement> IncompatibilityStore<R> {
    pub(crate) fn new() -> Self {
        Self {
            all: Vec::new(),
            by_key: FxIndexMap::default(),
        }
    }

    /// Store an incompatibility, index it under each of its term keys,
    /// and return a shared handle to it.
    pub(crate) fn add(&mut self, incompat: Incompatibility<R>) -> Arc<Incompatibility<R>> {
        let incompat = Arc::new(incompat);
        self.all.push(Arc::clone(&incompat));
        for term in incompat.terms() {
            self.by_key
                .entry(term.key().clone())
                .or_default()
                .push(Arc::clone(&incompat));
        }
        incompat
    }

    /// Every stored incompatibility holding a term with the given key,
    /// in insertion order.
    pub(crate) fn for_key(&self, key: &R::Key) -> &[Arc<Incompatibility<R>>] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn len(&self) -> usize {
        self.all.len()
    }
}
