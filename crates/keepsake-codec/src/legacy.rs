//! Type rename history.
//!
//! [`LegacyResolver`] records which type names used to be called what. It is
//! consulted in two directions:
//!
//! - forward (old → new), followed to a fixed point, when restoring a
//!   document written under an old name;
//! - reverse (new → [old]), exactly one level deep, when a store needs every
//!   discriminator that should count as "rows of type X".
//!
//! The table is append-only and never persisted. Applications re-declare
//! every rename at startup, before the first read, then [`LegacyResolver::freeze`]
//! it so later registrations cannot change how stored rows are matched.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::error::{CodecError, CodecResult};

#[derive(Debug, Default)]
struct RefactorTable {
    forward: HashMap<String, String>,
    reverse: HashMap<String, Vec<String>>,
}

/// Registry of type renames shared by the codec and the stores.
#[derive(Debug, Default)]
pub struct LegacyResolver {
    table: RwLock<RefactorTable>,
    frozen: AtomicBool,
}

impl LegacyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that documents tagged `old` now belong to type `new`.
    ///
    /// Registering the same pair twice is a no-op. Pointing `old` at a
    /// different type replaces the earlier mapping and removes `old` from the
    /// previous target's historical names.
    ///
    /// Once the resolver is frozen, registrations are ignored with a warning.
    pub fn register_refactor(&self, old: impl Into<String>, new: impl Into<String>) {
        let (old, new) = (old.into(), new.into());
        if self.is_frozen() {
            warn!(%old, %new, "resolver frozen; refactor ignored");
            return;
        }
        let mut table = self.write();

        if let Some(previous) = table.forward.insert(old.clone(), new.clone()) {
            if previous != new {
                warn!(%old, %previous, %new, "refactor target replaced");
                if let Some(names) = table.reverse.get_mut(&previous) {
                    names.retain(|n| n != &old);
                }
            }
        }

        let names = table.reverse.entry(new.clone()).or_default();
        if !names.contains(&old) {
            names.push(old.clone());
        }
        debug!(%old, %new, "refactor registered");
    }

    /// Follow the rename chain from `name` to the current type name.
    ///
    /// Names without a registered rename resolve to themselves.
    pub fn resolve(&self, name: &str) -> CodecResult<String> {
        let table = self.read();
        let mut current = name;
        let mut seen: HashSet<&str> = HashSet::from([name]);
        let mut chain = vec![name.to_string()];

        while let Some(next) = table.forward.get(current) {
            chain.push(next.clone());
            if !seen.insert(next.as_str()) {
                return Err(CodecError::RefactorCycle {
                    start: name.to_string(),
                    chain,
                });
            }
            current = next;
        }
        Ok(current.to_string())
    }

    /// Names registered directly as old names of `name`, in registration
    /// order. Chains are not followed: if `A → B → C`, the historical names
    /// of `C` are `[B]` only.
    pub fn historical_names(&self, name: &str) -> Vec<String> {
        self.read().reverse.get(name).cloned().unwrap_or_default()
    }

    /// `name` followed by its one-level historical names, without duplicates.
    pub fn discriminator_set(&self, name: &str) -> Vec<String> {
        let mut set = vec![name.to_string()];
        for old in self.historical_names(name) {
            if !set.contains(&old) {
                set.push(old);
            }
        }
        set
    }

    /// Reject every later registration. Irreversible.
    pub fn freeze(&self) {
        if !self.frozen.swap(true, Ordering::AcqRel) {
            debug!(renames = self.len(), "resolver frozen");
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Number of registered renames.
    pub fn len(&self) -> usize {
        self.read().forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().forward.is_empty()
    }

    // Mappings are inserted whole, so a panic elsewhere cannot leave the
    // table half-updated.
    fn read(&self) -> RwLockReadGuard<'_, RefactorTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RefactorTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}
