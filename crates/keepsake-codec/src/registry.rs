use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::error::{CodecError, CodecResult};
use crate::reader::DocumentReader;
use crate::storable::Storable;

/// Type-erased reconstruction function for one registered type.
pub type Factory = fn(&DocumentReader<'_>) -> CodecResult<Box<dyn Any + Send>>;

#[derive(Clone, Copy)]
struct Entry {
    factory: Factory,
    type_id: TypeId,
    rust_name: &'static str,
}

/// Maps current type names to reconstruction factories.
///
/// Every [`Storable`] type that may appear as a root or nested object must be
/// registered before documents of that type are restored.
#[derive(Default)]
pub struct TypeRegistry {
    entries: RwLock<HashMap<String, Entry>>,
}

fn restore_erased<T: Storable>(reader: &DocumentReader<'_>) -> CodecResult<Box<dyn Any + Send>> {
    T::read_fields(reader).map(|v| Box::new(v) as Box<dyn Any + Send>)
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under [`Storable::TYPE_NAME`].
    ///
    /// Registering the same type twice is a no-op. A different type claiming
    /// the same name is rejected.
    pub fn register<T: Storable>(&self) -> CodecResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.get(T::TYPE_NAME) {
            if existing.type_id == TypeId::of::<T>() {
                return Ok(());
            }
            return Err(CodecError::DuplicateType {
                name: T::TYPE_NAME.to_string(),
                existing: existing.rust_name,
            });
        }
        entries.insert(
            T::TYPE_NAME.to_string(),
            Entry {
                factory: restore_erased::<T>,
                type_id: TypeId::of::<T>(),
                rust_name: std::any::type_name::<T>(),
            },
        );
        debug!(name = T::TYPE_NAME, rust_type = std::any::type_name::<T>(), "type registered");
        Ok(())
    }

    /// Factory registered under `name`, if any.
    pub fn factory(&self, name: &str) -> Option<Factory> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|e| e.factory)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("names", &self.names())
            .finish()
    }
}
