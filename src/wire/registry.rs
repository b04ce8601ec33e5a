use std::collections::HashMap;

use crate::element::component::ComponentId;
use crate::foundation::error::{WeftError, WeftResult};
use crate::wire::chunk::ModuleReference;

/// Per-request map from component identity to its downstream module.
///
/// Membership here is the encoder's sole test for "downstream boundary". The
/// caller builds one per request from route-chain inspection, optionally
/// merged with a globally registered component directory; nothing in this
/// crate holds registry state across requests.
#[derive(Clone, Debug, Default)]
pub struct ClientComponentRegistry {
    entries: HashMap<ComponentId, ModuleReference>,
}

impl ClientComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a downstream component.
    ///
    /// Re-registering the same identity with an identical module reference is
    /// a no-op; a conflicting module reference is rejected.
    pub fn register(
        &mut self,
        id: impl Into<ComponentId>,
        module: ModuleReference,
    ) -> WeftResult<()> {
        let id = id.into();
        if let Some(existing) = self.entries.get(&id) {
            if *existing != module {
                return Err(WeftError::validation(format!(
                    "component '{id}' already registered with a different module reference"
                )));
            }
            return Ok(());
        }
        self.entries.insert(id, module);
        Ok(())
    }

    /// Merge another registry (e.g. a global component directory) into this one.
    pub fn merge(&mut self, other: &ClientComponentRegistry) -> WeftResult<()> {
        for (id, module) in &other.entries {
            self.register(id.clone(), module.clone())?;
        }
        Ok(())
    }

    /// Look up the module reference for a component identity.
    pub fn get(&self, id: &ComponentId) -> Option<&ModuleReference> {
        self.entries.get(id)
    }

    /// Return `true` when `id` names a downstream boundary.
    pub fn contains(&self, id: &ComponentId) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/wire/registry.rs"]
mod tests;
