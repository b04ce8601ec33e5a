use std::sync::Arc;

use dashmap::DashMap;

use crate::element::component::{ComponentId, ComponentLoader, ComponentOutput, ComponentRef};
use crate::element::node::ElementNode;
use crate::element::props::{PropValue, Props};
use crate::foundation::error::{WeftError, WeftResult};
use crate::wire::chunk::ModuleReference;

/// Strategy for materializing downstream component references during decode.
pub trait ComponentResolver {
    /// Produce a component for a module reference.
    fn resolve(&self, module: &ModuleReference) -> WeftResult<ComponentRef>;
}

fn module_cache_key(module: &ModuleReference) -> String {
    format!("{}#{}", module.id, module.export_name)
}

/// Resolution strategy that never loads real implementations.
///
/// Each downstream reference resolves to an inert stand-in that renders a
/// generic host element from the original props. A navigational `href` prop
/// is special-cased to render a real link element so pre-rendered markup
/// stays crawlable.
#[derive(Default)]
pub struct PlaceholderResolver {
    cache: DashMap<String, ComponentRef>,
}

impl PlaceholderResolver {
    /// Create a placeholder resolver with an empty identity cache.
    pub fn new() -> Self {
        Self::default()
    }
}

fn placeholder_render(props: Props) -> WeftResult<ComponentOutput> {
    let tag = match props.get("href") {
        Some(PropValue::String(_)) => "a",
        _ => "div",
    };
    Ok(ComponentOutput::Ready(ElementNode::host(tag, None, props)))
}

impl ComponentResolver for PlaceholderResolver {
    fn resolve(&self, module: &ModuleReference) -> WeftResult<ComponentRef> {
        let key = module_cache_key(module);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.value().clone());
        }
        let id = ComponentId::from(format!("placeholder:{key}"));
        let stand_in = ComponentRef::plain(id, placeholder_render);
        self.cache.insert(key, stand_in.clone());
        Ok(stand_in)
    }
}

/// Resolution strategy that loads real implementations on demand.
///
/// The resolved component defers loading to its first invocation: it fetches
/// the implementation through the [`ComponentLoader`], caches it for the
/// resolver's lifetime (reused across decodes), and delegates rendering.
pub struct DeferredLoadResolver<L: ComponentLoader + 'static> {
    loader: Arc<L>,
    cache: Arc<DashMap<String, ComponentRef>>,
}

impl<L: ComponentLoader + 'static> DeferredLoadResolver<L> {
    /// Create a deferred-load resolver over a component loader.
    pub fn new(loader: Arc<L>) -> Self {
        Self {
            loader,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Number of implementations loaded so far.
    pub fn loaded_count(&self) -> usize {
        self.cache.len()
    }
}

impl<L: ComponentLoader + 'static> ComponentResolver for DeferredLoadResolver<L> {
    fn resolve(&self, module: &ModuleReference) -> WeftResult<ComponentRef> {
        let key = module_cache_key(module);
        let id = ComponentId::from(format!("deferred:{key}"));
        let loader = Arc::clone(&self.loader);
        let cache = Arc::clone(&self.cache);
        let module = module.clone();

        Ok(ComponentRef::plain(id, move |props| {
            let loader = Arc::clone(&loader);
            let cache = Arc::clone(&cache);
            let module = module.clone();
            let key = module_cache_key(&module);
            Ok(ComponentOutput::pending(async move {
                let target = match cache.get(&key) {
                    Some(cached) => cached.value().clone(),
                    None => {
                        let loaded = loader.load(&module.id).await.map_err(|e| {
                            WeftError::render(format!("load module '{}': {e}", module.id))
                        })?;
                        if !loaded.ships_downstream {
                            return Err(WeftError::render(format!(
                                "module '{}' does not ship downstream",
                                module.id
                            )));
                        }
                        cache.insert(key, loaded.component.clone());
                        loaded.component
                    }
                };
                target.invoke(props)?.resolve().await
            }))
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/wire/resolve.rs"]
mod tests;
