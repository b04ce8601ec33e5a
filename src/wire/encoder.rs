use std::collections::HashMap;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Value, json};

use crate::element::component::ComponentId;
use crate::element::node::ElementNode;
use crate::element::props::{self, PropValue, Props};
use crate::foundation::error::{WeftError, WeftResult};
use crate::wire::chunk::{self, ModuleReference};
use crate::wire::registry::ClientComponentRegistry;

/// Strings longer than this are offloaded into their own literal chunk.
pub(crate) const LITERAL_INLINE_MAX: usize = 1024;

/// Encodes one composed tree into a wire chunk stream.
///
/// Module-id and data-id counters are instance state and reset on every
/// [`Encoder::encode`] call; concurrent encodes need distinct instances.
pub struct Encoder<'r> {
    registry: &'r ClientComponentRegistry,
    module_ids: HashMap<ComponentId, u32>,
    referenced: Vec<ModuleReference>,
    module_rows: Vec<String>,
    literal_rows: Vec<String>,
    next_module_id: u32,
    next_chunk_id: u32,
}

impl<'r> Encoder<'r> {
    /// Create an encoder bound to a per-request registry.
    pub fn new(registry: &'r ClientComponentRegistry) -> Self {
        Self {
            registry,
            module_ids: HashMap::new(),
            referenced: Vec::new(),
            module_rows: Vec::new(),
            literal_rows: Vec::new(),
            next_module_id: 1,
            next_chunk_id: chunk::ROOT_CHUNK_ID + 1,
        }
    }

    /// Encode `tree` into a wire string.
    ///
    /// Server-only components are invoked (awaited if pending) and vanish from
    /// the wire, leaving only their output; downstream boundaries become
    /// module reference tokens without ever being invoked.
    #[tracing::instrument(skip_all)]
    pub async fn encode(&mut self, tree: &ElementNode) -> WeftResult<String> {
        self.reset();
        let root = self.encode_element(tree).await?;
        let payload = serde_json::to_string(&root)
            .map_err(|e| WeftError::encode(format!("serialize root chunk: {e}")))?;

        let mut out = String::new();
        for row in self.module_rows.iter().chain(self.literal_rows.iter()) {
            out.push_str(row);
        }
        out.push_str(&chunk::format_line(
            chunk::DATA_TAG,
            chunk::ROOT_CHUNK_ID,
            &payload,
        ));
        Ok(out)
    }

    /// Module references emitted by the last encode, in first-use order.
    pub fn referenced_components(&self) -> &[ModuleReference] {
        &self.referenced
    }

    fn reset(&mut self) {
        self.module_ids.clear();
        self.referenced.clear();
        self.module_rows.clear();
        self.literal_rows.clear();
        self.next_module_id = 1;
        self.next_chunk_id = chunk::ROOT_CHUNK_ID + 1;
    }

    fn encode_element<'a>(&'a mut self, node: &'a ElementNode) -> BoxFuture<'a, WeftResult<Value>> {
        async move {
            match node {
                ElementNode::Host { tag, key, props } => {
                    if tag == chunk::DEFERRED_TAG
                        || tag.starts_with(chunk::MODULE_TOKEN_PREFIX)
                    {
                        return Err(WeftError::encode(format!(
                            "host tag '{tag}' collides with a reserved wire token"
                        )));
                    }
                    let props = self.encode_props(props).await?;
                    Ok(json!([chunk::ELEMENT_MARKER, tag, key, props]))
                }
                ElementNode::Deferred { fallback, primary } => {
                    // The boundary is preserved explicitly, never flattened.
                    let fallback = self.encode_element(fallback).await?;
                    let primary = self.encode_element(primary).await?;
                    Ok(json!([
                        chunk::ELEMENT_MARKER,
                        chunk::DEFERRED_TAG,
                        Value::Null,
                        { "fallback": fallback, "primary": primary }
                    ]))
                }
                ElementNode::Component { component, props } => {
                    // The registry check precedes any invocation: a downstream
                    // boundary is referenced, never executed here.
                    if let Some(module) = self.registry.get(component.id()).cloned() {
                        let token = self.module_token(component.id().clone(), module)?;
                        let props = self.encode_props(props).await?;
                        return Ok(json!([
                            chunk::ELEMENT_MARKER,
                            format!("{}{token}", chunk::MODULE_TOKEN_PREFIX),
                            Value::Null,
                            props
                        ]));
                    }
                    let output = component.invoke(props.clone()).map_err(|e| {
                        WeftError::encode(format!(
                            "invoke component '{}' during encode: {e}",
                            component.id()
                        ))
                    })?;
                    let rendered = output.resolve().await.map_err(|e| {
                        WeftError::encode(format!(
                            "component '{}' rejected during encode: {e}",
                            component.id()
                        ))
                    })?;
                    self.encode_element(&rendered).await
                }
            }
        }
        .boxed()
    }

    fn encode_props<'a>(&'a mut self, props: &'a Props) -> BoxFuture<'a, WeftResult<Value>> {
        async move {
            let mut map = serde_json::Map::with_capacity(props.len());
            for (k, v) in props.iter() {
                if props::is_reserved_key(k) {
                    continue;
                }
                map.insert(k.to_owned(), self.encode_value(v).await?);
            }
            Ok(Value::Object(map))
        }
        .boxed()
    }

    fn encode_value<'a>(&'a mut self, value: &'a PropValue) -> BoxFuture<'a, WeftResult<Value>> {
        async move {
            Ok(match value {
                PropValue::Null => Value::Null,
                PropValue::Bool(b) => Value::Bool(*b),
                PropValue::Number(n) => json!(n),
                PropValue::String(s) => self.encode_string(s),
                PropValue::List(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        out.push(self.encode_value(item).await?);
                    }
                    Value::Array(out)
                }
                PropValue::Map(entries) => {
                    let mut map = serde_json::Map::with_capacity(entries.len());
                    for (k, v) in entries {
                        map.insert(k.clone(), self.encode_value(v).await?);
                    }
                    Value::Object(map)
                }
                PropValue::Element(node) => self.encode_element(node).await?,
                // Functions are not serializable.
                PropValue::Handler(_) => Value::Null,
            })
        }
        .boxed()
    }

    fn encode_string(&mut self, s: &str) -> Value {
        if s.len() > LITERAL_INLINE_MAX {
            let id = self.next_chunk_id;
            self.next_chunk_id += 1;
            let payload = Value::String(s.to_owned()).to_string();
            self.literal_rows
                .push(chunk::format_line(chunk::LITERAL_TAG, id, &payload));
            return Value::String(format!("${id}"));
        }
        if s.starts_with('$') {
            // Escape the sigil so references stay unambiguous.
            return Value::String(format!("${s}"));
        }
        Value::String(s.to_owned())
    }

    fn module_token(&mut self, id: ComponentId, module: ModuleReference) -> WeftResult<u32> {
        if let Some(token) = self.module_ids.get(&id) {
            return Ok(*token);
        }
        let token = self.next_module_id;
        self.next_module_id += 1;
        let payload = serde_json::to_string(&module)
            .map_err(|e| WeftError::encode(format!("serialize module reference: {e}")))?;
        self.module_rows
            .push(chunk::format_line(chunk::MODULE_TAG, token, &payload));
        self.referenced.push(module);
        self.module_ids.insert(id, token);
        Ok(token)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/wire/encoder.rs"]
mod tests;
