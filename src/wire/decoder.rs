use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::element::node::ElementNode;
use crate::element::props::{PropValue, Props};
use crate::foundation::error::{WeftError, WeftResult};
use crate::wire::chunk::{self, ChunkBody, ModuleReference, WireFailure};
use crate::wire::resolve::ComponentResolver;

/// Decodes wire bytes back into an element tree.
///
/// Downstream references are materialized through the configured
/// [`ComponentResolver`]; the decoder itself never loads component code.
pub struct Decoder<R: ComponentResolver> {
    resolver: R,
}

struct ResolveState<'w> {
    modules: &'w HashMap<u32, ModuleReference>,
    chunks: &'w HashMap<u32, ChunkBody>,
    resolving: HashSet<u32>,
}

impl<R: ComponentResolver> Decoder<R> {
    /// Create a decoder with a resolution strategy.
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// The decoder's resolution strategy.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Decode a wire string into an element tree.
    ///
    /// Malformed chunk lines are logged and treated as missing nodes so one
    /// corrupt line does not abandon an otherwise-valid tree; a missing root
    /// chunk or a failure chunk is terminal.
    #[tracing::instrument(skip_all)]
    pub fn decode(&self, wire: &str) -> WeftResult<ElementNode> {
        let (modules, chunks) = parse_wire(wire);
        let mut state = ResolveState {
            modules: &modules,
            chunks: &chunks,
            resolving: HashSet::new(),
        };

        let root = match chunks.get(&chunk::ROOT_CHUNK_ID) {
            None => return Err(WeftError::decode("missing root data chunk 0")),
            Some(ChunkBody::Failure(failure)) => return Err(failure_error(failure)),
            Some(ChunkBody::Literal(_)) => {
                return Err(WeftError::decode("root chunk 0 is not a data chunk"));
            }
            Some(ChunkBody::Data(value)) => self.resolve_value(&mut state, value)?,
        };

        match root {
            PropValue::Element(node) => Ok(*node),
            _ => Err(WeftError::decode("root chunk does not contain an element")),
        }
    }

    fn resolve_value(&self, state: &mut ResolveState<'_>, value: &Value) -> WeftResult<PropValue> {
        Ok(match value {
            Value::Null => PropValue::Null,
            Value::Bool(b) => PropValue::Bool(*b),
            Value::Number(n) => PropValue::Number(n.as_f64().unwrap_or_default()),
            Value::String(s) => self.resolve_string(state, s)?,
            Value::Array(items) => {
                if is_element_tuple(items) {
                    match self.resolve_element(state, items)? {
                        Some(node) => PropValue::Element(Box::new(node)),
                        None => PropValue::Null,
                    }
                } else {
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        out.push(self.resolve_value(state, item)?);
                    }
                    PropValue::List(out)
                }
            }
            Value::Object(entries) => {
                let mut out = std::collections::BTreeMap::new();
                for (k, v) in entries {
                    out.insert(k.clone(), self.resolve_value(state, v)?);
                }
                PropValue::Map(out)
            }
        })
    }

    /// Resolve an element 4-tuple. `None` means the node degraded to a
    /// missing chunk and was already logged.
    fn resolve_element(
        &self,
        state: &mut ResolveState<'_>,
        items: &[Value],
    ) -> WeftResult<Option<ElementNode>> {
        let ty = items[1]
            .as_str()
            .ok_or_else(|| WeftError::decode("element type slot must be a string"))?;

        if ty == chunk::DEFERRED_TAG {
            let props = items[3]
                .as_object()
                .ok_or_else(|| WeftError::decode("deferred boundary props must be an object"))?;
            let fallback = self.resolve_boundary_side(state, props.get("fallback"), "fallback")?;
            let primary = self.resolve_boundary_side(state, props.get("primary"), "primary")?;
            return Ok(Some(ElementNode::deferred(fallback, primary)));
        }

        if let Some(rest) = ty.strip_prefix(chunk::MODULE_TOKEN_PREFIX) {
            let module_id = rest
                .parse::<u32>()
                .map_err(|_| WeftError::decode(format!("malformed module token '{ty}'")))?;
            let Some(module) = state.modules.get(&module_id) else {
                tracing::warn!(module_id, "dangling module reference; dropping node");
                return Ok(None);
            };
            let component = self.resolver.resolve(module)?;
            let props = self.resolve_props(state, &items[3])?;
            return Ok(Some(ElementNode::component(component, props)));
        }

        let key = match &items[2] {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => {
                tracing::warn!(slot = %other, "non-string element key; ignoring");
                None
            }
        };
        let props = self.resolve_props(state, &items[3])?;
        Ok(Some(ElementNode::host(ty, key, props)))
    }

    fn resolve_boundary_side(
        &self,
        state: &mut ResolveState<'_>,
        side: Option<&Value>,
        name: &str,
    ) -> WeftResult<ElementNode> {
        let value = side
            .ok_or_else(|| WeftError::decode(format!("deferred boundary missing '{name}'")))?;
        match self.resolve_value(state, value)? {
            PropValue::Element(node) => Ok(*node),
            _ => Err(WeftError::decode(format!(
                "deferred boundary '{name}' is not an element"
            ))),
        }
    }

    fn resolve_props(&self, state: &mut ResolveState<'_>, value: &Value) -> WeftResult<Props> {
        match value {
            Value::Null => Ok(Props::new()),
            Value::Object(entries) => {
                let mut props = Props::new();
                for (k, v) in entries {
                    let resolved = self.resolve_value(state, v)?;
                    props.set(k.clone(), resolved);
                }
                Ok(props)
            }
            _ => Err(WeftError::decode("element props slot must be an object or null")),
        }
    }

    fn resolve_string(&self, state: &mut ResolveState<'_>, s: &str) -> WeftResult<PropValue> {
        let Some(rest) = s.strip_prefix('$') else {
            return Ok(PropValue::String(s.to_owned()));
        };
        if rest.starts_with('$') {
            // Unescape one doubled sigil.
            return Ok(PropValue::String(rest.to_owned()));
        }
        if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
            let Ok(id) = rest.parse::<u32>() else {
                tracing::warn!(token = s, "chunk reference id out of range; treating as null");
                return Ok(PropValue::Null);
            };
            return self.resolve_chunk_ref(state, id);
        }
        tracing::warn!(token = s, "unknown '$' token; keeping as literal string");
        Ok(PropValue::String(s.to_owned()))
    }

    fn resolve_chunk_ref(&self, state: &mut ResolveState<'_>, id: u32) -> WeftResult<PropValue> {
        if state.resolving.contains(&id) {
            tracing::warn!(id, "cyclic chunk reference; treating as null");
            return Ok(PropValue::Null);
        }
        let chunks = state.chunks;
        match chunks.get(&id) {
            None => {
                tracing::warn!(id, "dangling chunk reference; treating as null");
                Ok(PropValue::Null)
            }
            Some(ChunkBody::Literal(s)) => Ok(PropValue::String(s.clone())),
            Some(ChunkBody::Failure(failure)) => Err(failure_error(failure)),
            Some(ChunkBody::Data(value)) => {
                state.resolving.insert(id);
                let out = self.resolve_value(state, value);
                state.resolving.remove(&id);
                out
            }
        }
    }
}

fn is_element_tuple(items: &[Value]) -> bool {
    items.len() == 4 && items[0].as_str() == Some(chunk::ELEMENT_MARKER)
}

fn failure_error(failure: &WireFailure) -> WeftError {
    match &failure.stack {
        Some(stack) => WeftError::decode(format!("failure chunk: {} ({stack})", failure.message)),
        None => WeftError::decode(format!("failure chunk: {}", failure.message)),
    }
}

/// Split wire bytes into module and chunk maps, tolerating either physical
/// ordering. Lines that fail to parse are logged and skipped.
fn parse_wire(wire: &str) -> (HashMap<u32, ModuleReference>, HashMap<u32, ChunkBody>) {
    let mut modules = HashMap::new();
    let mut chunks = HashMap::new();

    for (lineno, line) in wire.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let raw = match chunk::parse_line(line) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(lineno, error = %e, "skipping malformed wire line");
                continue;
            }
        };
        match raw.tag {
            chunk::MODULE_TAG => match serde_json::from_str::<ModuleReference>(raw.payload) {
                Ok(module) => {
                    modules.insert(raw.id, module);
                }
                Err(e) => tracing::warn!(lineno, error = %e, "skipping malformed module chunk"),
            },
            chunk::DATA_TAG => match serde_json::from_str::<Value>(raw.payload) {
                Ok(value) => {
                    chunks.insert(raw.id, ChunkBody::Data(value));
                }
                Err(e) => tracing::warn!(lineno, error = %e, "skipping malformed data chunk"),
            },
            chunk::LITERAL_TAG => match serde_json::from_str::<String>(raw.payload) {
                Ok(s) => {
                    chunks.insert(raw.id, ChunkBody::Literal(s));
                }
                Err(e) => tracing::warn!(lineno, error = %e, "skipping malformed literal chunk"),
            },
            chunk::FAILURE_TAG => match serde_json::from_str::<WireFailure>(raw.payload) {
                Ok(failure) => {
                    chunks.insert(raw.id, ChunkBody::Failure(failure));
                }
                Err(e) => tracing::warn!(lineno, error = %e, "skipping malformed failure chunk"),
            },
            other => tracing::warn!(lineno, tag = %other, "skipping unknown chunk type"),
        }
    }

    (modules, chunks)
}

#[cfg(test)]
#[path = "../../tests/unit/wire/decoder.rs"]
mod tests;
