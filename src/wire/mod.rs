//! The wire codec.
//!
//! Trees travel as a line-oriented chunk stream, one chunk per line:
//!
//! ```text
//! <type-char><decimal-id>:<json>\n
//! ```
//!
//! Chunk types are `M` (module reference), `J` (data), `S` (literal string),
//! and `E` (failure). Module ids and data/literal/failure ids are independent
//! id spaces; the tree root is always data chunk `0`. Inside data payloads an
//! element is the 4-tuple `["$", type, key, props]` where `type` is a host
//! tag, the reserved `"__deferred__"` marker, or a `"@<module-id>"` reference
//! token. Strings beginning with `$` are escaped by doubling the sigil.

/// Chunk model and line grammar.
pub mod chunk;
/// Wire-to-tree decoding.
pub mod decoder;
/// Tree-to-wire encoding.
pub mod encoder;
/// The per-request downstream component registry.
pub mod registry;
/// Resolution strategies for downstream references.
pub mod resolve;
