use serde::{Deserialize, Serialize};

/// Chunk type character for module references.
pub(crate) const MODULE_TAG: char = 'M';
/// Chunk type character for data payloads.
pub(crate) const DATA_TAG: char = 'J';
/// Chunk type character for offloaded literal strings.
pub(crate) const LITERAL_TAG: char = 'S';
/// Chunk type character for failures.
pub(crate) const FAILURE_TAG: char = 'E';

/// First slot of every element 4-tuple.
pub(crate) const ELEMENT_MARKER: &str = "$";
/// Reserved type slot marking a deferred boundary.
pub(crate) const DEFERRED_TAG: &str = "__deferred__";
/// Prefix of a module reference token in the type slot.
pub(crate) const MODULE_TOKEN_PREFIX: char = '@';
/// The root of the tree is always this data chunk.
pub(crate) const ROOT_CHUNK_ID: u32 = 0;

/// Identifier plus load metadata for one downstream module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReference {
    /// Stable module id (typically the module's source path).
    pub id: String,
    /// Chunk files the consuming bundler must fetch.
    pub chunks: Vec<String>,
    /// Name of the export to bind.
    #[serde(rename = "name")]
    pub export_name: String,
}

impl ModuleReference {
    /// Create a module reference.
    pub fn new(
        id: impl Into<String>,
        chunks: Vec<String>,
        export_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            chunks,
            export_name: export_name.into(),
        }
    }
}

/// Payload of a failure chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct WireFailure {
    pub(crate) message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) stack: Option<String>,
}

/// Decoded body of a non-module chunk.
#[derive(Debug)]
pub(crate) enum ChunkBody {
    Data(serde_json::Value),
    Literal(String),
    Failure(WireFailure),
}

/// Render one wire line.
pub(crate) fn format_line(tag: char, id: u32, payload: &str) -> String {
    format!("{tag}{id}:{payload}\n")
}

/// A split but not yet interpreted wire line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RawLine<'a> {
    pub(crate) tag: char,
    pub(crate) id: u32,
    pub(crate) payload: &'a str,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LineError {
    Empty,
    MissingSeparator,
    BadId,
}

impl std::fmt::Display for LineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty line"),
            Self::MissingSeparator => write!(f, "missing ':' separator"),
            Self::BadId => write!(f, "chunk id is not a decimal integer"),
        }
    }
}

/// Split a line into `<tag><id>:<payload>` parts.
pub(crate) fn parse_line(line: &str) -> Result<RawLine<'_>, LineError> {
    let tag = line.chars().next().ok_or(LineError::Empty)?;
    let rest = &line[tag.len_utf8()..];
    let colon = rest.find(':').ok_or(LineError::MissingSeparator)?;
    let id = rest[..colon].parse::<u32>().map_err(|_| LineError::BadId)?;
    Ok(RawLine {
        tag,
        id,
        payload: &rest[colon + 1..],
    })
}

#[cfg(test)]
#[path = "../../tests/unit/wire/chunk.rs"]
mod tests;
