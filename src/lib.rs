//! Weft composes server-rendered UI component trees, ships them across the
//! server/client boundary in a compact line-oriented wire format, and keeps
//! published output fresh through background regeneration.
//!
//! The crate is organized around three seams:
//!
//! - Compose a [`RouteChain`] of layouts around a leaf into one [`ElementNode`]
//! - Encode the tree into wire chunks with an [`Encoder`], decode it back with a
//!   [`Decoder`] and a pluggable [`ComponentResolver`] strategy
//! - Regenerate stale published artifacts with a [`RegenCoordinator`] under a
//!   single-flight lock and atomic publication
//!
//! Route discovery, HTTP transport, and bundling live above this crate; they
//! reach in through [`ComponentLoader`] and [`ContentStore`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Tree composition over route chains.
pub mod compose;
/// The element/component model shared by composition and the codec.
pub mod element;
/// Background regeneration of published artifacts.
pub mod regen;
/// The wire codec: encoder, decoder, and resolution strategies.
pub mod wire;

pub use crate::foundation::error::{WeftError, WeftResult};

pub use crate::element::component::{
    ComponentId, ComponentKind, ComponentLoader, ComponentOutput, ComponentRef, LoadedComponent,
    StatefulComponent,
};
pub use crate::element::node::ElementNode;
pub use crate::element::props::{HandlerRef, PropValue, Props};

pub use crate::compose::composer::compose;
pub use crate::compose::page::{EncodedPage, build_page};
pub use crate::compose::route::{QueryParams, RouteChain, RouteParams, RouteSegment};

pub use crate::wire::chunk::ModuleReference;
pub use crate::wire::decoder::Decoder;
pub use crate::wire::encoder::Encoder;
pub use crate::wire::registry::ClientComponentRegistry;
pub use crate::wire::resolve::{ComponentResolver, DeferredLoadResolver, PlaceholderResolver};

pub use crate::regen::coordinator::{
    PublishReceipt, RegenArtifact, RegenCoordinator, RegenOutcome, TaskState,
};
pub use crate::regen::staleness::{Revalidate, is_stale};
pub use crate::regen::store::{
    ArtifactMetadata, ContentKey, ContentStore, FsContentStore, MemoryContentStore,
};
