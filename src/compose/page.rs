use crate::compose::composer::compose;
use crate::compose::route::{QueryParams, RouteChain, RouteParams};
use crate::foundation::error::WeftResult;
use crate::wire::chunk::ModuleReference;
use crate::wire::encoder::Encoder;
use crate::wire::registry::ClientComponentRegistry;

/// One fully built page: wire bytes plus the modules it references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedPage {
    /// The encoded wire string.
    pub wire: String,
    /// Module references emitted during encoding, in first-use order.
    pub modules: Vec<ModuleReference>,
}

/// Compose and encode a route in one step.
///
/// This is the build path shared by initial rendering and background
/// regeneration; both produce artifacts through it so published output never
/// diverges from what a live request would render.
#[tracing::instrument(skip_all)]
pub async fn build_page(
    chain: &RouteChain,
    route_params: &RouteParams,
    query_params: &QueryParams,
    registry: &ClientComponentRegistry,
) -> WeftResult<EncodedPage> {
    let tree = compose(chain, route_params, query_params).await?;
    let mut encoder = Encoder::new(registry);
    let wire = encoder.encode(&tree).await?;
    Ok(EncodedPage {
        wire,
        modules: encoder.referenced_components().to_vec(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compose/page.rs"]
mod tests;
