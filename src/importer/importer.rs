use super::attributes::AttributeView;
use super::context::ResolveContext;
use super::error::ResolveResult;
use anyhow::Result;

/// A provider plugin that resolves import identifiers for one remote system.
///
/// Implementations own a session to the remote inventory API and a dispatch
/// table from resource type to resolver. `init` must succeed exactly once
/// before the importer is registered or asked to resolve anything.
pub trait Importer: Send + Sync {
    /// Stable name used for registry lookup and declaration routing (e.g., "aws")
    fn name(&self) -> &str;

    /// Establish the remote session from ambient configuration
    fn init(&mut self) -> Result<()>;

    /// Resource types present in the dispatch table
    fn supported_resource_types(&self) -> Vec<&str>;

    /// Whether the resolver for `resource_type` turns remote API failures into
    /// an empty result instead of an error
    fn swallows_api_errors(&self, _resource_type: &str) -> bool {
        false
    }

    /// Resolve the import identifier of a declared resource.
    ///
    /// `Ok(Some(id))` is the live identifier. `Ok(None)` means the resolver
    /// swallowed a failed API call and has nothing to report.
    fn get_import_name(
        &self,
        ctx: &ResolveContext,
        resource_type: &str,
        name: &str,
        attributes: &AttributeView,
    ) -> ResolveResult<Option<String>>;
}
