//! Import identifier resolution.
//!
//! An [`Importer`] owns a session to one remote system and a dispatch table
//! from resource type to resolver. The [`ImporterRegistry`] routes declared
//! resources to the importer named by their provider.
//!
//! ```text
//! registry.lookup("aws")
//!     └─ get_import_name(ctx, "aws_ecs_service", "web", attributes)
//!           └─ ecs describe-services --cluster prod --services web
//!                 └─ Ok(Some("prod/web"))
//! ```

pub mod attributes;
pub mod aws;
pub mod context;
pub mod error;
#[allow(clippy::module_inception)]
pub mod importer;
pub mod registry;

pub use attributes::AttributeView;
pub use context::ResolveContext;
pub use error::ErrorKind;
pub use registry::ImporterRegistry;
