//! Declared resources handed to the importers.
//!
//! Declarations come from one of two already-rendered sources:
//! - the JSON form of a saved plan (`terraform show -json plan.out`), where
//!   every managed resource the plan would create is a candidate for import
//! - a hand-written YAML/JSON declarations file

mod declarations;
mod parser;

pub use declarations::DeclarationFile;
pub use parser::PlanParser;

use crate::importer::AttributeView;
use serde::Serialize;

/// A resource declared in infrastructure code
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDeclaration {
    /// Provider routing key (e.g., "aws")
    pub provider: String,
    /// Resource address used in the import command (e.g., aws_ecs_service.web)
    pub address: String,
    /// Resource type (e.g., aws_ecs_service)
    pub resource_type: String,
    /// Declared name used as the lookup key
    pub name: String,
    /// Declared configuration
    pub attributes: AttributeView,
}

/// Provider implied by a resource type ("aws_iam_role" -> "aws")
pub fn provider_from_type(resource_type: &str) -> &str {
    resource_type
        .split_once('_')
        .map(|(provider, _)| provider)
        .unwrap_or(resource_type)
}

/// Short provider name from a fully qualified source
/// ("registry.terraform.io/hashicorp/aws" -> "aws")
pub fn provider_short_name(provider: &str) -> &str {
    let trimmed = provider.trim_end_matches(['"', ']']);
    trimmed
        .rsplit('/')
        .next()
        .unwrap_or(trimmed)
        .trim_matches('"')
}
