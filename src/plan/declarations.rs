use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::{ResourceDeclaration, provider_from_type};
use crate::importer::AttributeView;

/// Hand-written list of declarations (YAML, or JSON as a YAML subset)
///
/// ```yaml
/// resources:
///   - type: aws_ecs_service
///     name: web
///     attributes:
///       cluster: arn:aws:ecs:eu-central-1:123456789012:cluster/prod
/// ```
#[derive(Debug, Deserialize)]
pub struct DeclarationFile {
    #[serde(default)]
    pub resources: Vec<DeclarationEntry>,
}

/// One entry of a declarations file; `provider` and `address` are derived when omitted
#[derive(Debug, Deserialize)]
pub struct DeclarationEntry {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub attributes: AttributeView,
}

impl DeclarationFile {
    /// Load declarations from a file
    pub fn load(path: &Path) -> Result<Vec<ResourceDeclaration>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read declarations file: {}", path.display()))?;

        Self::parse_str(&content)
            .with_context(|| format!("Invalid declarations file: {}", path.display()))
    }

    pub fn parse_str(content: &str) -> Result<Vec<ResourceDeclaration>> {
        let file: DeclarationFile = serde_yaml::from_str(content)?;

        file.resources
            .into_iter()
            .map(DeclarationEntry::into_declaration)
            .collect()
    }
}

impl DeclarationEntry {
    fn into_declaration(self) -> Result<ResourceDeclaration> {
        if self.resource_type.trim().is_empty() {
            anyhow::bail!("Resource type cannot be empty (name: {})", self.name);
        }

        let provider = self
            .provider
            .unwrap_or_else(|| provider_from_type(&self.resource_type).to_string());
        let address = self
            .address
            .unwrap_or_else(|| format!("{}.{}", self.resource_type, self.name));

        Ok(ResourceDeclaration {
            provider,
            address,
            resource_type: self.resource_type,
            name: self.name,
            attributes: self.attributes,
        })
    }
}
