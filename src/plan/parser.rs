use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::{ResourceDeclaration, provider_short_name};
use crate::importer::AttributeView;

/// Extracts import candidates from a JSON plan (`terraform show -json`)
pub struct PlanParser {
    plan_path: PathBuf,
}

impl PlanParser {
    pub fn new(plan_path: &Path) -> Self {
        Self {
            plan_path: plan_path.to_path_buf(),
        }
    }

    /// Read and parse the plan file
    pub fn parse(&self) -> Result<Vec<ResourceDeclaration>> {
        let content = fs::read_to_string(&self.plan_path)
            .with_context(|| format!("Failed to read plan file: {}", self.plan_path.display()))?;

        Self::parse_str(&content)
    }

    /// Parse plan JSON already in memory
    pub fn parse_str(content: &str) -> Result<Vec<ResourceDeclaration>> {
        let plan: Value =
            serde_json::from_str(content).context("Failed to parse plan file as JSON")?;

        let changes = plan
            .get("resource_changes")
            .and_then(|c| c.as_array())
            .context("Plan has no resource_changes; was it rendered with `show -json`?")?;

        Ok(changes.iter().filter_map(Self::extract_declaration).collect())
    }

    /// Managed resources the plan would create are the ones that may already exist remotely
    fn extract_declaration(change: &Value) -> Option<ResourceDeclaration> {
        if change.get("mode").and_then(|m| m.as_str()) != Some("managed") {
            return None;
        }

        let creates = change
            .pointer("/change/actions")
            .and_then(|a| a.as_array())
            .is_some_and(|actions| actions.iter().any(|a| a.as_str() == Some("create")));

        if !creates {
            return None;
        }

        let resource_type = change.get("type")?.as_str()?;
        let label = change.get("name")?.as_str()?;

        let address = change
            .get("address")
            .and_then(|a| a.as_str())
            .map(|a| a.to_string())
            .unwrap_or_else(|| format!("{}.{}", resource_type, label));

        let provider = change
            .get("provider_name")
            .and_then(|p| p.as_str())
            .map(provider_short_name)
            .unwrap_or_else(|| super::provider_from_type(resource_type))
            .to_string();

        let attributes = change
            .pointer("/change/after")
            .map(AttributeView::from_json)
            .unwrap_or_default();

        // The remote name usually lives in a `name` attribute; fall back to the label
        let name = attributes
            .get("name")
            .as_str()
            .unwrap_or(label)
            .to_string();

        Some(ResourceDeclaration {
            provider,
            address,
            resource_type: resource_type.to_string(),
            name,
            attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PLAN: &str = r#"{
        "format_version": "1.2",
        "resource_changes": [
            {
                "address": "aws_ecs_service.web",
                "mode": "managed",
                "type": "aws_ecs_service",
                "name": "web",
                "provider_name": "registry.terraform.io/hashicorp/aws",
                "change": {
                    "actions": ["create"],
                    "after": {"name": "web-service", "cluster": "arn:aws:ecs:eu-central-1:1:cluster/prod"}
                }
            },
            {
                "address": "aws_elasticache_cluster.cache",
                "mode": "managed",
                "type": "aws_elasticache_cluster",
                "name": "cache",
                "provider_name": "registry.terraform.io/hashicorp/aws",
                "change": {"actions": ["create"], "after": {"cluster_id": "cache-1"}}
            },
            {
                "address": "aws_iam_role.existing",
                "mode": "managed",
                "type": "aws_iam_role",
                "name": "existing",
                "provider_name": "registry.terraform.io/hashicorp/aws",
                "change": {"actions": ["no-op"], "after": {"name": "existing"}}
            },
            {
                "address": "data.aws_caller_identity.current",
                "mode": "data",
                "type": "aws_caller_identity",
                "name": "current",
                "provider_name": "registry.terraform.io/hashicorp/aws",
                "change": {"actions": ["read"], "after": {}}
            },
            {
                "address": "aws_security_group.replaced",
                "mode": "managed",
                "type": "aws_security_group",
                "name": "replaced",
                "provider_name": "registry.terraform.io/hashicorp/aws",
                "change": {"actions": ["delete", "create"], "after": {"name": "api", "vpc_id": "vpc-1"}}
            }
        ]
    }"#;

    #[test]
    fn test_parse_keeps_managed_creates() {
        let declarations = PlanParser::parse_str(PLAN).unwrap();
        let addresses: Vec<&str> = declarations.iter().map(|d| d.address.as_str()).collect();

        assert_eq!(
            addresses,
            vec![
                "aws_ecs_service.web",
                "aws_elasticache_cluster.cache",
                "aws_security_group.replaced"
            ]
        );
    }

    #[test]
    fn test_name_prefers_name_attribute() {
        let declarations = PlanParser::parse_str(PLAN).unwrap();

        assert_eq!(declarations[0].name, "web-service");
        assert_eq!(declarations[0].provider, "aws");
        assert_eq!(
            declarations[0].attributes.get("cluster").as_str(),
            Some("arn:aws:ecs:eu-central-1:1:cluster/prod")
        );
        // No name attribute: label is used
        assert_eq!(declarations[1].name, "cache");
    }

    #[test]
    fn test_parse_rejects_non_plan_json() {
        let err = PlanParser::parse_str(r#"{"resources": []}"#).unwrap_err();
        assert!(err.to_string().contains("resource_changes"));
    }

    #[test]
    fn test_parse_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PLAN.as_bytes()).unwrap();

        let declarations = PlanParser::new(file.path()).parse().unwrap();
        assert_eq!(declarations.len(), 3);
    }

    #[test]
    fn test_missing_file_mentions_path() {
        let err = PlanParser::new(Path::new("/nonexistent/plan.json"))
            .parse()
            .unwrap_err();

        assert!(err.to_string().contains("/nonexistent/plan.json"));
    }
}
