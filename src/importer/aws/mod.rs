//! AWS importer.
//!
//! Resolves import identifiers for AWS resources by querying the account
//! through the `aws` CLI. Credentials come from the CLI's usual sources:
//! - Environment variables (AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY)
//! - Shared credentials and config files (~/.aws/credentials, ~/.aws/config)
//! - SSO sessions and instance/task roles

pub mod resolvers;
mod responses;
pub mod session;

pub use session::{AwsConfig, AwsSession, DEFAULT_REGION};

use super::attributes::AttributeView;
use super::context::ResolveContext;
use super::error::{ResolveError, ResolveResult};
use super::importer::Importer;
use crate::traits::CommandExecutor;
use anyhow::Result;
use resolvers::ResolverEntry;
use std::collections::HashMap;
use std::sync::Arc;

/// Provider plugin for AWS
pub struct AwsImporter {
    /// Explicit configuration; read from the environment at `init` when absent
    config: Option<AwsConfig>,
    command: Arc<dyn CommandExecutor>,
    session: Option<AwsSession>,
    resolvers: HashMap<&'static str, ResolverEntry>,
}

impl AwsImporter {
    /// Create an importer that reads its configuration from the environment on `init`
    pub fn new(command: Arc<dyn CommandExecutor>) -> Self {
        Self {
            config: None,
            command,
            session: None,
            resolvers: resolvers::dispatch_table(),
        }
    }

    /// Create an importer with explicit configuration
    pub fn with_config(config: AwsConfig, command: Arc<dyn CommandExecutor>) -> Self {
        Self {
            config: Some(config),
            ..Self::new(command)
        }
    }
}

impl Importer for AwsImporter {
    fn name(&self) -> &str {
        "aws"
    }

    fn init(&mut self) -> Result<()> {
        if self.session.is_some() {
            anyhow::bail!("AWS importer is already initialized");
        }

        let config = self.config.clone().unwrap_or_else(AwsConfig::from_env);

        if config.region.trim().is_empty() {
            anyhow::bail!("AWS region cannot be empty");
        }

        self.session = Some(AwsSession::new(config, Arc::clone(&self.command)));
        Ok(())
    }

    fn supported_resource_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.resolvers.keys().copied().collect();
        types.sort_unstable();
        types
    }

    fn swallows_api_errors(&self, resource_type: &str) -> bool {
        self.resolvers
            .get(resource_type)
            .is_some_and(|entry| entry.swallows_api_errors)
    }

    fn get_import_name(
        &self,
        ctx: &ResolveContext,
        resource_type: &str,
        name: &str,
        attributes: &AttributeView,
    ) -> ResolveResult<Option<String>> {
        let entry = self.resolvers.get(resource_type).ok_or_else(|| {
            ResolveError::UnsupportedResourceType {
                importer: self.name().to_string(),
                resource_type: resource_type.to_string(),
            }
        })?;

        let session = self
            .session
            .as_ref()
            .ok_or_else(|| ResolveError::NotInitialized {
                importer: self.name().to_string(),
            })?;

        (entry.resolve)(session, ctx, name, attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::ErrorKind;
    use crate::traits::{MockCommandExecutor, MockCommandResult};

    fn importer(mock: &Arc<MockCommandExecutor>) -> AwsImporter {
        let mut importer =
            AwsImporter::with_config(AwsConfig::new("eu-west-1"), Arc::clone(mock) as Arc<dyn CommandExecutor>);
        importer.init().unwrap();
        importer
    }

    #[test]
    fn test_name() {
        let importer = AwsImporter::new(Arc::new(MockCommandExecutor::new()));
        assert_eq!(importer.name(), "aws");
    }

    #[test]
    fn test_unsupported_type_never_calls_the_api() {
        let mock = Arc::new(MockCommandExecutor::new());
        let importer = importer(&mock);

        for resource_type in ["aws_s3_bucket", "aws_vpc", "", "google_storage_bucket"] {
            let err = importer
                .get_import_name(
                    &ResolveContext::new(),
                    resource_type,
                    "anything",
                    &AttributeView::new(),
                )
                .unwrap_err();

            assert_eq!(err.kind(), ErrorKind::Configuration);
            assert!(err.to_string().contains("resourceType not supported"));
        }

        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_uninitialized_importer_refuses_supported_types() {
        let importer = AwsImporter::new(Arc::new(MockCommandExecutor::new()));

        let err = importer
            .get_import_name(
                &ResolveContext::new(),
                resolvers::IAM_ROLE,
                "app",
                &AttributeView::new(),
            )
            .unwrap_err();

        assert_eq!(
            err,
            ResolveError::NotInitialized {
                importer: "aws".to_string()
            }
        );
    }

    #[test]
    fn test_init_twice_fails() {
        let mock = Arc::new(MockCommandExecutor::new());
        let mut importer = importer(&mock);

        assert!(importer.init().is_err());
    }

    #[test]
    fn test_init_rejects_empty_region() {
        let mut importer =
            AwsImporter::with_config(AwsConfig::new(" "), Arc::new(MockCommandExecutor::new()));

        assert!(importer.init().is_err());

        let err = importer
            .get_import_name(
                &ResolveContext::new(),
                resolvers::IAM_ROLE,
                "app",
                &AttributeView::new(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotInitialized {
                importer: "aws".to_string()
            }
        );
    }

    #[test]
    fn test_dispatch_routes_to_resolver_with_region() {
        let mock = Arc::new(MockCommandExecutor::with_outputs(vec![
            MockCommandResult::success("aws iam get-role", r#"{"Role": {}}"#),
        ]));
        let importer = importer(&mock);

        let id = importer
            .get_import_name(
                &ResolveContext::new(),
                "aws_iam_role",
                "app",
                &AttributeView::new(),
            )
            .unwrap();

        assert_eq!(id, Some("app".to_string()));
        assert!(mock.calls()[0].contains("--region eu-west-1"));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let response = r#"{"SecurityGroups": [{"GroupName": "web", "GroupId": "sg-9"}]}"#;
        let mock = Arc::new(MockCommandExecutor::with_outputs(vec![
            MockCommandResult::success("aws ec2", response),
            MockCommandResult::success("aws ec2", response),
        ]));
        let importer = importer(&mock);
        let attributes = AttributeView::new().with("vpc_id", "vpc-1");
        let ctx = ResolveContext::new();

        let first = importer.get_import_name(&ctx, "aws_security_group", "web", &attributes);
        let second = importer.get_import_name(&ctx, "aws_security_group", "web", &attributes);

        assert_eq!(first, Ok(Some("sg-9".to_string())));
        assert_eq!(first, second);
        assert_eq!(mock.calls()[0], mock.calls()[1]);
    }

    #[test]
    fn test_supported_types_and_swallowing_flags() {
        let importer = AwsImporter::new(Arc::new(MockCommandExecutor::new()));
        let types = importer.supported_resource_types();

        assert_eq!(types.len(), 10);
        assert!(types.contains(&"aws_ecs_service"));
        assert!(importer.swallows_api_errors("aws_iam_role"));
        assert!(importer.swallows_api_errors("aws_ssm_parameter"));
        assert!(!importer.swallows_api_errors("aws_security_group"));
        assert!(!importer.swallows_api_errors("aws_s3_bucket"));
    }
}
