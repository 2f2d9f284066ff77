use crate::context::Context;
use crate::importer::aws::AwsConfig;
use anyhow::Result;
use std::time::Duration;

/// Upper bound for the `aws --version` probe
const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Handles the 'providers' command - lists registered importers
pub struct ProvidersCommand;

impl ProvidersCommand {
    /// Print every registered importer with the resource types it resolves
    pub fn execute(ctx: &Context, aws: &AwsConfig, check: bool) -> Result<()> {
        ctx.output.section("Registered Importers");

        if ctx.registry.is_empty() {
            ctx.output.warning("No importers registered");
            return Ok(());
        }

        for name in ctx.registry.names() {
            let Some(importer) = ctx.registry.lookup(&name) else {
                continue;
            };

            ctx.output.key_value("Importer", &name);
            if name == "aws" {
                ctx.output.key_value("Region", &aws.region);
                if let Some(profile) = &aws.profile {
                    ctx.output.key_value("Profile", profile);
                }
            }

            for resource_type in importer.supported_resource_types() {
                if importer.swallows_api_errors(resource_type) {
                    ctx.output
                        .list_item(&format!("{} (API errors reported as empty)", resource_type));
                } else {
                    ctx.output.list_item(resource_type);
                }
            }
        }

        if check {
            Self::check_aws_cli(ctx);
        }

        Ok(())
    }

    /// Report whether the `aws` CLI is installed and runnable
    fn check_aws_cli(ctx: &Context) {
        ctx.output.section("Status");

        match ctx.command.execute("aws", &["--version"], Some(STATUS_TIMEOUT)) {
            Ok(output) if output.status.success() => {
                // Older CLI versions print the version on stderr
                let version = if output.stdout.is_empty() {
                    String::from_utf8_lossy(&output.stderr).trim().to_string()
                } else {
                    String::from_utf8_lossy(&output.stdout).trim().to_string()
                };
                ctx.output.success(&format!("aws CLI available: {}", version));
            }
            Ok(output) => ctx.output.error(&format!(
                "aws CLI failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )),
            Err(e) => ctx.output.error(&format!("aws CLI not available: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::ImporterRegistry;
    use crate::traits::{MockCommandExecutor, MockCommandResult, MockOutput};
    use std::sync::Arc;

    fn setup(outputs: Vec<MockCommandResult>) -> (Context, Arc<MockOutput>, Arc<MockCommandExecutor>) {
        let output = Arc::new(MockOutput::new());
        let command = Arc::new(MockCommandExecutor::with_outputs(outputs));
        let ctx = Context::test_with(Arc::clone(&output), Arc::clone(&command));
        (ctx, output, command)
    }

    #[test]
    fn test_lists_aws_types_and_marks_swallowing_ones() {
        let (ctx, output, command) = setup(vec![]);

        ProvidersCommand::execute(&ctx, &AwsConfig::default(), false).unwrap();

        let text = output.to_text();
        assert!(text.contains("aws"));
        assert!(text.contains("eu-central-1"));
        assert!(text.contains("aws_elasticache_cluster"));
        assert!(text.contains("aws_service_discovery_service"));
        assert!(text.contains("aws_iam_role (API errors reported as empty)"));
        assert!(!text.contains("aws_db_instance (API errors"));
        assert!(command.calls().is_empty());
    }

    #[test]
    fn test_empty_registry_is_reported() {
        let (ctx, output, _) = setup(vec![]);
        let ctx = Context {
            registry: Arc::new(ImporterRegistry::new()),
            ..ctx
        };

        ProvidersCommand::execute(&ctx, &AwsConfig::default(), false).unwrap();

        assert_eq!(output.get_warnings(), vec!["No importers registered"]);
    }

    #[test]
    fn test_status_check_reports_version() {
        let (ctx, output, command) = setup(vec![MockCommandResult::success(
            "aws --version",
            "aws-cli/2.15.0 Python/3.11.6",
        )]);

        ProvidersCommand::execute(&ctx, &AwsConfig::default(), true).unwrap();

        assert_eq!(command.calls(), vec!["aws --version"]);
        assert!(output.to_text().contains("aws-cli/2.15.0"));
    }

    #[test]
    fn test_status_check_reports_failure() {
        let (ctx, output, _) = setup(vec![MockCommandResult::failure(
            "aws --version",
            "broken install",
        )]);

        ProvidersCommand::execute(&ctx, &AwsConfig::default(), true).unwrap();

        assert!(output.to_text().contains("aws CLI failed: broken install"));
    }
}
