//! Read-only AWS session backed by the `aws` CLI.
//!
//! Credentials, SSO and retries stay with the CLI and its usual configuration
//! files; the session only pins the region and profile and decodes JSON.

use crate::importer::context::ResolveContext;
use crate::importer::error::{ResolveError, ResolveResult};
use crate::traits::{CommandExecutor, CommandTimedOut};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Region used when `AWS_REGION` is not set
pub const DEFAULT_REGION: &str = "eu-central-1";

/// Executable invoked for every API call
pub const AWS_CLI: &str = "aws";

/// Connection settings for the AWS session
#[derive(Debug, Clone, PartialEq)]
pub struct AwsConfig {
    pub region: String,
    pub profile: Option<String>,
}

impl AwsConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile.filter(|p| !p.is_empty());
        self
    }

    /// Read `AWS_REGION` and `AWS_PROFILE`, falling back to [`DEFAULT_REGION`]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let region = lookup("AWS_REGION")
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Self::new(region).with_profile(lookup("AWS_PROFILE"))
    }
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REGION)
    }
}

/// Live session handle; immutable once built
pub struct AwsSession {
    config: AwsConfig,
    command: Arc<dyn CommandExecutor>,
}

impl AwsSession {
    pub fn new(config: AwsConfig, command: Arc<dyn CommandExecutor>) -> Self {
        Self { config, command }
    }

    /// Run `aws <service> <operation> <args>` and decode its JSON answer.
    ///
    /// Non-zero exits and undecodable output become [`ResolveError::Api`];
    /// an expired or cancelled context never reaches the CLI.
    pub fn call<T: DeserializeOwned>(
        &self,
        ctx: &ResolveContext,
        service: &str,
        operation: &str,
        args: &[&str],
    ) -> ResolveResult<T> {
        let operation_name = format!("{} {}", service, operation);
        let timeout = ctx.check(&operation_name)?;

        let mut argv: Vec<&str> = vec![service, operation];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["--region", self.config.region.as_str(), "--output", "json"]);

        if let Some(profile) = &self.config.profile {
            argv.extend_from_slice(&["--profile", profile.as_str()]);
        }

        let output = self
            .command
            .execute(AWS_CLI, &argv, timeout)
            .map_err(|err| {
                if err.downcast_ref::<CommandTimedOut>().is_some() {
                    return ResolveError::DeadlineExceeded {
                        operation: operation_name.clone(),
                    };
                }

                // A signal that reached the CLI as well must not read as an API failure
                if let Err(interrupted) = ctx.check(&operation_name) {
                    return interrupted;
                }

                ResolveError::Api {
                    operation: operation_name.clone(),
                    message: format!("failed to run {}: {}", AWS_CLI, err),
                }
            })?;

        if !output.status.success() {
            ctx.check(&operation_name)?;

            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", AWS_CLI, output.status)
            } else {
                stderr
            };

            return Err(ResolveError::Api {
                operation: operation_name,
                message,
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|err| ResolveError::Api {
            operation: operation_name,
            message: format!("unexpected response: {}", err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockCommandExecutor, MockCommandResult};
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::time::Instant;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Identity {
        account: String,
    }

    fn session(mock: Arc<MockCommandExecutor>, config: AwsConfig) -> AwsSession {
        AwsSession::new(config, mock)
    }

    #[test]
    fn test_config_defaults_region() {
        let config = AwsConfig::from_lookup(|_| None);
        assert_eq!(config.region, DEFAULT_REGION);
        assert_eq!(config.profile, None);
    }

    #[test]
    fn test_config_reads_environment() {
        let env: HashMap<&str, &str> = [("AWS_REGION", "us-west-2"), ("AWS_PROFILE", "ops")]
            .into_iter()
            .collect();
        let config = AwsConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.region, "us-west-2");
        assert_eq!(config.profile.as_deref(), Some("ops"));
    }

    #[test]
    fn test_config_ignores_empty_region() {
        let config = AwsConfig::from_lookup(|key| (key == "AWS_REGION").then(String::new));
        assert_eq!(config.region, DEFAULT_REGION);
    }

    #[test]
    fn test_call_builds_command_line() {
        let mock = Arc::new(MockCommandExecutor::with_outputs(vec![
            MockCommandResult::success("aws sts get-caller-identity", r#"{"Account": "123"}"#),
        ]));
        let session = session(
            Arc::clone(&mock),
            AwsConfig::new("us-east-1").with_profile(Some("ops".to_string())),
        );

        let identity: Identity = session
            .call(&ResolveContext::new(), "sts", "get-caller-identity", &[])
            .unwrap();

        assert_eq!(identity.account, "123");
        assert_eq!(
            mock.calls(),
            vec![
                "aws sts get-caller-identity --region us-east-1 --output json --profile ops"
            ]
        );
    }

    #[test]
    fn test_call_maps_failure_to_api_error() {
        let mock = Arc::new(MockCommandExecutor::with_outputs(vec![
            MockCommandResult::failure("aws sts", "An error occurred (ExpiredToken)"),
        ]));
        let session = session(mock, AwsConfig::default());

        let err = session
            .call::<Identity>(&ResolveContext::new(), "sts", "get-caller-identity", &[])
            .unwrap_err();

        assert_eq!(
            err,
            ResolveError::Api {
                operation: "sts get-caller-identity".to_string(),
                message: "An error occurred (ExpiredToken)".to_string(),
            }
        );
    }

    #[test]
    fn test_call_rejects_unexpected_json() {
        let mock = Arc::new(MockCommandExecutor::with_outputs(vec![
            MockCommandResult::success("aws sts", "not json"),
        ]));
        let session = session(mock, AwsConfig::default());

        let err = session
            .call::<Identity>(&ResolveContext::new(), "sts", "get-caller-identity", &[])
            .unwrap_err();

        assert!(err.to_string().contains("unexpected response"));
    }

    /// Cancels the shared context while "running", then exits like a CLI hit by SIGINT
    struct CancellingExecutor {
        ctx: ResolveContext,
    }

    impl CommandExecutor for CancellingExecutor {
        fn execute(
            &self,
            _command: &str,
            _args: &[&str],
            _timeout: Option<std::time::Duration>,
        ) -> anyhow::Result<std::process::Output> {
            self.ctx.cancel();
            Ok(std::process::Output {
                status: exit_status(130),
                stdout: Vec::new(),
                stderr: b"interrupted".to_vec(),
            })
        }
    }

    /// Fails to spawn after the deadline has already passed
    struct SlowFailingExecutor;

    impl CommandExecutor for SlowFailingExecutor {
        fn execute(
            &self,
            _command: &str,
            _args: &[&str],
            _timeout: Option<std::time::Duration>,
        ) -> anyhow::Result<std::process::Output> {
            std::thread::sleep(std::time::Duration::from_millis(30));
            anyhow::bail!("broken pipe")
        }
    }

    #[cfg(unix)]
    fn exit_status(code: i32) -> std::process::ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    fn exit_status(code: i32) -> std::process::ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code as u32)
    }

    #[test]
    fn test_cancellation_during_call_is_not_an_api_error() {
        let ctx = ResolveContext::new();
        let executor = Arc::new(CancellingExecutor { ctx: ctx.clone() });
        let session = AwsSession::new(AwsConfig::default(), executor);

        let err = session
            .call::<Identity>(&ctx, "sts", "get-caller-identity", &[])
            .unwrap_err();

        assert_eq!(err, ResolveError::Cancelled);
    }

    #[test]
    fn test_deadline_passing_during_failed_call() {
        let ctx = ResolveContext::with_timeout(std::time::Duration::from_millis(5));
        let session = AwsSession::new(AwsConfig::default(), Arc::new(SlowFailingExecutor));

        let err = session
            .call::<Identity>(&ctx, "sts", "get-caller-identity", &[])
            .unwrap_err();

        assert_eq!(
            err,
            ResolveError::DeadlineExceeded {
                operation: "sts get-caller-identity".to_string()
            }
        );
    }

    #[test]
    fn test_expired_context_skips_the_call() {
        let mock = Arc::new(MockCommandExecutor::new());
        let session = session(Arc::clone(&mock), AwsConfig::default());
        let ctx = ResolveContext::new().deadline(Instant::now());

        let err = session
            .call::<Identity>(&ctx, "sts", "get-caller-identity", &[])
            .unwrap_err();

        assert!(matches!(err, ResolveError::DeadlineExceeded { .. }));
        assert!(mock.calls().is_empty());
    }
}
