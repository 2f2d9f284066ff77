use crate::importer::ImporterRegistry;
use crate::importer::aws::AwsConfig;
use crate::traits::{CommandExecutor, Output, RealCommandExecutor, TerminalOutput};
#[cfg(test)]
use crate::traits::{MockCommandExecutor, MockOutput};
use anyhow::Result;
use std::sync::Arc;

/// Application context that holds all dependencies for dependency injection
pub struct Context {
    pub output: Arc<dyn Output>,
    pub command: Arc<dyn CommandExecutor>,
    pub registry: Arc<ImporterRegistry>,
}

impl Context {
    /// Create a new context with real implementations and the built-in importers
    pub fn new(aws: AwsConfig) -> Result<Self> {
        let command: Arc<dyn CommandExecutor> = Arc::new(RealCommandExecutor::new());
        let registry = ImporterRegistry::with_defaults(aws, Arc::clone(&command))?;

        Ok(Self {
            output: Arc::new(TerminalOutput),
            command,
            registry: Arc::new(registry),
        })
    }

    /// Create a context with mock output and command executor (for testing)
    #[cfg(test)]
    pub fn test_with(output: Arc<MockOutput>, command: Arc<MockCommandExecutor>) -> Self {
        let command: Arc<dyn CommandExecutor> = command;
        let registry = ImporterRegistry::with_defaults(AwsConfig::default(), Arc::clone(&command))
            .expect("built-in importers initialize with a default config");

        Self {
            output,
            command,
            registry: Arc::new(registry),
        }
    }
}

impl Clone for Context {
    fn clone(&self) -> Self {
        Self {
            output: Arc::clone(&self.output),
            command: Arc::clone(&self.command),
            registry: Arc::clone(&self.registry),
        }
    }
}
