//! Registry of initialized importers.
//!
//! Built once during bootstrap and shared through the application context;
//! there is no process-wide instance.

use super::aws::{AwsConfig, AwsImporter};
use super::importer::Importer;
use crate::traits::CommandExecutor;
use anyhow::{Context, Result};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

/// Ordered, append-only list of importers, looked up by name
#[derive(Default)]
pub struct ImporterRegistry {
    importers: RwLock<Vec<Arc<dyn Importer>>>,
}

impl ImporterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in importers, each already initialized
    pub fn with_defaults(config: AwsConfig, command: Arc<dyn CommandExecutor>) -> Result<Self> {
        let registry = Self::new();

        let mut aws = AwsImporter::with_config(config, command);
        aws.init().context("Failed to initialize the AWS importer")?;
        registry.register(Arc::new(aws))?;

        Ok(registry)
    }

    /// Append an initialized importer.
    ///
    /// Registering the same name twice is not deduplicated; lookups return the first.
    pub fn register(&self, importer: Arc<dyn Importer>) -> Result<()> {
        if importer.name().trim().is_empty() {
            anyhow::bail!("Importer name cannot be empty");
        }

        // Append-only, so a writer that panicked cannot leave a torn entry behind
        let mut importers = self.importers.write().unwrap_or_else(PoisonError::into_inner);
        importers.push(importer);
        Ok(())
    }

    /// Find an importer by name
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Importer>> {
        self.read()
            .iter()
            .find(|importer| importer.name() == name)
            .cloned()
    }

    /// Names of all registered importers, in registration order
    pub fn names(&self) -> Vec<String> {
        self.read().iter().map(|i| i.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<dyn Importer>>> {
        self.importers.read().unwrap_or_else(PoisonError::into_inner)
    }
}
