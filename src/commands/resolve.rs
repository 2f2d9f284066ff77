use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use super::parallel::run_parallel;
use crate::context::Context;
use crate::importer::{ErrorKind, ImporterRegistry, ResolveContext};
use crate::plan::{DeclarationFile, PlanParser, ResourceDeclaration};

/// Where declarations are loaded from
#[derive(Debug, Clone, Copy)]
pub enum DeclarationSource<'a> {
    /// JSON rendering of a saved plan
    Plan(&'a Path),
    /// YAML/JSON declarations file
    Declarations(&'a Path),
}

/// Options for the 'resolve' command
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Maximum number of concurrent resolutions
    pub parallel: usize,
    /// Emit a JSON report on stdout instead of import commands
    pub json: bool,
    /// Print per-resource diagnostics
    pub verbose: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            parallel: 1,
            json: false,
            verbose: false,
        }
    }
}

/// What happened to one declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// Live identifier found
    Resolved(String),
    /// The resolver swallowed a failed API call and returned nothing
    Empty,
    /// Declared configuration cannot be used for lookup
    Skipped(String),
    /// Resource does not exist remotely
    NotFound(String),
    /// Importer has no resolver for the type
    Unsupported(String),
    /// No importer is registered for the provider
    Unrouted(String),
    /// API failure, cancellation or timeout
    Failed(String),
}

/// Resolution result for one declaration
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub address: String,
    pub provider: String,
    pub resource_type: String,
    pub name: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ResolutionReport {
    /// Render the import command for a resolved resource
    pub fn import_command(&self) -> Option<String> {
        match &self.outcome {
            Outcome::Resolved(id) => Some(format!(
                "terraform import '{}' '{}'",
                shell_escape(&self.address),
                shell_escape(id)
            )),
            _ => None,
        }
    }
}

/// Counts per outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolveSummary {
    pub resolved: usize,
    pub empty: usize,
    pub skipped: usize,
    pub not_found: usize,
    pub unsupported: usize,
    pub unrouted: usize,
    pub failed: usize,
}

impl ResolveSummary {
    fn from_reports(reports: &[ResolutionReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match report.outcome {
                Outcome::Resolved(_) => summary.resolved += 1,
                Outcome::Empty => summary.empty += 1,
                Outcome::Skipped(_) => summary.skipped += 1,
                Outcome::NotFound(_) => summary.not_found += 1,
                Outcome::Unsupported(_) => summary.unsupported += 1,
                Outcome::Unrouted(_) => summary.unrouted += 1,
                Outcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }
}

/// Handles the 'resolve' command - turns declarations into import commands
pub struct ResolveCommand;

impl ResolveCommand {
    /// Execute the resolve command
    pub fn execute(
        ctx: &Context,
        source: DeclarationSource,
        options: &ResolveOptions,
        resolve_ctx: &ResolveContext,
    ) -> Result<ResolveSummary> {
        let declarations = match source {
            DeclarationSource::Plan(path) => PlanParser::new(path).parse()?,
            DeclarationSource::Declarations(path) => DeclarationFile::load(path)?,
        };

        if declarations.is_empty() {
            ctx.output.info("No resources to resolve");
        }

        Self::resolve_declarations(ctx, declarations, options, resolve_ctx)
    }

    /// Resolve already loaded declarations and report on them
    pub fn resolve_declarations(
        ctx: &Context,
        declarations: Vec<ResourceDeclaration>,
        options: &ResolveOptions,
        resolve_ctx: &ResolveContext,
    ) -> Result<ResolveSummary> {
        let reports = if options.parallel > 1 && declarations.len() > 1 {
            let registry = ctx.registry.clone();
            let resolve_ctx = resolve_ctx.clone();

            run_parallel(declarations.clone(), options.parallel, move |declaration| {
                resolve_one(&registry, &resolve_ctx, &declaration)
            })?
            .into_iter()
            .zip(declarations)
            .map(|(result, declaration)| {
                result.unwrap_or_else(|message| report(&declaration, Outcome::Failed(message)))
            })
            .collect::<Vec<_>>()
        } else {
            declarations
                .iter()
                .map(|declaration| resolve_one(&ctx.registry, resolve_ctx, declaration))
                .collect()
        };

        Self::render(ctx, &reports, options)?;

        let summary = ResolveSummary::from_reports(&reports);
        if !options.json {
            Self::render_summary(ctx, &summary);
        }

        Ok(summary)
    }

    fn render(ctx: &Context, reports: &[ResolutionReport], options: &ResolveOptions) -> Result<()> {
        if options.json {
            ctx.output.plain(&serde_json::to_string_pretty(reports)?);
            return Ok(());
        }

        for report in reports {
            match &report.outcome {
                Outcome::Resolved(id) => {
                    if let Some(command) = report.import_command() {
                        ctx.output.plain(&command);
                    }
                    if options.verbose {
                        ctx.output
                            .dimmed(&format!("{} resolved to {}", report.address, id));
                    }
                }
                Outcome::Empty => ctx.output.warning(&format!(
                    "{}: lookup failed silently, no identifier returned",
                    report.address
                )),
                Outcome::Skipped(reason) => ctx.output.warning(reason),
                Outcome::NotFound(reason) => {
                    if options.verbose {
                        ctx.output.dimmed(&format!("{}: {}", report.address, reason));
                    }
                }
                Outcome::Unsupported(reason) => {
                    if options.verbose {
                        ctx.output.dimmed(&format!("{}: {}", report.address, reason));
                    }
                }
                Outcome::Unrouted(provider) => {
                    if options.verbose {
                        ctx.output.dimmed(&format!(
                            "{}: no importer registered for provider '{}'",
                            report.address, provider
                        ));
                    }
                }
                Outcome::Failed(reason) => {
                    ctx.output.error(&format!("{}: {}", report.address, reason))
                }
            }
        }

        Ok(())
    }

    fn render_summary(ctx: &Context, summary: &ResolveSummary) {
        ctx.output.section("Summary");
        ctx.output.key_value("Resolved", &summary.resolved.to_string());
        ctx.output
            .key_value("Not found remotely", &summary.not_found.to_string());
        ctx.output.key_value("Skipped", &summary.skipped.to_string());
        ctx.output
            .key_value("Unsupported type", &summary.unsupported.to_string());
        ctx.output
            .key_value("No importer", &summary.unrouted.to_string());
        if summary.empty > 0 {
            ctx.output
                .key_value("Empty (API error ignored)", &summary.empty.to_string());
        }
        if summary.failed > 0 {
            ctx.output.key_value("Failed", &summary.failed.to_string());
        }
    }
}

/// Route one declaration to its importer and classify the result
pub fn resolve_one(
    registry: &ImporterRegistry,
    resolve_ctx: &ResolveContext,
    declaration: &ResourceDeclaration,
) -> ResolutionReport {
    let Some(importer) = registry.lookup(&declaration.provider) else {
        return report(declaration, Outcome::Unrouted(declaration.provider.clone()));
    };

    let outcome = match importer.get_import_name(
        resolve_ctx,
        &declaration.resource_type,
        &declaration.name,
        &declaration.attributes,
    ) {
        Ok(Some(id)) => Outcome::Resolved(id),
        Ok(None) => Outcome::Empty,
        Err(err) => match err.kind() {
            ErrorKind::Configuration => Outcome::Unsupported(err.to_string()),
            ErrorKind::Validation => Outcome::Skipped(err.to_string()),
            ErrorKind::NotFound => Outcome::NotFound(err.to_string()),
            ErrorKind::Transient | ErrorKind::Interrupted => Outcome::Failed(err.to_string()),
        },
    };

    report(declaration, outcome)
}

fn report(declaration: &ResourceDeclaration, outcome: Outcome) -> ResolutionReport {
    ResolutionReport {
        address: declaration.address.clone(),
        provider: declaration.provider.clone(),
        resource_type: declaration.resource_type.clone(),
        name: declaration.name.clone(),
        outcome,
    }
}

/// Escape single quotes for a single-quoted shell word
fn shell_escape(value: &str) -> String {
    value.replace('\'', r"'\''")
}
