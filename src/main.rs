mod commands;
mod context;
mod importer;
mod output;
mod plan;
mod traits;

use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use commands::{DeclarationSource, ProvidersCommand, ResolveCommand, ResolveOptions};
use context::Context;
use importer::ResolveContext;
use importer::aws::{AwsConfig, DEFAULT_REGION};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "tfimport")]
#[command(about = "Resolve import identifiers for resources declared in Terraform/OpenTofu", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    aws: AwsArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct AwsArgs {
    /// AWS region to query
    #[arg(long, global = true, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    region: String,

    /// Named AWS CLI profile
    #[arg(long, global = true, env = "AWS_PROFILE")]
    profile: Option<String>,
}

impl AwsArgs {
    fn config(&self) -> AwsConfig {
        AwsConfig::new(self.region.as_str()).with_profile(self.profile.clone())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve declarations and print import commands for the ones that already exist
    Resolve {
        /// JSON plan rendered with `terraform show -json`
        #[arg(long, conflicts_with = "declarations", required_unless_present = "declarations")]
        plan: Option<PathBuf>,

        /// YAML or JSON declarations file
        #[arg(long)]
        declarations: Option<PathBuf>,

        /// Overall time limit in seconds
        #[arg(long, env = "TFIMPORT_TIMEOUT")]
        timeout: Option<u64>,

        /// Number of resources resolved concurrently
        #[arg(long, default_value_t = 1)]
        parallel: usize,

        /// Print a JSON report instead of import commands
        #[arg(long)]
        json: bool,

        /// Show every resource, including ones that need no import
        #[arg(short, long)]
        verbose: bool,
    },

    /// List registered importers and the resource types they resolve
    Providers {
        /// Also check that the aws CLI can be run
        #[arg(long)]
        check: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let aws = cli.aws.config();
    let ctx = Context::new(aws.clone())?;

    match cli.command {
        Commands::Resolve {
            plan,
            declarations,
            timeout,
            parallel,
            json,
            verbose,
        } => {
            let source = match (&plan, &declarations) {
                (Some(path), _) => DeclarationSource::Plan(path),
                (None, Some(path)) => DeclarationSource::Declarations(path),
                (None, None) => anyhow::bail!("Either --plan or --declarations is required"),
            };

            let resolve_ctx = match timeout {
                Some(secs) => ResolveContext::with_timeout(Duration::from_secs(secs)),
                None => ResolveContext::new(),
            };

            let interrupt = resolve_ctx.clone();
            ctrlc::set_handler(move || interrupt.cancel())
                .context("Failed to install Ctrl-C handler")?;

            let options = ResolveOptions {
                parallel,
                json,
                verbose,
            };

            let summary = ResolveCommand::execute(&ctx, source, &options, &resolve_ctx)?;
            if summary.failed > 0 {
                std::process::exit(1);
            }
        }
        Commands::Providers { check } => {
            ProvidersCommand::execute(&ctx, &aws, check)?;
        }
    }

    Ok(())
}
