use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{BuildConfig, BuilderSettings};
use crate::descriptor::build_descriptors;
use crate::error::BuildError;
use crate::generator;
use crate::scanner::scan_source;

/// Command-line interface for the artifact generator.
///
/// Provides commands for generating deployment artifacts from an annotated
/// handler module and for inspecting what a scan would discover.
#[derive(Parser)]
#[command(name = "slsgen-gen")]
#[command(about = "Annotation-driven Serverless + AppSync artifact generator", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate deployment artifacts from the annotated handler module
    Generate {
        /// Project root holding package.json (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Base deployment descriptor (default: base.yml)
        #[arg(long)]
        base: Option<PathBuf>,

        /// Output descriptor path (default: serverless.yml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Template source directory (default: templates)
        #[arg(long)]
        templates: Option<PathBuf>,

        /// Annotated handler source module (default: handlers.js)
        #[arg(long)]
        handlers: Option<PathBuf>,

        /// Wrapper base template (default: wrapper_base.js in the project
        /// root if present, else the template directory's copy)
        #[arg(long)]
        wrapper_base: Option<PathBuf>,

        /// Prefix applied to generated function keys
        #[arg(long)]
        prefix: Option<String>,

        /// Compute artifacts and report them without writing anything
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Scan the handler module and list the discovered descriptors
    Scan {
        /// Project root holding package.json (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Annotated handler source module (default: handlers.js)
        #[arg(long)]
        handlers: Option<PathBuf>,
    },
}

fn project_root(root: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match root {
        Some(path) => Ok(path),
        None => std::env::current_dir().map_err(Into::into),
    }
}

/// Execute the CLI command provided by the user.
///
/// # Errors
///
/// Returns an error if an input is missing, an annotation is malformed, a
/// referenced template is absent, or writing an artifact fails.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            root,
            base,
            output,
            templates,
            handlers,
            wrapper_base,
            prefix,
            dry_run,
        } => {
            let root = project_root(root)?;
            let overrides = BuilderSettings {
                base_path: base,
                output_path: output,
                templates_path: templates,
                handlers_path: handlers,
                wrapper_base_path: wrapper_base,
                function_prefix: prefix,
            };
            let config = BuildConfig::load(&root, overrides)?;
            let artifacts = if dry_run {
                let artifacts = generator::plan_artifacts(&config)?;
                println!("📝 Dry run, nothing written. Would produce:");
                if artifacts.reset_mapping_dir {
                    for template in &artifacts.mapping_templates {
                        println!(
                            "   {:?}",
                            config.mapping_templates_path.join(&template.file_name)
                        );
                    }
                }
                println!("   {:?}", artifacts.wrapper_path);
                println!("   {:?}", artifacts.output_path);
                artifacts
            } else {
                generator::generate_artifacts(&config)?
            };
            println!(
                "🔎 Discovered {} function(s): {}",
                artifacts.function_names.len(),
                artifacts.function_names.join(", ")
            );
            Ok(())
        }
        Commands::Scan { root, handlers } => {
            let root = project_root(root)?;
            let overrides = BuilderSettings {
                handlers_path: handlers,
                ..BuilderSettings::default()
            };
            let config = BuildConfig::load(&root, overrides)?;
            if !config.handlers_path.exists() {
                return Err(BuildError::MissingInput {
                    what: "handler source",
                    path: config.handlers_path.clone(),
                }
                .into());
            }
            let source = std::fs::read_to_string(&config.handlers_path)?;
            let scan = scan_source(&source);
            for line in &scan.dangling {
                println!("⚠️  Line {line}: annotation without a declaration line");
            }
            let descriptors = build_descriptors(&scan.pairs)?;
            for d in descriptors.values() {
                println!(
                    "{:<28} {:<8} field={} batch={} gql={}",
                    d.function_name, d.operation, d.field, d.is_batch, d.gql
                );
            }
            println!("🔎 Discovered {} function(s)", descriptors.len());
            Ok(())
        }
    }
}
