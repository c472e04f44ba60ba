//! Orchestrator: sequences scanning, descriptor building, and the three
//! emitters, then writes every artifact.
//!
//! The run is split into a plan phase and a write phase. `plan_artifacts`
//! reads every input (handler source, base document, every referenced
//! template) and computes every output byte in memory; any failure aborts
//! before a single write. `write_artifacts` then flushes the plan to disk,
//! so a failed run never leaves partial artifacts behind.

use anyhow::Context;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use crate::config::BuildConfig;
use crate::descriptor::build_descriptors;
use crate::document;
use crate::error::BuildError;
use crate::scanner::scan_source;

use super::functions::{build_dispatcher_config, build_function_configs};
use super::resolvers::{
    self, build_mapping_specs, has_gql, merge_into_appsync, render_request_templates,
    RenderedTemplate,
};
use super::wrapper::{build_wrapper_spec, render_wrapper, DISPATCHER_NAME};

/// Everything one run produces, computed before anything is written.
#[derive(Debug)]
pub struct BuildArtifacts {
    /// Discovered function names, in build order.
    pub function_names: Vec<String>,
    /// Whether the mapping-template directory gets wiped and recreated.
    /// True exactly when a GraphQL-bound descriptor exists.
    pub reset_mapping_dir: bool,
    /// Seeded response templates plus per-function request templates.
    pub mapping_templates: Vec<RenderedTemplate>,
    pub wrapper_path: PathBuf,
    pub wrapper_text: String,
    pub output_path: PathBuf,
    pub document_text: String,
}

/// Compute all artifacts for the configured project.
pub fn plan_artifacts(config: &BuildConfig) -> anyhow::Result<BuildArtifacts> {
    if !config.handlers_path.exists() {
        return Err(BuildError::MissingInput {
            what: "handler source",
            path: config.handlers_path.clone(),
        }
        .into());
    }
    let source = fs::read_to_string(&config.handlers_path)
        .with_context(|| format!("reading {:?}", config.handlers_path))?;
    let base = document::load_document(&config.base_path)?;

    let scan = scan_source(&source);
    for &line in &scan.dangling {
        warn!(line, "annotation without a declaration line was discarded");
    }
    let descriptors = build_descriptors(&scan.pairs)?;
    for descriptor in descriptors.values() {
        for attribute in &descriptor.unknown {
            warn!(
                function = %descriptor.function_name,
                attribute = %attribute,
                "unrecognized annotation attribute"
            );
        }
    }

    // The pipeline only ever adds to a clone of the base document.
    let mut doc = base;

    let gql = has_gql(&descriptors);
    let mut mapping_templates = Vec::new();
    if gql {
        mapping_templates.extend(resolvers::seed_templates(&config.templates_path)?);
        mapping_templates.extend(render_request_templates(
            &descriptors,
            &config.templates_path,
        )?);
        merge_into_appsync(&mut doc, &build_mapping_specs(&descriptors))?;
    }

    let wrapper_module = config.wrapper_module_name();
    let entries = build_function_configs(&descriptors, &wrapper_module, &config.function_prefix);
    {
        let root = document::root_mapping_mut(&mut doc)?;
        let functions = document::ensure_mapping(root, "functions")?;
        for (name, config_value) in entries {
            functions.insert(document::key(&name), config_value);
        }
        if gql {
            functions.insert(
                document::key(DISPATCHER_NAME),
                build_dispatcher_config(&wrapper_module, DISPATCHER_NAME),
            );
        }
    }

    if !config.wrapper_base_path.exists() {
        return Err(BuildError::MissingTemplate {
            path: config.wrapper_base_path.clone(),
        }
        .into());
    }
    let wrapper_template = fs::read_to_string(&config.wrapper_base_path)
        .with_context(|| format!("reading {:?}", config.wrapper_base_path))?;
    let wrapper_spec = build_wrapper_spec(&descriptors);
    let handlers_module = format!("./{}", config.handlers_file_name());
    let wrapper_text = render_wrapper(&wrapper_spec, &wrapper_template, &handlers_module)?;

    let document_text = document::to_yaml_string(&doc)?;

    Ok(BuildArtifacts {
        function_names: descriptors.keys().cloned().collect(),
        reset_mapping_dir: gql,
        mapping_templates,
        wrapper_path: config.wrapper_artifact_path(),
        wrapper_text,
        output_path: config.output_path.clone(),
        document_text,
    })
}

/// Write a fully computed plan to disk.
pub fn write_artifacts(config: &BuildConfig, artifacts: &BuildArtifacts) -> anyhow::Result<()> {
    if artifacts.reset_mapping_dir {
        let dir = &config.mapping_templates_path;
        if dir.exists() {
            fs::remove_dir_all(dir).with_context(|| format!("resetting {dir:?}"))?;
        }
        fs::create_dir_all(dir).with_context(|| format!("creating {dir:?}"))?;
        for template in &artifacts.mapping_templates {
            let path = dir.join(&template.file_name);
            fs::write(&path, &template.contents)
                .with_context(|| format!("writing {path:?}"))?;
        }
        println!(
            "✅ Wrote {} mapping templates → {dir:?}",
            artifacts.mapping_templates.len()
        );
    }
    fs::write(&artifacts.wrapper_path, &artifacts.wrapper_text)
        .with_context(|| format!("writing {:?}", artifacts.wrapper_path))?;
    println!("✅ Wrote wrapper module → {:?}", artifacts.wrapper_path);
    fs::write(&artifacts.output_path, &artifacts.document_text)
        .with_context(|| format!("writing {:?}", artifacts.output_path))?;
    println!("✅ Wrote deployment descriptor → {:?}", artifacts.output_path);
    Ok(())
}

/// Plan and write in one step; returns the plan for reporting.
pub fn generate_artifacts(config: &BuildConfig) -> anyhow::Result<BuildArtifacts> {
    let artifacts = plan_artifacts(config)?;
    write_artifacts(config, &artifacts)?;
    Ok(artifacts)
}
