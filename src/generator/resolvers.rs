//! Resolver mapping emitter: request-mapping templates and AppSync wiring
//! for GraphQL-bound descriptors.
//!
//! The shared `mapping-templates` output directory is wiped and recreated
//! exactly once per run, and only when at least one descriptor is
//! `gql`-flagged; a run without GraphQL functions never touches it. All
//! template contents are rendered in memory before anything is written.

use minijinja::{context, Environment};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::path::Path;

use crate::descriptor::{DescriptorMap, FunctionDescriptor};
use crate::document::{ensure_mapping, ensure_sequence, key, root_mapping_mut};
use crate::error::BuildError;
use crate::generator::functions::{fn_get_att, DEFAULT_ROLE_RESOURCE};

/// Datasource id every resolver mapping points at.
pub const DATASOURCE_NAME: &str = "lambdaAppSyncResolver";
/// CloudFormation resource of the deployed dispatcher function.
pub const RESOLVER_FUNCTION_RESOURCE: &str = "AppSyncResolverLambdaFunction";

/// Template sources, looked up in the configured template directory.
pub const REQUEST_TEMPLATE_FILE: &str = "request-mapping-template.txt";
pub const BATCH_REQUEST_TEMPLATE_FILE: &str = "batch-request-mapping-template.txt";
/// Shared response templates, seeded verbatim into the output directory.
pub const RESPONSE_TEMPLATE_FILE: &str = "default-response-mapping-template.txt";
pub const BATCH_RESPONSE_TEMPLATE_FILE: &str = "default-batch-response-mapping-template.txt";

/// Wiring of one GraphQL operation to its template pair and datasource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverMappingSpec {
    pub data_source: String,
    #[serde(rename = "type")]
    pub operation: String,
    pub field: String,
    pub request: String,
    pub response: String,
}

/// A mapping-template file computed in memory, pending the write phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    pub file_name: String,
    pub contents: String,
}

/// True when at least one descriptor is GraphQL-bound.
pub fn has_gql(descriptors: &DescriptorMap) -> bool {
    descriptors.values().any(|d| d.gql)
}

/// Build the mapping spec for one `gql` descriptor. The response template
/// is the batch or single shared default, by `isBatch`.
pub fn mapping_spec(descriptor: &FunctionDescriptor) -> ResolverMappingSpec {
    ResolverMappingSpec {
        data_source: DATASOURCE_NAME.to_string(),
        operation: descriptor.operation.to_string(),
        field: descriptor.field.clone(),
        request: format!("{}-request.txt", descriptor.function_name),
        response: if descriptor.is_batch {
            BATCH_RESPONSE_TEMPLATE_FILE.to_string()
        } else {
            RESPONSE_TEMPLATE_FILE.to_string()
        },
    }
}

/// Mapping specs for all `gql` descriptors, in build order.
pub fn build_mapping_specs(descriptors: &DescriptorMap) -> Vec<ResolverMappingSpec> {
    descriptors
        .values()
        .filter(|d| d.gql)
        .map(mapping_spec)
        .collect()
}

fn read_template(dir: &Path, file: &str) -> anyhow::Result<String> {
    let path = dir.join(file);
    if !path.exists() {
        return Err(BuildError::MissingTemplate { path }.into());
    }
    std::fs::read_to_string(&path).map_err(|e| anyhow::anyhow!("reading template {path:?}: {e}"))
}

/// Render the request-mapping template for one `gql` descriptor, choosing
/// the batch or non-batch source by `isBatch`.
pub fn render_request_template(
    templates_dir: &Path,
    descriptor: &FunctionDescriptor,
) -> anyhow::Result<RenderedTemplate> {
    let source_file = if descriptor.is_batch {
        BATCH_REQUEST_TEMPLATE_FILE
    } else {
        REQUEST_TEMPLATE_FILE
    };
    let source = read_template(templates_dir, source_file)?;
    let mut env = Environment::new();
    env.add_template(source_file, &source)?;
    let contents = env
        .get_template(source_file)?
        .render(context! { functionName => descriptor.function_name })?;
    Ok(RenderedTemplate {
        file_name: format!("{}-request.txt", descriptor.function_name),
        contents,
    })
}

/// Render request templates for every `gql` descriptor, in build order.
pub fn render_request_templates(
    descriptors: &DescriptorMap,
    templates_dir: &Path,
) -> anyhow::Result<Vec<RenderedTemplate>> {
    descriptors
        .values()
        .filter(|d| d.gql)
        .map(|d| render_request_template(templates_dir, d))
        .collect()
}

/// The two shared response templates that seed a freshly reset output
/// directory, copied verbatim from the template source directory.
pub fn seed_templates(templates_dir: &Path) -> anyhow::Result<Vec<RenderedTemplate>> {
    [RESPONSE_TEMPLATE_FILE, BATCH_RESPONSE_TEMPLATE_FILE]
        .iter()
        .map(|file| {
            Ok(RenderedTemplate {
                file_name: (*file).to_string(),
                contents: read_template(templates_dir, file)?,
            })
        })
        .collect()
}

fn datasource_definition() -> Value {
    let mut config = Mapping::new();
    config.insert(key("serviceRoleArn"), fn_get_att(DEFAULT_ROLE_RESOURCE));
    config.insert(
        key("lambdaFunctionArn"),
        fn_get_att(RESOLVER_FUNCTION_RESOURCE),
    );
    let mut datasource = Mapping::new();
    datasource.insert(key("name"), Value::String(DATASOURCE_NAME.to_string()));
    datasource.insert(key("type"), Value::String("AWS_LAMBDA".to_string()));
    datasource.insert(key("config"), Value::Mapping(config));
    Value::Mapping(datasource)
}

/// Append the datasource definition and all mapping specs into the
/// document's `custom.appSync` subtree, preserving pre-existing entries.
pub fn merge_into_appsync(doc: &mut Value, specs: &[ResolverMappingSpec]) -> anyhow::Result<()> {
    let root = root_mapping_mut(doc)?;
    let custom = ensure_mapping(root, "custom")?;
    let appsync = ensure_mapping(custom, "appSync")?;

    ensure_sequence(appsync, "dataSources")?.push(datasource_definition());

    let mapping_templates = ensure_sequence(appsync, "mappingTemplates")?;
    for spec in specs {
        mapping_templates.push(serde_yaml::to_value(spec)?);
    }
    Ok(())
}
