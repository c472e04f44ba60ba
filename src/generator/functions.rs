//! Function config emitter: builds deployable-function configuration for
//! every descriptor that is not GraphQL-bound.

use serde_yaml::{Mapping, Value};

use crate::descriptor::{DescriptorMap, FunctionDescriptor, TriggerSettings};
use crate::document::key;

/// Role resource every function falls back to when no explicit role is
/// annotated.
pub const DEFAULT_ROLE_RESOURCE: &str = "MainRole";

const DEFAULT_HTTP_METHOD: &str = "post";
const DEFAULT_HTTP_CORS: &str = "true";
const DEFAULT_HTTP_PRIVATE: &str = "false";

/// `{ "Fn::GetAtt": [resource, "Arn"] }` reference to a CloudFormation
/// resource defined outside the generated content.
pub fn fn_get_att(resource: &str) -> Value {
    let mut map = Mapping::new();
    map.insert(
        key("Fn::GetAtt"),
        Value::Sequence(vec![
            Value::String(resource.to_string()),
            Value::String("Arn".to_string()),
        ]),
    );
    Value::Mapping(map)
}

/// Annotation values are plain words; emit integer- and boolean-looking
/// ones as YAML numbers/booleans so `memorySize=512` round-trips as `512`.
fn scalar(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

fn comma_list(raw: &str) -> Value {
    Value::Sequence(
        raw.split(',')
            .map(|part| Value::String(part.to_string()))
            .collect(),
    )
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Key of a function entry in the document's `functions` map.
pub fn function_key(prefix: &str, name: &str) -> String {
    format!("{prefix}{}", capitalize(name))
}

fn build_events(triggers: &TriggerSettings) -> Value {
    let mut events = Mapping::new();
    if let Some(buckets) = &triggers.s3 {
        events.insert(key("s3"), comma_list(buckets));
    }
    if let Some(arn) = &triggers.dynamodb {
        let mut stream = Mapping::new();
        stream.insert(key("type"), Value::String("dynamodb".to_string()));
        if let Some(batch_size) = &triggers.batch_size {
            stream.insert(key("batchSize"), scalar(batch_size));
        }
        stream.insert(key("arn"), Value::String(arn.clone()));
        events.insert(key("stream"), Value::Mapping(stream));
    }
    if let Some(queues) = &triggers.sqs {
        events.insert(key("sqs"), comma_list(queues));
    }
    if let Some(path) = &triggers.http {
        let mut http = Mapping::new();
        http.insert(key("path"), Value::String(path.clone()));
        http.insert(
            key("method"),
            Value::String(
                triggers
                    .method
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HTTP_METHOD.to_string()),
            ),
        );
        http.insert(
            key("cors"),
            Value::String(
                triggers
                    .cors
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HTTP_CORS.to_string()),
            ),
        );
        http.insert(
            key("private"),
            Value::String(
                triggers
                    .private
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HTTP_PRIVATE.to_string()),
            ),
        );
        events.insert(key("http"), Value::Mapping(http));
    }
    if let Some(minutes) = &triggers.rate {
        events.insert(
            key("rate"),
            Value::String(format!("rate({minutes} minute)")),
        );
    }
    if let Some(groups) = &triggers.cloudwatch_log {
        events.insert(key("cloudwatchLog"), comma_list(groups));
    }
    Value::Mapping(events)
}

/// Build the config entry for one non-`gql` descriptor.
///
/// `wrapper_module` is the base name of the generated wrapper
/// (e.g. `handlers_wrapper`); the handler reference points into it.
pub fn build_function_config(descriptor: &FunctionDescriptor, wrapper_module: &str) -> Value {
    let mut config = Mapping::new();
    config.insert(
        key("handler"),
        Value::String(format!("{wrapper_module}.{}", descriptor.function_name)),
    );
    config.insert(
        key("role"),
        match &descriptor.deploy.role {
            Some(role) => Value::String(role.clone()),
            None => fn_get_att(DEFAULT_ROLE_RESOURCE),
        },
    );

    let deploy = &descriptor.deploy;
    if let Some(v) = &deploy.memory_size {
        config.insert(key("memorySize"), scalar(v));
    }
    if let Some(v) = &deploy.layers {
        config.insert(key("layers"), comma_list(v));
    }
    if let Some(v) = &deploy.on_error {
        config.insert(key("onError"), Value::String(v.clone()));
    }
    if let Some(v) = &deploy.aws_kms_key_arn {
        config.insert(key("awsKmsKeyArn"), Value::String(v.clone()));
    }
    if let Some(v) = &deploy.tracing {
        config.insert(key("tracing"), Value::String(v.clone()));
    }
    if let Some(v) = &deploy.timeout {
        config.insert(key("timeout"), scalar(v));
    }
    if let Some(v) = &deploy.version_functions {
        config.insert(key("versionFunctions"), scalar(v));
    }
    if let Some(v) = &deploy.reserved_concurrency {
        config.insert(key("reservedConcurrency"), scalar(v));
    }
    if let Some(v) = &deploy.runtime {
        config.insert(key("runtime"), Value::String(v.clone()));
    }
    if let Some(v) = &deploy.name {
        config.insert(key("name"), Value::String(v.clone()));
    }
    if let Some(v) = &deploy.description {
        config.insert(key("description"), Value::String(v.clone()));
    }

    if !descriptor.tags.is_empty() {
        let mut tags = Mapping::new();
        for (k, v) in &descriptor.tags {
            tags.insert(key(k), Value::String(v.clone()));
        }
        config.insert(key("tags"), Value::Mapping(tags));
    }
    if !descriptor.environment.is_empty() {
        let mut environment = Mapping::new();
        for (k, v) in &descriptor.environment {
            environment.insert(key(k), Value::String(v.clone()));
        }
        config.insert(key("environment"), Value::Mapping(environment));
    }

    if descriptor.triggers.any() {
        config.insert(key("events"), build_events(&descriptor.triggers));
    }

    Value::Mapping(config)
}

/// Build `(key, config)` entries for every non-`gql` descriptor, in build
/// order. Later descriptors overwrite earlier ones at the same key when the
/// caller merges them into the document.
pub fn build_function_configs(
    descriptors: &DescriptorMap,
    wrapper_module: &str,
    prefix: &str,
) -> Vec<(String, Value)> {
    descriptors
        .values()
        .filter(|d| !d.gql)
        .map(|d| {
            (
                function_key(prefix, &d.function_name),
                build_function_config(d, wrapper_module),
            )
        })
        .collect()
}

/// Config entry for the shared AppSync dispatcher function, added once when
/// any GraphQL-bound descriptor exists.
pub fn build_dispatcher_config(wrapper_module: &str, dispatcher: &str) -> Value {
    let mut config = Mapping::new();
    config.insert(
        key("handler"),
        Value::String(format!("{wrapper_module}.{dispatcher}")),
    );
    config.insert(key("role"), fn_get_att(DEFAULT_ROLE_RESOURCE));
    let mut warmup = Mapping::new();
    warmup.insert(key("enabled"), Value::String("true".to_string()));
    config.insert(key("warmup"), Value::Mapping(warmup));
    Value::Mapping(config)
}
