#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::descriptor::{build_descriptor, build_descriptors, FunctionDescriptor};
use crate::scanner::AnnotationPair;
use serde_yaml::Value;

fn pair(annotation: &str, declaration: &str) -> AnnotationPair {
    AnnotationPair {
        annotation: annotation.to_string(),
        declaration: declaration.to_string(),
        line: 1,
    }
}

fn descriptor(annotation: &str, declaration: &str) -> FunctionDescriptor {
    build_descriptor(&pair(annotation, declaration)).unwrap()
}

fn yaml(text: &str) -> Value {
    serde_yaml::from_str(text).unwrap()
}

#[test]
fn test_function_config_s3_example() {
    let d = descriptor("//@lambda s3=my-bucket", "function onUpload(event){...}");
    let config = build_function_config(&d, "handlers_wrapper");
    assert_eq!(
        config["handler"].as_str(),
        Some("handlers_wrapper.onUpload")
    );
    assert_eq!(config["events"]["s3"], yaml("[my-bucket]"));
    assert_eq!(config["role"], yaml("Fn::GetAtt: [MainRole, Arn]"));
}

#[test]
fn test_explicit_role_passes_through() {
    let d = descriptor("//@lambda role=arn:aws:iam::1:role/custom", "function f1(e){}");
    let config = build_function_config(&d, "handlers_wrapper");
    assert_eq!(config["role"].as_str(), Some("arn:aws:iam::1:role/custom"));
}

#[test]
fn test_http_defaults() {
    let d = descriptor("//@lambda http=users", "function addUser(e){}");
    let config = build_function_config(&d, "handlers_wrapper");
    let http = &config["events"]["http"];
    assert_eq!(http["path"].as_str(), Some("users"));
    assert_eq!(http["method"].as_str(), Some("post"));
    assert_eq!(http["cors"].as_str(), Some("true"));
    assert_eq!(http["private"].as_str(), Some("false"));
}

#[test]
fn test_http_explicit_values_not_overridden() {
    let d = descriptor(
        "//@lambda http=users method=get cors=false private=true",
        "function listUsers(e){}",
    );
    let http = &build_function_config(&d, "handlers_wrapper")["events"]["http"];
    assert_eq!(http["method"].as_str(), Some("get"));
    assert_eq!(http["cors"].as_str(), Some("false"));
    assert_eq!(http["private"].as_str(), Some("true"));
}

#[test]
fn test_stream_event_shape() {
    let d = descriptor(
        "//@lambda dynamodb=arn:aws:dynamodb:table/t batchSize=25",
        "function onChange(e){}",
    );
    let stream = &build_function_config(&d, "handlers_wrapper")["events"]["stream"];
    assert_eq!(stream["type"].as_str(), Some("dynamodb"));
    assert_eq!(stream["batchSize"].as_i64(), Some(25));
    assert_eq!(stream["arn"].as_str(), Some("arn:aws:dynamodb:table/t"));
}

#[test]
fn test_rate_and_log_events() {
    let d = descriptor(
        "//@lambda rate=5 cloudwatchLog=/aws/a,/aws/b",
        "function sweep(e){}",
    );
    let events = &build_function_config(&d, "handlers_wrapper")["events"];
    assert_eq!(events["rate"].as_str(), Some("rate(5 minute)"));
    assert_eq!(events["cloudwatchLog"], yaml("[/aws/a, /aws/b]"));
}

#[test]
fn test_scalar_copy_through_only_when_present() {
    let d = descriptor(
        "//@lambda memorySize=512 timeout=30 runtime=nodejs18.x layers=a,b",
        "function heavy(e){}",
    );
    let config = build_function_config(&d, "handlers_wrapper");
    assert_eq!(config["memorySize"].as_i64(), Some(512));
    assert_eq!(config["timeout"].as_i64(), Some(30));
    assert_eq!(config["runtime"].as_str(), Some("nodejs18.x"));
    assert_eq!(config["layers"], yaml("[a, b]"));

    let bare = build_function_config(&descriptor("//@lambda", "function f(e){}"), "w");
    for absent in ["memorySize", "timeout", "runtime", "layers", "events", "tags"] {
        assert!(bare.get(absent).is_none(), "{absent} should be absent");
    }
}

#[test]
fn test_tags_and_environment_example() {
    let d = descriptor(
        "//@lambda tag-Team=platform environment-STAGE=prod",
        "function onUpload(e){}",
    );
    let config = build_function_config(&d, "handlers_wrapper");
    assert_eq!(config["tags"]["Team"].as_str(), Some("platform"));
    assert_eq!(config["environment"]["STAGE"].as_str(), Some("prod"));
}

#[test]
fn test_function_key_capitalizes_and_prefixes() {
    assert_eq!(function_key("", "getUser"), "GetUser");
    assert_eq!(function_key("svc", "onUpload"), "svcOnUpload");
}

#[test]
fn test_disjointness() {
    let pairs = vec![
        pair("//@lambda gql", "function getUser(e){}"),
        pair("//@lambda s3=b", "function onUpload(e){}"),
    ];
    let map = build_descriptors(&pairs).unwrap();
    let configs = build_function_configs(&map, "handlers_wrapper", "");
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].0, "OnUpload");
    let specs = build_mapping_specs(&map);
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].field, "getUser");
}

#[test]
fn test_mapping_spec_example() {
    let d = descriptor("//@lambda type=Query gql=true", "function getUser(event){...}");
    let spec = mapping_spec(&d);
    assert_eq!(spec.data_source, "lambdaAppSyncResolver");
    assert_eq!(spec.operation, "Query");
    assert_eq!(spec.field, "getUser");
    assert_eq!(spec.request, "getUser-request.txt");
    assert_eq!(spec.response, "default-response-mapping-template.txt");
}

#[test]
fn test_mapping_spec_batch_response() {
    let d = descriptor("//@lambda gql isBatch", "function getUsersForTeam(e){}");
    assert_eq!(
        mapping_spec(&d).response,
        "default-batch-response-mapping-template.txt"
    );
}

#[test]
fn test_merge_into_appsync_preserves_existing() {
    let mut doc = yaml(
        "custom:\n  appSync:\n    dataSources:\n      - name: keep\n    mappingTemplates:\n      - field: old\n",
    );
    let d = descriptor("//@lambda gql", "function getUser(e){}");
    merge_into_appsync(&mut doc, &[mapping_spec(&d)]).unwrap();
    let appsync = &doc["custom"]["appSync"];
    let datasources = appsync["dataSources"].as_sequence().unwrap();
    assert_eq!(datasources.len(), 2);
    assert_eq!(datasources[0]["name"].as_str(), Some("keep"));
    assert_eq!(datasources[1]["name"].as_str(), Some("lambdaAppSyncResolver"));
    assert_eq!(datasources[1]["type"].as_str(), Some("AWS_LAMBDA"));
    let templates = appsync["mappingTemplates"].as_sequence().unwrap();
    assert_eq!(templates.len(), 2);
    assert_eq!(templates[0]["field"].as_str(), Some("old"));
    assert_eq!(templates[1]["field"].as_str(), Some("getUser"));
    assert_eq!(templates[1]["dataSource"].as_str(), Some("lambdaAppSyncResolver"));
}

#[test]
fn test_dispatcher_config_shape() {
    let config = build_dispatcher_config("handlers_wrapper", DISPATCHER_NAME);
    assert_eq!(
        config["handler"].as_str(),
        Some("handlers_wrapper.appSyncResolver")
    );
    assert_eq!(config["warmup"]["enabled"].as_str(), Some("true"));
}

#[test]
fn test_wrapper_spec_statements() {
    let pairs = vec![
        pair("//@lambda gql", "function getUser(e){}"),
        pair("//@lambda", "function onUpload(e){}"),
    ];
    let map = build_descriptors(&pairs).unwrap();
    let spec = build_wrapper_spec(&map);
    assert_eq!(
        spec.aliases,
        vec!["getUser as getUser_old", "onUpload as onUpload_old"]
    );
    assert_eq!(spec.wrappers, vec!["const onUpload = withWrapper(onUpload_old);"]);
    assert_eq!(spec.exports, vec!["onUpload", "appSyncResolver"]);
    assert!(spec.dispatch_cases[0].contains("case \"getUser\""));
}

#[test]
fn test_wrapper_without_gql_has_no_dispatcher() {
    let pairs = vec![pair("//@lambda", "function onUpload(e){}")];
    let map = build_descriptors(&pairs).unwrap();
    let spec = build_wrapper_spec(&map);
    assert!(spec.dispatch_cases.is_empty());
    assert_eq!(spec.exports, vec!["onUpload"]);

    let template = "{% if resolvers %}dispatcher{% endif %}exports:{{ exporteds }}";
    let rendered = render_wrapper(&spec, template, "./handlers.js").unwrap();
    assert!(!rendered.contains("dispatcher"));
    assert!(rendered.contains("onUpload,"));
}

#[test]
fn test_wrapper_render_is_deterministic() {
    let pairs = vec![
        pair("//@lambda gql", "function getUser(e){}"),
        pair("//@lambda", "function onUpload(e){}"),
    ];
    let map = build_descriptors(&pairs).unwrap();
    let spec = build_wrapper_spec(&map);
    let template = "import { {{ aliases }} } from \"{{ handlersPath }}\";\n{{ wrappers }}\n{{ resolvers }}\n{{ exporteds }}";
    let a = render_wrapper(&spec, template, "./handlers.js").unwrap();
    let b = render_wrapper(&spec, template, "./handlers.js").unwrap();
    assert_eq!(a, b);
    assert!(a.contains("getUser as getUser_old"));
    assert!(a.contains("return getUser_old(event, context);"));
}
