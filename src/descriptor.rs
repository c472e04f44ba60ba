//! Descriptor builder: tokenizes annotation pairs into normalized
//! [`FunctionDescriptor`]s with the defaulting rules applied.
//!
//! Every recognized deployment attribute has a named field on
//! [`DeploySettings`] or [`TriggerSettings`]; nothing is accumulated into an
//! open-ended bag. Attributes the builder does not recognize are collected
//! on the descriptor and surfaced as warnings by the orchestrator instead of
//! being silently dropped.

use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::BuildError;
use crate::scanner::{AnnotationPair, ANNOTATION_MARKER};

/// Declaration-line marker for batch-invoked handlers.
pub const BATCH_MARKER: &str = "withBatch(";

const TAG_PREFIX: &str = "tag-";
const ENVIRONMENT_PREFIX: &str = "environment-";

/// A key with optional value, parsed from one whitespace-delimited word of
/// an annotation line. A word without `=` is a boolean flag; a word
/// containing `=` splits into key/value on the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationToken {
    pub key: String,
    pub value: Option<String>,
}

impl AnnotationToken {
    fn from_word(word: &str) -> Self {
        match word.split_once('=') {
            Some((key, value)) => Self {
                key: key.to_string(),
                value: Some(value.to_string()),
            },
            None => Self {
                key: word.to_string(),
                value: None,
            },
        }
    }

    /// Flag tokens and any value other than `false`/`0` count as set.
    fn is_truthy(&self) -> bool {
        match self.value.as_deref() {
            None => true,
            Some(v) => !matches!(v, "false" | "0"),
        }
    }
}

/// Tokenize an annotation line, discarding every word that carries the
/// annotation marker (covers `//@lambda`, `#@lambda` and similar comment
/// prefixes).
pub fn tokenize_annotation(line: &str) -> Vec<AnnotationToken> {
    line.split_whitespace()
        .filter(|word| !word.contains(ANNOTATION_MARKER))
        .map(AnnotationToken::from_word)
        .collect()
}

/// GraphQL operation kind a resolver is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Query" => Some(Self::Query),
            "Mutation" => Some(Self::Mutation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Mutation => "Mutation",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar deployment knobs copied through to the function config only when
/// explicitly present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploySettings {
    pub role: Option<String>,
    pub memory_size: Option<String>,
    pub layers: Option<String>,
    pub on_error: Option<String>,
    pub aws_kms_key_arn: Option<String>,
    pub tracing: Option<String>,
    pub timeout: Option<String>,
    pub version_functions: Option<String>,
    pub reserved_concurrency: Option<String>,
    pub runtime: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Event trigger attributes. `method`, `cors`, `private` qualify `http`;
/// `batch_size` qualifies `dynamodb`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerSettings {
    pub s3: Option<String>,
    pub sqs: Option<String>,
    pub dynamodb: Option<String>,
    pub batch_size: Option<String>,
    pub http: Option<String>,
    pub method: Option<String>,
    pub cors: Option<String>,
    pub private: Option<String>,
    pub rate: Option<String>,
    pub cloudwatch_log: Option<String>,
}

impl TriggerSettings {
    /// True when any trigger that produces an events entry is present.
    pub fn any(&self) -> bool {
        self.s3.is_some()
            || self.sqs.is_some()
            || self.dynamodb.is_some()
            || self.http.is_some()
            || self.rate.is_some()
            || self.cloudwatch_log.is_some()
    }
}

/// Normalized per-function record combining explicit and defaulted
/// attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub function_name: String,
    pub operation: OperationKind,
    pub field: String,
    pub is_batch: bool,
    /// True marks the handler as GraphQL-bound: it gets resolver wiring and
    /// a dispatcher case instead of a function config entry.
    pub gql: bool,
    pub deploy: DeploySettings,
    pub triggers: TriggerSettings,
    pub tags: BTreeMap<String, String>,
    pub environment: BTreeMap<String, String>,
    /// Attribute keys that were not recognized, including value-carrying
    /// attributes written as bare flags. Surfaced as warnings, never
    /// silently dropped.
    pub unknown: Vec<String>,
}

/// Descriptor mapping keyed by function name, in scan order. A later pair
/// with the same name overwrites the earlier value but keeps its position.
pub type DescriptorMap = IndexMap<String, FunctionDescriptor>;

fn bool_word(flag: bool) -> String {
    if flag {
        "true".to_string()
    } else {
        "false".to_string()
    }
}

fn extract_function_name(declaration: &str) -> Option<String> {
    // Convention: `<keyword> <functionName> ...` — the second word, trimmed
    // to its leading identifier characters so both `function getUser(event)`
    // and `const getUser = withBatch(...)` yield `getUser`.
    let word = declaration.split_whitespace().nth(1)?;
    let ident: String = word
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    if ident.is_empty() {
        None
    } else {
        Some(ident)
    }
}

/// Build one descriptor from a scanned pair.
///
/// # Errors
///
/// Returns [`BuildError::MalformedAnnotation`] when the declaration line
/// does not yield an extractable function name.
pub fn build_descriptor(pair: &AnnotationPair) -> Result<FunctionDescriptor, BuildError> {
    let function_name =
        extract_function_name(&pair.declaration).ok_or_else(|| BuildError::MalformedAnnotation {
            line: pair.line,
            reason: format!(
                "declaration line {:?} does not yield a function name",
                pair.declaration.trim()
            ),
        })?;

    let mut explicit_operation: Option<OperationKind> = None;
    let mut explicit_field: Option<String> = None;
    let mut explicit_batch: Option<bool> = None;
    let mut gql = false;
    let mut deploy = DeploySettings::default();
    let mut triggers = TriggerSettings::default();
    let mut tags = BTreeMap::new();
    let mut environment = BTreeMap::new();
    let mut unknown = Vec::new();

    for token in tokenize_annotation(&pair.annotation) {
        // Attributes that need a value reject bare flags.
        let value = |unknown: &mut Vec<String>| -> Option<String> {
            match &token.value {
                Some(v) => Some(v.clone()),
                None => {
                    unknown.push(format!("{} (missing value)", token.key));
                    None
                }
            }
        };
        match token.key.as_str() {
            "gql" => gql = token.is_truthy(),
            "isBatch" => explicit_batch = Some(token.is_truthy()),
            "type" => {
                if let Some(v) = value(&mut unknown) {
                    match OperationKind::parse(&v) {
                        Some(kind) => explicit_operation = Some(kind),
                        // Falls through to the name-based default; the
                        // isBatch heuristic still sees a non-enum type.
                        None => unknown.push(format!("type={v}")),
                    }
                }
            }
            "field" => explicit_field = value(&mut unknown),
            "role" => deploy.role = value(&mut unknown),
            "memorySize" => deploy.memory_size = value(&mut unknown),
            "layers" => deploy.layers = value(&mut unknown),
            "onError" => deploy.on_error = value(&mut unknown),
            "awsKmsKeyArn" => deploy.aws_kms_key_arn = value(&mut unknown),
            "tracing" => deploy.tracing = value(&mut unknown),
            "timeout" => deploy.timeout = value(&mut unknown),
            "versionFunctions" => deploy.version_functions = value(&mut unknown),
            "reservedConcurrency" => deploy.reserved_concurrency = value(&mut unknown),
            "runtime" => deploy.runtime = value(&mut unknown),
            "name" => deploy.name = value(&mut unknown),
            "description" => deploy.description = value(&mut unknown),
            "s3" => triggers.s3 = value(&mut unknown),
            "sqs" => triggers.sqs = value(&mut unknown),
            "dynamodb" => triggers.dynamodb = value(&mut unknown),
            "batchSize" => triggers.batch_size = value(&mut unknown),
            "http" => triggers.http = value(&mut unknown),
            "method" => triggers.method = value(&mut unknown),
            "cors" => triggers.cors = Some(bool_word(token.is_truthy())),
            "private" => triggers.private = Some(bool_word(token.is_truthy())),
            "rate" => triggers.rate = value(&mut unknown),
            "cloudwatchLog" => triggers.cloudwatch_log = value(&mut unknown),
            key if key.starts_with(TAG_PREFIX) => {
                if let Some(v) = value(&mut unknown) {
                    tags.insert(key[TAG_PREFIX.len()..].to_string(), v);
                }
            }
            key if key.starts_with(ENVIRONMENT_PREFIX) => {
                if let Some(v) = value(&mut unknown) {
                    environment.insert(key[ENVIRONMENT_PREFIX.len()..].to_string(), v);
                }
            }
            _ => unknown.push(token.key.clone()),
        }
    }

    // Defaulting rules; explicit attributes are never overridden.
    let is_batch = explicit_batch.unwrap_or_else(|| {
        pair.declaration.contains(BATCH_MARKER)
            || (explicit_operation.is_none() && function_name.contains("For"))
    });
    let operation = explicit_operation.unwrap_or(if function_name.starts_with("get") {
        OperationKind::Query
    } else {
        OperationKind::Mutation
    });
    let field = explicit_field.unwrap_or_else(|| function_name.clone());

    Ok(FunctionDescriptor {
        function_name,
        operation,
        field,
        is_batch,
        gql,
        deploy,
        triggers,
        tags,
        environment,
        unknown,
    })
}

/// Build the descriptor mapping for all scanned pairs, in scan order.
///
/// Two pairs with the same function name follow the documented overwrite
/// policy: the later one wins, keeping the earlier one's position.
pub fn build_descriptors(pairs: &[AnnotationPair]) -> Result<DescriptorMap, BuildError> {
    let mut map = DescriptorMap::new();
    for pair in pairs {
        let descriptor = build_descriptor(pair)?;
        if map.contains_key(&descriptor.function_name) {
            debug!(
                function = %descriptor.function_name,
                line = pair.line,
                "duplicate function name, later descriptor overwrites earlier"
            );
        }
        map.insert(descriptor.function_name.clone(), descriptor);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(annotation: &str, declaration: &str) -> AnnotationPair {
        AnnotationPair {
            annotation: annotation.to_string(),
            declaration: declaration.to_string(),
            line: 1,
        }
    }

    #[test]
    fn test_tokenize_flags_and_values() {
        let tokens = tokenize_annotation("//@lambda gql type=Query tag-Team=platform");
        assert_eq!(
            tokens,
            vec![
                AnnotationToken {
                    key: "gql".into(),
                    value: None
                },
                AnnotationToken {
                    key: "type".into(),
                    value: Some("Query".into())
                },
                AnnotationToken {
                    key: "tag-Team".into(),
                    value: Some("platform".into())
                },
            ]
        );
    }

    #[test]
    fn test_value_splits_on_first_equals() {
        let tokens = tokenize_annotation("//@lambda environment-OPTS=a=b");
        assert_eq!(tokens[0].key, "environment-OPTS");
        assert_eq!(tokens[0].value.as_deref(), Some("a=b"));
    }

    #[test]
    fn test_spec_example_get_user() {
        let d = build_descriptor(&pair(
            "//@lambda type=Query gql=true",
            "function getUser(event){...}",
        ))
        .unwrap();
        assert_eq!(d.function_name, "getUser");
        assert_eq!(d.operation, OperationKind::Query);
        assert!(d.gql);
        assert!(!d.is_batch);
        assert_eq!(d.field, "getUser");
    }

    #[test]
    fn test_name_extraction_from_const_declaration() {
        let d = build_descriptor(&pair("//@lambda gql", "const getUser = withBatch(fetchAll);"))
            .unwrap();
        assert_eq!(d.function_name, "getUser");
        assert!(d.is_batch);
    }

    #[test]
    fn test_type_defaults_by_name() {
        let get = build_descriptor(&pair("//@lambda", "function getPets(e) {}")).unwrap();
        assert_eq!(get.operation, OperationKind::Query);
        let set = build_descriptor(&pair("//@lambda", "function addPet(e) {}")).unwrap();
        assert_eq!(set.operation, OperationKind::Mutation);
    }

    #[test]
    fn test_explicit_attributes_are_not_overridden() {
        let d = build_descriptor(&pair(
            "//@lambda type=Mutation field=renamed isBatch=false",
            "function getUsersForTeam(e) {}",
        ))
        .unwrap();
        assert_eq!(d.operation, OperationKind::Mutation);
        assert_eq!(d.field, "renamed");
        assert!(!d.is_batch);
    }

    #[test]
    fn test_batch_from_for_heuristic() {
        let d = build_descriptor(&pair("//@lambda gql", "function getUsersForTeam(e) {}")).unwrap();
        assert!(d.is_batch);
        // An explicit enum type suppresses the name heuristic.
        let d = build_descriptor(&pair(
            "//@lambda gql type=Query",
            "function getUsersForTeam(e) {}",
        ))
        .unwrap();
        assert!(!d.is_batch);
    }

    #[test]
    fn test_gql_false_is_not_graphql() {
        let d = build_descriptor(&pair("//@lambda gql=false", "function getX(e) {}")).unwrap();
        assert!(!d.gql);
    }

    #[test]
    fn test_tags_and_environment_collection() {
        let d = build_descriptor(&pair(
            "//@lambda tag-Team=platform environment-STAGE=prod",
            "function onUpload(e) {}",
        ))
        .unwrap();
        assert_eq!(d.tags.get("Team").map(String::as_str), Some("platform"));
        assert_eq!(d.environment.get("STAGE").map(String::as_str), Some("prod"));
    }

    #[test]
    fn test_unknown_attributes_are_flagged() {
        let d = build_descriptor(&pair("//@lambda bogus s3", "function onUpload(e) {}")).unwrap();
        assert!(d.unknown.contains(&"bogus".to_string()));
        assert!(d.unknown.contains(&"s3 (missing value)".to_string()));
        assert!(d.triggers.s3.is_none());
    }

    #[test]
    fn test_non_enum_type_is_flagged_and_defaulted() {
        let d = build_descriptor(&pair(
            "//@lambda type=Subscription",
            "function getFeedForUser(e) {}",
        ))
        .unwrap();
        assert!(d.unknown.contains(&"type=Subscription".to_string()));
        assert_eq!(d.operation, OperationKind::Query);
        // Non-enum type still counts as "not Query/Mutation" for the
        // batch heuristic.
        assert!(d.is_batch);
    }

    #[test]
    fn test_malformed_declaration_aborts() {
        let err = build_descriptor(&AnnotationPair {
            annotation: "//@lambda".into(),
            declaration: "}".into(),
            line: 7,
        })
        .unwrap_err();
        match err {
            BuildError::MalformedAnnotation { line, .. } => assert_eq!(line, 7),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_name_last_wins_first_position() {
        let pairs = vec![
            pair("//@lambda memorySize=128", "function getA(e) {}"),
            pair("//@lambda", "function getB(e) {}"),
            pair("//@lambda memorySize=512", "function getA(e) {}"),
        ];
        let map = build_descriptors(&pairs).unwrap();
        let names: Vec<_> = map.keys().cloned().collect();
        assert_eq!(names, vec!["getA", "getB"]);
        assert_eq!(map["getA"].deploy.memory_size.as_deref(), Some("512"));
    }
}
