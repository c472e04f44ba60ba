//! Base deployment-descriptor document handling.
//!
//! The descriptor is a YAML document parsed and serialized by `serde_yaml`;
//! the pipeline only adds or merges keys into its `functions` and
//! `custom.appSync` subtrees and never removes existing content.

use anyhow::{bail, Context};
use serde_yaml::{Mapping, Value};
use std::path::Path;

use crate::error::BuildError;

/// Load the base document from `path`.
///
/// # Errors
///
/// [`BuildError::MissingInput`] when the file is absent; a parse error with
/// context when it is not a YAML mapping.
pub fn load_document(path: &Path) -> anyhow::Result<Value> {
    if !path.exists() {
        return Err(BuildError::MissingInput {
            what: "base document",
            path: path.to_path_buf(),
        }
        .into());
    }
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    let doc: Value =
        serde_yaml::from_str(&text).with_context(|| format!("parsing {path:?}"))?;
    if !doc.is_mapping() {
        bail!("base document {path:?} is not a YAML mapping");
    }
    Ok(doc)
}

/// YAML string key.
pub fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

/// View a document root as a mutable mapping.
pub fn root_mapping_mut(doc: &mut Value) -> anyhow::Result<&mut Mapping> {
    match doc {
        Value::Mapping(map) => Ok(map),
        _ => bail!("document root is not a YAML mapping"),
    }
}

/// Get `map[name]` as a mapping, inserting an empty one if absent.
pub fn ensure_mapping<'a>(map: &'a mut Mapping, name: &str) -> anyhow::Result<&'a mut Mapping> {
    let k = key(name);
    if !map.contains_key(&k) {
        map.insert(k.clone(), Value::Mapping(Mapping::new()));
    }
    match map.get_mut(&k) {
        Some(Value::Mapping(inner)) => Ok(inner),
        _ => bail!("`{name}` in the base document is not a mapping"),
    }
}

/// Get `map[name]` as a sequence, inserting an empty one if absent.
pub fn ensure_sequence<'a>(map: &'a mut Mapping, name: &str) -> anyhow::Result<&'a mut Vec<Value>> {
    let k = key(name);
    if !map.contains_key(&k) {
        map.insert(k.clone(), Value::Sequence(Vec::new()));
    }
    match map.get_mut(&k) {
        Some(Value::Sequence(inner)) => Ok(inner),
        _ => bail!("`{name}` in the base document is not a sequence"),
    }
}

/// Serialize the merged document back to YAML text.
pub fn to_yaml_string(doc: &Value) -> anyhow::Result<String> {
    serde_yaml::to_string(doc).context("serializing deployment descriptor")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_document_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_document(&dir.path().join("base.yml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MissingInput { .. })
        ));
    }

    #[test]
    fn test_ensure_mapping_creates_and_reuses() {
        let mut doc: Value = serde_yaml::from_str("service: demo\n").unwrap();
        let root = root_mapping_mut(&mut doc).unwrap();
        ensure_mapping(root, "functions")
            .unwrap()
            .insert(key("A"), Value::Null);
        // Second call sees the same subtree.
        assert_eq!(ensure_mapping(root, "functions").unwrap().len(), 1);
    }

    #[test]
    fn test_ensure_mapping_rejects_scalar() {
        let mut doc: Value = serde_yaml::from_str("functions: 3\n").unwrap();
        let root = root_mapping_mut(&mut doc).unwrap();
        assert!(ensure_mapping(root, "functions").is_err());
    }

    #[test]
    fn test_ensure_sequence_preserves_existing_entries() {
        let mut doc: Value = serde_yaml::from_str("dataSources:\n  - name: keep\n").unwrap();
        let root = root_mapping_mut(&mut doc).unwrap();
        let seq = ensure_sequence(root, "dataSources").unwrap();
        assert_eq!(seq.len(), 1);
        seq.push(Value::String("new".into()));
        assert_eq!(ensure_sequence(root, "dataSources").unwrap().len(), 2);
    }
}
