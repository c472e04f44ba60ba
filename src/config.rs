//! Build configuration sourced from the project manifest.
//!
//! The generator reads the `serverlessBuilder` block of the project's
//! `package.json`; every path is independently overridable (manifest first,
//! then CLI flags) and falls back to a documented default. A missing
//! manifest, or one without the block, is not an error — the defaults apply.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Project manifest file the settings block lives in.
pub const MANIFEST_FILE: &str = "package.json";
/// Name of the settings block inside the manifest.
pub const SETTINGS_KEY: &str = "serverlessBuilder";
/// Fixed output directory for generated request-mapping templates.
pub const MAPPING_TEMPLATES_DIR: &str = "mapping-templates";

const DEFAULT_BASE_FILE: &str = "base.yml";
const DEFAULT_OUTPUT_FILE: &str = "serverless.yml";
const DEFAULT_TEMPLATES_DIR: &str = "templates";
const DEFAULT_HANDLERS_FILE: &str = "handlers.js";
const DEFAULT_WRAPPER_BASE_FILE: &str = "wrapper_base.js";

/// The `serverlessBuilder` settings block, as written in the manifest.
/// Also used as the carrier for CLI overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderSettings {
    pub base_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub templates_path: Option<PathBuf>,
    pub handlers_path: Option<PathBuf>,
    pub wrapper_base_path: Option<PathBuf>,
    pub function_prefix: Option<String>,
}

impl BuilderSettings {
    /// Field-wise precedence: `self` wins, `fallback` fills the gaps.
    fn or(self, fallback: BuilderSettings) -> BuilderSettings {
        BuilderSettings {
            base_path: self.base_path.or(fallback.base_path),
            output_path: self.output_path.or(fallback.output_path),
            templates_path: self.templates_path.or(fallback.templates_path),
            handlers_path: self.handlers_path.or(fallback.handlers_path),
            wrapper_base_path: self.wrapper_base_path.or(fallback.wrapper_base_path),
            function_prefix: self.function_prefix.or(fallback.function_prefix),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Manifest {
    serverless_builder: BuilderSettings,
}

/// Fully resolved configuration for one build run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub project_root: PathBuf,
    pub base_path: PathBuf,
    pub output_path: PathBuf,
    pub templates_path: PathBuf,
    pub handlers_path: PathBuf,
    pub wrapper_base_path: PathBuf,
    pub mapping_templates_path: PathBuf,
    pub function_prefix: String,
}

fn resolve(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

impl BuildConfig {
    /// Load configuration for `project_root`, applying `overrides` on top of
    /// the manifest's settings block.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest exists but cannot be read or parsed.
    pub fn load(project_root: &Path, overrides: BuilderSettings) -> anyhow::Result<Self> {
        let manifest_path = project_root.join(MANIFEST_FILE);
        let manifest_settings = if manifest_path.exists() {
            let text = fs::read_to_string(&manifest_path)
                .with_context(|| format!("reading {manifest_path:?}"))?;
            let manifest: Manifest = serde_json::from_str(&text)
                .with_context(|| format!("parsing {manifest_path:?}"))?;
            manifest.serverless_builder
        } else {
            BuilderSettings::default()
        };
        Ok(Self::from_settings(project_root, overrides.or(manifest_settings)))
    }

    fn from_settings(root: &Path, settings: BuilderSettings) -> Self {
        let templates_path = resolve(
            root,
            settings
                .templates_path
                .unwrap_or_else(|| DEFAULT_TEMPLATES_DIR.into()),
        );
        // Wrapper base fallback: an explicit setting wins, then a
        // `wrapper_base.js` in the project root, then the shipped template.
        let wrapper_base_path = match settings.wrapper_base_path {
            Some(path) => resolve(root, path),
            None => {
                let local = root.join(DEFAULT_WRAPPER_BASE_FILE);
                if local.exists() {
                    local
                } else {
                    templates_path.join(DEFAULT_WRAPPER_BASE_FILE)
                }
            }
        };
        BuildConfig {
            project_root: root.to_path_buf(),
            base_path: resolve(
                root,
                settings.base_path.unwrap_or_else(|| DEFAULT_BASE_FILE.into()),
            ),
            output_path: resolve(
                root,
                settings
                    .output_path
                    .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.into()),
            ),
            templates_path,
            handlers_path: resolve(
                root,
                settings
                    .handlers_path
                    .unwrap_or_else(|| DEFAULT_HANDLERS_FILE.into()),
            ),
            wrapper_base_path,
            mapping_templates_path: root.join(MAPPING_TEMPLATES_DIR),
            function_prefix: settings.function_prefix.unwrap_or_default(),
        }
    }

    /// File stem of the handler source module (`handlers` for
    /// `handlers.js`).
    pub fn handler_base(&self) -> String {
        self.handlers_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "handlers".to_string())
    }

    /// File name of the handler source module, used as the wrapper's import
    /// specifier.
    pub fn handlers_file_name(&self) -> String {
        self.handlers_path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_HANDLERS_FILE.to_string())
    }

    /// Base name of the generated wrapper module, referenced by every
    /// handler string in the deployment descriptor.
    pub fn wrapper_module_name(&self) -> String {
        format!("{}_wrapper", self.handler_base())
    }

    /// Path of the generated wrapper artifact, next to the handler source.
    pub fn wrapper_artifact_path(&self) -> PathBuf {
        let ext = self
            .handlers_path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "js".to_string());
        self.project_root
            .join(format!("{}.{}", self.wrapper_module_name(), ext))
    }
}
