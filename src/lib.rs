//! # slsgen
//!
//! **slsgen** is an annotation-driven artifact generator for Serverless
//! Framework projects with AWS AppSync resolvers. It scans a handler source
//! module for `@lambda`-annotated function declarations and produces three
//! coupled artifacts from the discovered metadata:
//!
//! - function configuration merged into an existing deployment descriptor
//!   (`base.yml` → `serverless.yml`)
//! - per-function AppSync request-mapping templates plus datasource and
//!   resolver wiring under the descriptor's `custom.appSync` subtree
//! - a wrapper module that re-exports every handler wrapped for deployment
//!   and dispatches GraphQL resolver invocations by name
//!
//! ## Architecture
//!
//! The library is organized into a handful of modules:
//!
//! - **[`scanner`]** - pairs annotation lines with the declarations below them
//! - **[`descriptor`]** - tokenizes pairs into normalized function descriptors
//!   with defaulting rules applied
//! - **[`generator`]** - fans the descriptor mapping out into the three
//!   artifacts and orchestrates the plan/write phases
//! - **[`document`]** - serde_yaml-backed base-document handling
//! - **[`config`]** - the `serverlessBuilder` settings block of `package.json`
//! - **[`cli`]** - the `slsgen-gen` command-line interface
//!
//! ## Generation Flow
//!
//! ```text
//! handlers.js ──scan──▶ pairs ──build──▶ descriptor map
//!                                            │
//!                      ┌─────────────────────┼──────────────────────┐
//!                resolver specs        function configs        wrapper spec
//!                      │                     │                      │
//!                      └────── merged into base.yml clone ──────────┘
//!                                            │
//!                mapping-templates/*  serverless.yml  handlers_wrapper.js
//! ```
//!
//! All artifacts are computed in memory first and written at the end, so a
//! failing run never leaves partial output behind. Scan order is preserved
//! throughout: it decides duplicate-name overwrites and artifact ordering.
//!
//! ## Quick Start
//!
//! ```no_run
//! use slsgen::config::{BuildConfig, BuilderSettings};
//! use slsgen::generator::generate_artifacts;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = BuildConfig::load(std::path::Path::new("."), BuilderSettings::default())?;
//! let artifacts = generate_artifacts(&config)?;
//! println!("functions: {}", artifacts.function_names.join(", "));
//! # Ok(())
//! # }
//! ```
//!
//! ## Annotation Syntax
//!
//! One annotation line directly above each handler declaration:
//!
//! ```javascript
//! //@lambda type=Query gql=true
//! function getUser(event) { /* ... */ }
//!
//! //@lambda s3=upload-bucket tag-Team=platform environment-STAGE=prod
//! function onUpload(event) { /* ... */ }
//! ```
//!
//! A word without `=` is a boolean flag; a word with `=` splits on the first
//! occurrence. Unrecognized attributes are reported, not silently dropped.

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod document;
pub mod error;
pub mod generator;
pub mod scanner;

pub use descriptor::{
    build_descriptor, build_descriptors, AnnotationToken, DescriptorMap, FunctionDescriptor,
    OperationKind,
};
pub use error::BuildError;
pub use scanner::{scan_source, AnnotationPair, ScanOutcome, ANNOTATION_MARKER};
