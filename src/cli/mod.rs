//! # CLI Module
//!
//! Command-line interface for the generator binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Generate all deployment artifacts for the current project:
//!
//! ```bash
//! slsgen-gen generate
//! ```
//!
//! Every configured path can be overridden per run:
//!
//! ```bash
//! slsgen-gen generate --handlers src/api.js --output serverless.yml --dry-run
//! ```
//!
//! ### `scan`
//!
//! List the descriptors a scan of the handler module discovers, without
//! touching any output:
//!
//! ```bash
//! slsgen-gen scan --handlers handlers.js
//! ```

mod commands;


pub use commands::{run_cli, Cli, Commands};
