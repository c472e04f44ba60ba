//! # Generator Module
//!
//! Fans one normalized descriptor mapping out into the three deployment
//! artifacts:
//!
//! - **Function config** - deployable-function entries merged into the base
//!   descriptor's `functions` map
//! - **Resolver mappings** - per-function AppSync request templates plus
//!   datasource and resolver wiring under `custom.appSync`
//! - **Wrapper module** - the companion source artifact re-exporting every
//!   handler and dispatching GraphQL invocations by name
//!
//! ```text
//! handler source → scanner → descriptor map → {functions, resolvers, wrapper}
//!                                           → merged document + artifacts
//! ```
//!
//! The orchestrator in `project` computes everything in memory first and
//! writes at the end, so a failing run produces no partial artifacts.

mod functions;
mod project;
mod resolvers;
mod wrapper;

#[cfg(test)]
mod tests;

pub use functions::*;
pub use project::*;
pub use resolvers::*;
pub use wrapper::*;
