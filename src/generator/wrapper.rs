//! Wrapper module emitter: synthesizes the companion source artifact that
//! re-exports every handler wrapped for deployment and, when GraphQL-bound
//! descriptors exist, dispatches resolver invocations by name.

use minijinja::{context, Environment};

use crate::descriptor::DescriptorMap;

/// Name of the generated dispatcher export and of its function entry in the
/// deployment descriptor.
pub const DISPATCHER_NAME: &str = "appSyncResolver";

/// Aggregate wrapper statements across all descriptors, in build order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrapperSpec {
    /// Import aliases binding each original handler to an internal name.
    pub aliases: Vec<String>,
    /// Wrapper statements for non-GraphQL handlers.
    pub wrappers: Vec<String>,
    /// Names exported under their original name.
    pub exports: Vec<String>,
    /// Dispatcher case statements for GraphQL handlers.
    pub dispatch_cases: Vec<String>,
}

/// Build the wrapper spec from the completed descriptor mapping.
pub fn build_wrapper_spec(descriptors: &DescriptorMap) -> WrapperSpec {
    let mut spec = WrapperSpec::default();
    for descriptor in descriptors.values() {
        let name = &descriptor.function_name;
        spec.aliases.push(format!("{name} as {name}_old"));
        if descriptor.gql {
            spec.dispatch_cases.push(format!(
                "    case \"{name}\":\n      return {name}_old(event, context);"
            ));
        } else {
            spec.wrappers
                .push(format!("const {name} = withWrapper({name}_old);"));
            spec.exports.push(name.clone());
        }
    }
    if !spec.dispatch_cases.is_empty() {
        spec.exports.push(DISPATCHER_NAME.to_string());
    }
    spec
}

/// Render the final wrapper module text against the supplied wrapper base
/// template. Output is deterministic for a fixed spec and template.
///
/// `handlers_module` is the import specifier of the original handler module
/// (e.g. `./handlers.js`).
pub fn render_wrapper(
    spec: &WrapperSpec,
    template_source: &str,
    handlers_module: &str,
) -> anyhow::Result<String> {
    let mut env = Environment::new();
    env.add_template("wrapper_base", template_source)?;
    let rendered = env.get_template("wrapper_base")?.render(context! {
        aliases => spec.aliases.join(",\n  "),
        wrappers => spec.wrappers.join("\n"),
        exporteds => spec
            .exports
            .iter()
            .map(|name| format!("  {name},"))
            .collect::<Vec<_>>()
            .join("\n"),
        resolvers => spec.dispatch_cases.join("\n"),
        handlersPath => handlers_module,
    })?;
    Ok(rendered)
}
