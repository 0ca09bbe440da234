//! Rendering the hub configuration
//!
//! The configuration is flattened into a namespace -> attribute -> value tree
//! and written as a traitlets JSON config, TOML, or a Python config file.

use crate::hub::HubConfig;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

#[cfg(test)]
mod tests;

/// Namespace -> attribute -> value
pub type ConfigTree = BTreeMap<String, BTreeMap<String, Value>>;

/// Attributes rendered as Python sets
const SET_TRAITS: [(&str, &str); 2] = [
    ("Authenticator", "admin_users"),
    ("Authenticator", "allowed_users"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Traitlets JSON config file
    #[default]
    Json,
    /// TOML document
    Toml,
    /// jupyterhub_config.py
    Python,
}

impl HubConfig {
    pub fn to_tree(&self) -> ConfigTree {
        let mut tree = ConfigTree::new();

        let hub = tree.entry("JupyterHub".to_string()).or_default();
        hub.insert("spawner_class".into(), json!(self.spawner.class));
        hub.insert("hub_ip".into(), json!(self.hub.hub_ip));
        hub.insert("hub_port".into(), json!(self.hub.hub_port));
        hub.insert(
            "cookie_secret_file".into(),
            json!(self.hub.cookie_secret_file),
        );
        hub.insert("db_url".into(), json!(self.hub.db_url));
        hub.insert(
            "authenticator_class".into(),
            json!(self.authenticator.class_name()),
        );
        hub.insert("admin_access".into(), json!(self.hub.admin_access));

        tree.insert("DockerSpawner".to_string(), self.spawner.traits());

        let provider = self.authenticator.traits();
        if !provider.is_empty() {
            tree.insert(self.authenticator.namespace().to_string(), provider);
        }

        let authenticator = tree.entry("Authenticator".to_string()).or_default();
        authenticator.insert("admin_users".into(), json!(self.users.admins));
        authenticator.insert("allowed_users".into(), json!(self.users.allowed));

        tree.entry("Spawner".to_string())
            .or_default()
            .insert("default_url".into(), json!(self.hub.default_url));

        tree.entry("LabApp".to_string()).or_default().insert(
            "check_for_updates_class".into(),
            json!(self.hub.check_for_updates_class),
        );

        tree
    }

    /// Render in `format`. Python output loads a local spawner module by path.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        let modules: Vec<&str> = self.spawner.local_module().into_iter().collect();
        render_with_modules(&self.to_tree(), format, &modules)
    }
}

pub fn render(tree: &ConfigTree, format: OutputFormat) -> Result<String> {
    render_with_modules(tree, format, &[])
}

/// Render a tree whose `<module>.<Class>` strings for `modules` refer to
/// helper files next to the generated config
pub fn render_with_modules(
    tree: &ConfigTree,
    format: OutputFormat,
    modules: &[&str],
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut out =
                serde_json::to_string_pretty(tree).context("Failed to serialize JSON config")?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Toml => toml::to_string(tree).context("Failed to serialize TOML config"),
        OutputFormat::Python => Ok(render_python(tree, modules)),
    }
}

const MODULE_LOADER: &str = r#"import importlib.util
import os

_THISDIR = os.path.dirname(os.path.abspath(__file__))


def _import_module(module_name):
    filepath = os.path.join(_THISDIR, f"{module_name}.py")
    if not os.path.exists(filepath):
        raise FileNotFoundError(f"Module file '{filepath}' not found")
    spec = importlib.util.spec_from_file_location(module_name, filepath)
    module = importlib.util.module_from_spec(spec)
    spec.loader.exec_module(module)
    return module

"#;

fn render_python(tree: &ConfigTree, modules: &[&str]) -> String {
    let mut out = String::new();
    out.push_str("# Generated by hubconf. Edits will be overwritten.\n\n");

    if !modules.is_empty() {
        out.push_str(MODULE_LOADER);
        for module in modules {
            out.push_str(&format!("{} = _import_module(\"{}\")\n", module, module));
        }
        out.push('\n');
    }

    out.push_str("c = get_config()  # noqa\n");

    for (namespace, attrs) in tree {
        out.push('\n');
        for (attr, value) in attrs {
            let literal = if SET_TRAITS.contains(&(namespace.as_str(), attr.as_str())) {
                python_set(value)
            } else if let Some(reference) = module_reference(value, modules) {
                reference.to_string()
            } else {
                python_literal(value)
            };
            out.push_str(&format!("c.{}.{} = {}\n", namespace, attr, literal));
        }
    }

    out
}

/// A `<module>.<Class>` string naming a class from a loaded helper module
fn module_reference<'a>(value: &'a Value, modules: &[&str]) -> Option<&'a str> {
    let s = value.as_str()?;
    let (module, class) = s.split_once('.')?;
    let is_identifier = !class.is_empty()
        && class.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    (modules.contains(&module) && is_identifier).then_some(s)
}

fn python_set(value: &Value) -> String {
    match value {
        Value::Array(items) if items.is_empty() => "set()".to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(python_literal).collect();
            format!("{{{}}}", items.join(", "))
        }
        other => python_literal(other),
    }
}

fn python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        // JSON string escapes are valid Python string escapes
        Value::String(s) => Value::String(s.clone()).to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}: {}",
                        python_literal(&Value::String(k.clone())),
                        python_literal(v)
                    )
                })
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}
