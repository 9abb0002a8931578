//! Snapshot manifests: the explicit-manifest host implementation
//!
//! A `Snapshot` is the serialized form of a bootstrapped application's live
//! object model: record types, per-module symbolic-choice namespaces, and
//! the routing tree. Whatever bootstraps the host produces one; this crate
//! only consumes it. A manifest that cannot be read or parsed is the
//! bootstrap-failure case and aborts the whole run.

use crate::error::{Error, Result};
use crate::host::{ChoiceTypeDef, RecordTypeDef, RouteNode, RouteTable, TypeRegistry};
use schemars::JsonSchema;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Symbolic-choice types declared at one module's namespace.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ModuleNamespace {
    #[serde(default)]
    pub choice_types: Vec<ChoiceTypeDef>,
}

/// A full snapshot of the host's live object model.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct Snapshot {
    /// Every registered record type, in registry order.
    #[serde(default)]
    pub types: Vec<RecordTypeDef>,

    /// Module-level namespaces, keyed by dotted module path.
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleNamespace>,

    /// Root nodes of the routing tree.
    #[serde(default)]
    pub routes: Vec<RouteNode>,
}

impl Snapshot {
    /// Parse a snapshot from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml).map_err(|e| Error::ManifestParse(e.to_string()))
    }

    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::ManifestParse(e.to_string()))
    }

    /// Load a snapshot from a file, dispatching on extension; anything not
    /// named `*.json` is treated as YAML (a JSON document parses as YAML
    /// anyway).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }
}

impl TypeRegistry for Snapshot {
    fn record_types(&self) -> Vec<&RecordTypeDef> {
        self.types.iter().collect()
    }

    fn choice_types_in_module(&self, module: &str) -> &[ChoiceTypeDef] {
        self.modules
            .get(module)
            .map(|ns| ns.choice_types.as_slice())
            .unwrap_or(&[])
    }
}

impl RouteTable for Snapshot {
    fn routes(&self) -> &[RouteNode] {
        &self.routes
    }
}
