//! Emitted documents: schema index, endpoint list, model summaries,
//! and the failure envelope
//!
//! Thin assembly layer: the walker and resolver do the work, this module
//! shapes their output into the JSON documents downstream tooling reads.

use crate::error::Error;
use crate::host::{RouteTable, TypeRegistry};
use crate::lookups::{self, LookupTable};
use crate::routes::{self, Endpoint};
use crate::schema::{self, FieldMetadata};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;

/// One record type in the schema document.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ModelEntry {
    pub app_label: String,
    pub module: String,
    pub fields: BTreeMap<String, FieldMetadata>,
}

/// The schema-mode document: every walked record type plus the static
/// lookup taxonomy.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SchemaDocument {
    pub models: BTreeMap<String, ModelEntry>,
    pub lookups: LookupTable,
}

/// Assemble the schema-mode document.
pub fn schema_document(registry: &dyn TypeRegistry) -> SchemaDocument {
    let models = schema::walk(registry)
        .into_iter()
        .map(|record| {
            let fields = record
                .fields
                .iter()
                .map(|(name, descriptor)| (name.clone(), descriptor.metadata()))
                .collect();
            (
                record.name,
                ModelEntry {
                    app_label: record.app_label,
                    module: record.module,
                    fields,
                },
            )
        })
        .collect();

    SchemaDocument {
        models,
        lookups: lookups::table().clone(),
    }
}

/// Assemble the route-mode document.
pub fn route_document(table: &dyn RouteTable) -> Vec<Endpoint> {
    routes::resolve(table)
}

/// One line of the model-summary document.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ModelSummary {
    pub name: String,
    pub app_label: String,
    pub db_table: String,
    pub field_count: usize,
    pub file: String,
    pub line: u32,
    pub pos: [u32; 2],
    pub module: String,
}

/// Assemble the model-summary document, sorted by (app label, name).
/// Types with no resolvable source location are omitted.
pub fn model_summaries(registry: &dyn TypeRegistry) -> Vec<ModelSummary> {
    let mut summaries: Vec<ModelSummary> = registry
        .record_types()
        .into_iter()
        .filter_map(|def| {
            let location = def.location.as_ref()?;
            Some(ModelSummary {
                name: def.name.clone(),
                app_label: def.app_label.clone(),
                db_table: def.table_name(),
                field_count: def.fields.len(),
                file: location.file.clone(),
                line: location.line,
                pos: [location.line, 0],
                module: def.module.clone(),
            })
        })
        .collect();

    summaries.sort_by(|a, b| {
        (a.app_label.as_str(), a.name.as_str()).cmp(&(b.app_label.as_str(), b.name.as_str()))
    });
    summaries
}

/// The structured failure object written to the error stream.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ErrorEnvelope {
    pub error: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

impl ErrorEnvelope {
    pub fn from_error(error: &Error) -> Self {
        let mut chain = Vec::new();
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }

        ErrorEnvelope {
            error: error.to_string(),
            kind: error.kind().to_string(),
            traceback: (!chain.is_empty()).then(|| chain.join("\ncaused by: ")),
        }
    }
}
