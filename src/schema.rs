//! Schema walker: classify every field of every registered record type
//!
//! Walks the host's type registry and produces, per record type, an ordered
//! map of field descriptors: plain scalars, forward relations (with their
//! synthesized `_id` shadow keys), many-valued relations, and inferred
//! reverse relations. Classification is exhaustive over the
//! [`FieldDescriptor`] sum type; a field or type that cannot be classified
//! is skipped without affecting its siblings.

use crate::error::{Error, Result};
use crate::host::{
    ChoicePair, ChoiceTypeDef, RawField, RecordTypeDef, RelationKind, ReverseKind, TypeRegistry,
};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Primary-key kind assumed when the related type's pk cannot be determined.
const FALLBACK_PK_TYPE: &str = "IntegerField";

/// Free-text declaration parameters longer than this are truncated.
const MAX_PARAM_TEXT: usize = 60;

/// Role classification of a field on a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    ForwardRelation,
    ManyRelation,
    ReverseRelation,
}

/// Resolved enumerated value set of a field.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ChoiceInfo {
    /// Originating symbolic-choice type, when structural search found one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    /// Flavor of the originating type (`TextChoices` / `IntegerChoices`).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    pub values: Vec<ChoicePair>,
}

/// A concrete single-valued field.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    pub type_name: String,
    pub definition: String,
    pub max_length: Option<u32>,
    pub null: bool,
    pub blank: bool,
    pub choices: Option<ChoiceInfo>,
}

/// A declared relation field, single- or many-valued.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationField {
    pub type_name: String,
    pub definition: String,
    pub max_length: Option<u32>,
    pub null: bool,
    pub blank: bool,
    pub choices: Option<ChoiceInfo>,
    pub related_model: String,
    pub related_app: String,
    pub traversable: bool,
    pub related_query_name: Option<String>,
}

/// The inferred inverse side of a relation declared on another type.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseField {
    pub type_name: String,
    pub related_model: String,
    pub related_app: String,
    pub related_field: String,
    pub reverse_name: String,
    /// Declaration string of the forward field, when it resolves.
    pub definition: Option<String>,
}

/// Exhaustive field classification.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDescriptor {
    Scalar(ScalarField),
    ForwardRelation(RelationField),
    ManyRelation(RelationField),
    ReverseRelation(ReverseField),
}

impl FieldDescriptor {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldDescriptor::Scalar(_) => FieldKind::Scalar,
            FieldDescriptor::ForwardRelation(_) => FieldKind::ForwardRelation,
            FieldDescriptor::ManyRelation(_) => FieldKind::ManyRelation,
            FieldDescriptor::ReverseRelation(_) => FieldKind::ReverseRelation,
        }
    }

    /// Flatten into the serializable per-field metadata record.
    pub fn metadata(&self) -> FieldMetadata {
        match self {
            FieldDescriptor::Scalar(f) => FieldMetadata {
                type_name: f.type_name.clone(),
                definition: Some(f.definition.clone()),
                max_length: f.max_length,
                null: Some(f.null),
                blank: Some(f.blank),
                choices: f.choices.clone(),
                ..FieldMetadata::default()
            },
            FieldDescriptor::ForwardRelation(f) | FieldDescriptor::ManyRelation(f) => {
                FieldMetadata {
                    type_name: f.type_name.clone(),
                    definition: Some(f.definition.clone()),
                    max_length: f.max_length,
                    null: Some(f.null),
                    blank: Some(f.blank),
                    choices: f.choices.clone(),
                    related_model: Some(f.related_model.clone()),
                    related_app: Some(f.related_app.clone()),
                    traversable: Some(f.traversable),
                    related_query_name: f.related_query_name.clone(),
                    ..FieldMetadata::default()
                }
            }
            FieldDescriptor::ReverseRelation(f) => FieldMetadata {
                type_name: f.type_name.clone(),
                definition: f.definition.clone(),
                related_model: Some(f.related_model.clone()),
                related_app: Some(f.related_app.clone()),
                related_field: Some(f.related_field.clone()),
                reverse_name: Some(f.reverse_name.clone()),
                traversable: Some(true),
                ..FieldMetadata::default()
            },
        }
    }
}

/// Serializable per-field metadata, shaped for the emitted document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct FieldMetadata {
    #[serde(rename = "type")]
    pub type_name: String,

    /// Reconstructed declaration string; null for reverse relations whose
    /// forward field could not be resolved. Advisory output only.
    pub definition: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub null: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub blank: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<ChoiceInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_app: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub traversable: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_query_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_field: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse_name: Option<String>,
}

/// One walked record type with its classified fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    pub name: String,
    pub app_label: String,
    pub module: String,
    pub fields: BTreeMap<String, FieldDescriptor>,
}

/// Walk every registered record type, sorted by (app label, name).
pub fn walk(registry: &dyn TypeRegistry) -> Vec<RecordType> {
    let mut defs = registry.record_types();
    defs.sort_by(|a, b| {
        (a.app_label.as_str(), a.name.as_str()).cmp(&(b.app_label.as_str(), b.name.as_str()))
    });

    defs.into_iter()
        .map(|def| walk_type(def, registry))
        .collect()
}

fn walk_type(def: &RecordTypeDef, registry: &dyn TypeRegistry) -> RecordType {
    let declared: BTreeSet<&str> = def.fields.iter().map(|f| f.name.as_str()).collect();
    let mut fields: BTreeMap<String, FieldDescriptor> = BTreeMap::new();

    for raw in &def.fields {
        let descriptor = match classify(def, raw, registry) {
            Ok(Some(descriptor)) => descriptor,
            // Unclassifiable or intentionally excluded: skip, siblings stand.
            Ok(None) | Err(_) => continue,
        };

        if matches!(descriptor.kind(), FieldKind::ForwardRelation) {
            if let Some(shadow) = synthesize_shadow(raw, &declared, registry) {
                fields.entry(shadow.0).or_insert(shadow.1);
            }
        }

        fields.insert(raw.name.clone(), descriptor);
    }

    RecordType {
        name: def.name.clone(),
        app_label: def.app_label.clone(),
        module: def.module.clone(),
        fields,
    }
}

/// Decide a raw field's kind from the two framework signals (concrete,
/// many-valued) plus the presence of relation/reverse metadata.
fn classify(
    owner: &RecordTypeDef,
    field: &RawField,
    registry: &dyn TypeRegistry,
) -> Result<Option<FieldDescriptor>> {
    if field.relation.is_some() && field.reverse.is_some() {
        return Err(Error::Other(format!(
            "field {}.{} carries both forward and reverse relation metadata",
            owner.name, field.name
        )));
    }

    if let Some(reverse) = &field.reverse {
        return Ok(Some(FieldDescriptor::ReverseRelation(reverse_field(
            field, reverse, registry,
        ))));
    }

    if (field.concrete && !field.many_to_many) || field.relation.is_some() {
        if let Some(relation) = &field.relation {
            // Invariant: a relation always names a resolvable record type.
            registry
                .find_type(&relation.app_label, &relation.model)
                .ok_or_else(|| {
                    Error::Other(format!(
                        "field {}.{} references unknown type {}.{}",
                        owner.name, field.name, relation.app_label, relation.model
                    ))
                })?;

            let out = RelationField {
                type_name: field.type_name.clone(),
                definition: render_definition(owner, field, registry),
                max_length: field.max_length,
                null: field.null,
                blank: field.blank,
                choices: choice_info(owner, field, registry),
                related_model: relation.model.clone(),
                related_app: relation.app_label.clone(),
                traversable: !matches!(relation.kind, RelationKind::ManyToMany),
                related_query_name: relation.query_name.clone(),
            };

            return Ok(Some(match relation.kind {
                RelationKind::ManyToMany => FieldDescriptor::ManyRelation(out),
                RelationKind::ForeignKey | RelationKind::OneToOne => {
                    FieldDescriptor::ForwardRelation(out)
                }
            }));
        }

        return Ok(Some(FieldDescriptor::Scalar(ScalarField {
            type_name: field.type_name.clone(),
            definition: render_definition(owner, field, registry),
            max_length: field.max_length,
            null: field.null,
            blank: field.blank,
            choices: choice_info(owner, field, registry),
        })));
    }

    // Neither concrete, many-valued relation, nor inverse-side metadata.
    Ok(None)
}

fn reverse_field(
    field: &RawField,
    reverse: &crate::host::RawReverse,
    registry: &dyn TypeRegistry,
) -> ReverseField {
    let lower = reverse.model.to_lowercase();
    let reverse_name = reverse.related_name.clone().unwrap_or(match reverse.kind {
        ReverseKind::OneToOne => lower,
        ReverseKind::ManyToOne | ReverseKind::ManyToMany => format!("{}_set", lower),
    });

    // Render the forward field's declaration from the related type.
    let definition = registry
        .find_type(&reverse.app_label, &reverse.model)
        .and_then(|related| {
            related
                .fields
                .iter()
                .find(|f| f.name == reverse.field)
                .map(|forward| render_definition(related, forward, registry))
        });

    ReverseField {
        type_name: field.type_name.clone(),
        related_model: reverse.model.clone(),
        related_app: reverse.app_label.clone(),
        related_field: reverse.field.clone(),
        reverse_name,
        definition,
    }
}

/// Synthesize the `<name>_id` shadow scalar for a single-valued forward
/// relation, typed as the related type's primary-key kind. Declared fields
/// of the same name always win.
fn synthesize_shadow(
    field: &RawField,
    declared: &BTreeSet<&str>,
    registry: &dyn TypeRegistry,
) -> Option<(String, FieldDescriptor)> {
    let relation = field.relation.as_ref()?;
    if matches!(relation.kind, RelationKind::ManyToMany) {
        return None;
    }

    let shadow_name = format!("{}_id", field.name);
    if declared.contains(shadow_name.as_str()) {
        return None;
    }

    let pk_type = registry
        .find_type(&relation.app_label, &relation.model)
        .and_then(|related| related.fields.iter().find(|f| f.primary_key))
        .map(|pk| pk.type_name.clone())
        .unwrap_or_else(|| FALLBACK_PK_TYPE.to_string());

    let definition = format!(
        "{} = models.{}()  # → {}.pk",
        shadow_name, pk_type, relation.model
    );

    Some((
        shadow_name,
        FieldDescriptor::Scalar(ScalarField {
            type_name: pk_type,
            definition,
            max_length: None,
            null: field.null,
            blank: field.blank,
            choices: None,
        }),
    ))
}

/// Locate the symbolic-choice type a field's value set originated from:
/// search the owning type's namespace, then its defining module's
/// namespace, for the first type whose value pairs structurally equal the
/// field's. Two candidates with identical value sets resolve to whichever
/// the search visits first.
fn find_choices_class<'a>(
    owner: &'a RecordTypeDef,
    values: &[ChoicePair],
    registry: &'a dyn TypeRegistry,
) -> Option<&'a ChoiceTypeDef> {
    owner
        .choice_types
        .iter()
        .chain(registry.choice_types_in_module(&owner.module))
        .find(|candidate| candidate.values == values)
}

fn choice_info(
    owner: &RecordTypeDef,
    field: &RawField,
    registry: &dyn TypeRegistry,
) -> Option<ChoiceInfo> {
    let values = field.choices.as_ref().filter(|v| !v.is_empty())?;
    let class = find_choices_class(owner, values, registry);

    Some(ChoiceInfo {
        class: class.map(|c| c.name.clone()),
        kind: class
            .and_then(|c| c.kind)
            .map(|k| k.type_name().to_string()),
        values: values.clone(),
    })
}

/// Declaration parameters worth echoing back, in fixed render order.
const IMPORTANT_KWARGS: [&str; 17] = [
    "max_length",
    "null",
    "blank",
    "default",
    "unique",
    "choices",
    "related_name",
    "on_delete",
    "db_index",
    "help_text",
    "verbose_name",
    "upload_to",
    "max_digits",
    "decimal_places",
    "auto_now",
    "auto_now_add",
    "primary_key",
];

/// Reconstruct a human-readable declaration string, e.g.
/// `title = models.CharField(max_length=200)`. Advisory output only.
fn render_definition(
    owner: &RecordTypeDef,
    field: &RawField,
    registry: &dyn TypeRegistry,
) -> String {
    let mut params: Vec<String> = Vec::new();

    for arg in &field.args {
        match arg.get("model").and_then(Value::as_str) {
            Some(model) => params.push(model.to_string()),
            None => params.push(python_repr(arg)),
        }
    }

    for key in IMPORTANT_KWARGS {
        if key == "choices" {
            if let Some(values) = field.choices.as_ref().filter(|v| !v.is_empty()) {
                match find_choices_class(owner, values, registry) {
                    Some(class) => params.push(format!("choices={}.choices", class.name)),
                    None => params.push("choices=...".to_string()),
                }
            }
            continue;
        }

        let Some(value) = field.kwargs.get(key) else {
            continue;
        };

        match key {
            "on_delete" => {
                let name = value.as_str().unwrap_or("CASCADE");
                params.push(format!("on_delete=models.{}", name));
            }
            "default" => match value.get("callable").and_then(Value::as_str) {
                Some(name) => params.push(format!("default={}", name)),
                None => params.push(format!("default={}", python_repr(value))),
            },
            "help_text" => {
                let text = match value.as_str() {
                    Some(s) => truncate_text(s),
                    None => truncate_text(&python_repr(value)),
                };
                params.push(format!("help_text={}", quote(&text)));
            }
            _ => params.push(format!("{}={}", key, python_repr(value))),
        }
    }

    format!("{} = models.{}({})", field.name, field.type_name, params.join(", "))
}

fn truncate_text(text: &str) -> String {
    if text.chars().count() > MAX_PARAM_TEXT {
        let head: String = text.chars().take(MAX_PARAM_TEXT - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Render a JSON value the way the host language would echo a literal.
fn python_repr(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(python_repr).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quote(k), python_repr(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}
