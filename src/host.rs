//! Host object model: what a bootstrapped application exposes
//!
//! The extraction core never talks to a reflection mechanism directly. It
//! consumes the read-only object model defined here through two capability
//! traits: [`TypeRegistry`] for the schema side and [`RouteTable`] for the
//! routing side. The shipped implementation is an explicit manifest (see
//! [`crate::snapshot`]); any other host strategy (build-time generation, a
//! plugin-supplied registry) only has to implement the same traits.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A resolved source position: defining file plus 1-based starting line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

/// An introspectable routine: a function or bound method.
///
/// A decorated routine is represented from the outside in: the outermost
/// layer is the `Callable` itself, and `wraps` points one layer further in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Callable {
    pub name: String,

    #[serde(default)]
    pub module: String,

    /// Defining file/line of this layer, when the source is retrievable.
    #[serde(default)]
    pub location: Option<SourceLocation>,

    /// The next wrapper layer in, if this callable decorates another.
    #[serde(default)]
    pub wraps: Option<Box<Wrapper>>,
}

/// One decorator layer around an inner routine.
///
/// `preserves_identity` mirrors whether the wrapper carried the identity
/// metadata of its inner routine. Unwinding stops at the first layer that
/// did not preserve it; that layer's own (generic) location is then the
/// best available answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Wrapper {
    #[serde(default = "default_true")]
    pub preserves_identity: bool,

    pub inner: Callable,
}

fn default_true() -> bool {
    true
}

/// Captured source text of a handler type, as lines plus the 1-based line
/// number the text starts at. Used for the per-verb method scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassSource {
    pub start_line: u32,
    pub lines: Vec<String>,
}

/// A handler type: a class dispatching requests to its own methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ViewClass {
    pub name: String,

    #[serde(default)]
    pub module: String,

    #[serde(default)]
    pub location: Option<SourceLocation>,

    /// Source text of the class body, when retrievable.
    #[serde(default)]
    pub source: Option<ClassSource>,

    /// Attribute lookup for named methods, inherited ones included. An
    /// inherited method carries its foreign defining location.
    #[serde(default)]
    pub methods: BTreeMap<String, Callable>,
}

impl ViewClass {
    /// Qualified identifier, `module.Name`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }
}

/// One verb-to-action binding of a resource controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActionBinding {
    /// HTTP verb, lowercase.
    pub method: String,

    /// Logical action name (`list`, `create`, `retrieve`, ...).
    pub action: String,
}

/// The shape of the routine bound to a route leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Handler {
    /// A plain function handler, possibly decorated.
    Function { callable: Callable },

    /// A class dispatching on per-verb methods (`get`, `post`, ...).
    ClassBased { class: ViewClass },

    /// A resource controller with an explicit verb-to-action table.
    ResourceController {
        class: ViewClass,
        #[serde(default)]
        actions: Vec<ActionBinding>,
    },
}

/// A node of the routing tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteNode {
    /// A subtree: a path-prefix fragment over nested child nodes.
    Include {
        #[serde(default)]
        pattern: String,
        #[serde(default)]
        routes: Vec<RouteNode>,
    },

    /// A leaf: a concrete pattern bound to a handler. A leaf without a
    /// handler is unreachable and skipped.
    Route {
        #[serde(default)]
        pattern: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        view: Option<Handler>,
    },
}

/// Multiplicity of a declared forward relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    ForeignKey,
    OneToOne,
    ManyToMany,
}

/// Forward-relation metadata carried by a declared field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawRelation {
    /// Related record type name.
    pub model: String,

    /// App label owning the related type.
    pub app_label: String,

    pub kind: RelationKind,

    /// Name usable to traverse the relation backwards in query predicates.
    #[serde(default)]
    pub query_name: Option<String>,
}

/// Side of the inverse relation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReverseKind {
    ManyToOne,
    ManyToMany,
    OneToOne,
}

/// Reverse-relation metadata: the inferred inverse side of a forward or
/// many-valued relation declared on another type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawReverse {
    pub kind: ReverseKind,

    /// Record type declaring the forward field.
    pub model: String,

    pub app_label: String,

    /// Name of the forward field on `model`.
    pub field: String,

    /// Explicit reverse-access alias, when one was declared.
    #[serde(default)]
    pub related_name: Option<String>,
}

/// One (raw value, display label) entry of an enumerated value set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChoicePair {
    pub value: serde_json::Value,
    pub label: String,
}

/// Flavor of a symbolic-choice type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceKind {
    Text,
    Integer,
}

impl ChoiceKind {
    /// Display name used in emitted metadata.
    pub fn type_name(self) -> &'static str {
        match self {
            ChoiceKind::Text => "TextChoices",
            ChoiceKind::Integer => "IntegerChoices",
        }
    }
}

/// A symbolic-choice type: a named, closed set of (value, label) pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChoiceTypeDef {
    pub name: String,

    #[serde(default)]
    pub kind: Option<ChoiceKind>,

    pub values: Vec<ChoicePair>,
}

/// Raw per-field metadata as the host's metadata facility reports it.
///
/// Classification into the four descriptor kinds happens in the schema
/// walker; this struct only records the signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawField {
    pub name: String,

    /// Semantic field-kind tag (`CharField`, `ForeignKey`, `ManyToOneRel`, ...).
    #[serde(rename = "type")]
    pub type_name: String,

    /// Whether the field is concrete (backed by a column).
    #[serde(default)]
    pub concrete: bool,

    /// Whether the field is many-valued.
    #[serde(default)]
    pub many_to_many: bool,

    #[serde(default)]
    pub primary_key: bool,

    #[serde(default)]
    pub null: bool,

    #[serde(default)]
    pub blank: bool,

    #[serde(default)]
    pub max_length: Option<u32>,

    /// Enumerated value set, when the field constrains its values.
    #[serde(default)]
    pub choices: Option<Vec<ChoicePair>>,

    /// Present on declared forward relations.
    #[serde(default)]
    pub relation: Option<RawRelation>,

    /// Present on inferred reverse-relation entries.
    #[serde(default)]
    pub reverse: Option<RawReverse>,

    /// Deconstructed positional declaration arguments. A `{"model": name}`
    /// object renders as a bare type reference.
    #[serde(default)]
    pub args: Vec<serde_json::Value>,

    /// Deconstructed keyword declaration arguments.
    #[serde(default)]
    pub kwargs: BTreeMap<String, serde_json::Value>,
}

/// A registered record type with its raw field list and own-namespace
/// symbolic-choice types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecordTypeDef {
    pub name: String,

    pub app_label: String,

    #[serde(default)]
    pub module: String,

    /// Backing table name; defaults to `<app_label>_<lowercase name>`.
    #[serde(default)]
    pub table: Option<String>,

    #[serde(default)]
    pub location: Option<SourceLocation>,

    /// Declared fields plus framework-exposed implied fields, in
    /// declaration order.
    #[serde(default)]
    pub fields: Vec<RawField>,

    /// Symbolic-choice types declared in the type's own namespace.
    #[serde(default)]
    pub choice_types: Vec<ChoiceTypeDef>,
}

impl RecordTypeDef {
    /// Lowercase type name, the framework's model-name token.
    pub fn lower_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Backing table name, defaulted when the host did not report one.
    pub fn table_name(&self) -> String {
        self.table
            .clone()
            .unwrap_or_else(|| format!("{}_{}", self.app_label, self.lower_name()))
    }
}

/// Read-only access to the host's record-type registry.
pub trait TypeRegistry {
    /// Every registered record type, in registry order.
    fn record_types(&self) -> Vec<&RecordTypeDef>;

    /// Symbolic-choice types declared at a module's namespace.
    fn choice_types_in_module(&self, module: &str) -> &[ChoiceTypeDef];

    /// Resolve a record type by owning app label and name.
    fn find_type(&self, app_label: &str, name: &str) -> Option<&RecordTypeDef> {
        self.record_types()
            .into_iter()
            .find(|t| t.app_label == app_label && t.name == name)
    }
}

/// Read-only access to the host's routing tree.
pub trait RouteTable {
    /// Root nodes of the routing tree.
    fn routes(&self) -> &[RouteNode];
}
