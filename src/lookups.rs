//! Lookup taxonomy: the framework's closed comparison-operator vocabulary
//!
//! Encoded as data rather than code so the schema walker stays free of
//! per-type branching. The table is immutable and built once at first use.

use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;

/// Lookups applicable to every field kind, relations included.
pub const BASE_LOOKUPS: [&str; 3] = ["exact", "isnull", "in"];

const NUMERIC_LOOKUPS: [&str; 5] = ["gt", "gte", "lt", "lte", "range"];

const STRING_LOOKUPS: [&str; 9] = [
    "iexact",
    "contains",
    "icontains",
    "startswith",
    "istartswith",
    "endswith",
    "iendswith",
    "regex",
    "iregex",
];

const DATE_LOOKUPS: [&str; 8] = [
    "year",
    "month",
    "day",
    "week",
    "week_day",
    "quarter",
    "iso_year",
    "iso_week_day",
];

const TIME_LOOKUPS: [&str; 3] = ["hour", "minute", "second"];

const JSON_LOOKUPS: [&str; 5] = [
    "contains",
    "contained_by",
    "has_key",
    "has_keys",
    "has_any_keys",
];

/// Documentation attached to one lookup operator.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct LookupDoc {
    /// Human-readable description.
    pub description: &'static str,

    /// Illustrative predicate template.
    pub sql: &'static str,
}

/// The complete taxonomy: universal base set, per-field-kind operator
/// lists, and per-operator documentation.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct LookupTable {
    pub base: Vec<&'static str>,
    pub by_type: BTreeMap<&'static str, Vec<&'static str>>,
    pub metadata: BTreeMap<&'static str, LookupDoc>,
}

impl LookupTable {
    /// Operators a field kind supports beyond the base set. Unknown kinds
    /// get an empty list (base lookups still apply).
    pub fn for_type(&self, type_name: &str) -> &[&'static str] {
        self.by_type
            .get(type_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// The process-wide taxonomy instance.
pub fn table() -> &'static LookupTable {
    static TABLE: Lazy<LookupTable> = Lazy::new(build_table);
    &TABLE
}

fn concat(parts: &[&[&'static str]]) -> Vec<&'static str> {
    parts.iter().flat_map(|p| p.iter().copied()).collect()
}

fn build_table() -> LookupTable {
    let numeric = NUMERIC_LOOKUPS.to_vec();
    let string = STRING_LOOKUPS.to_vec();
    let datetime = concat(&[&NUMERIC_LOOKUPS, &DATE_LOOKUPS, &TIME_LOOKUPS, &["date", "time"]]);

    let mut by_type: BTreeMap<&'static str, Vec<&'static str>> = BTreeMap::new();

    // Numeric fields
    for kind in [
        "AutoField",
        "BigAutoField",
        "SmallAutoField",
        "IntegerField",
        "BigIntegerField",
        "SmallIntegerField",
        "PositiveIntegerField",
        "PositiveSmallIntegerField",
        "PositiveBigIntegerField",
        "FloatField",
        "DecimalField",
        "DurationField",
    ] {
        by_type.insert(kind, numeric.clone());
    }

    // String fields, file paths and IP addresses share text matching
    for kind in [
        "CharField",
        "TextField",
        "SlugField",
        "EmailField",
        "URLField",
        "FileField",
        "ImageField",
        "FilePathField",
        "IPAddressField",
        "GenericIPAddressField",
    ] {
        by_type.insert(kind, string.clone());
    }

    // Temporal fields
    by_type.insert("DateField", concat(&[&NUMERIC_LOOKUPS, &DATE_LOOKUPS, &["date"]]));
    by_type.insert("DateTimeField", datetime);
    by_type.insert("TimeField", concat(&[&NUMERIC_LOOKUPS, &TIME_LOOKUPS]));

    // Structured / special fields
    by_type.insert("JSONField", JSON_LOOKUPS.to_vec());
    by_type.insert("UUIDField", concat(&[&["iexact"], &NUMERIC_LOOKUPS]));

    // Base set only
    by_type.insert("BooleanField", vec![]);
    by_type.insert("BinaryField", vec![]);

    // Relation fields: traversal only, base lookups apply
    by_type.insert("ForeignKey", vec![]);
    by_type.insert("OneToOneField", vec![]);
    by_type.insert("ManyToManyField", vec![]);

    LookupTable {
        base: BASE_LOOKUPS.to_vec(),
        by_type,
        metadata: build_metadata(),
    }
}

fn build_metadata() -> BTreeMap<&'static str, LookupDoc> {
    let entries: [(&'static str, &'static str, &'static str); 34] = [
        ("exact", "Exact match", "WHERE {field} = {value}"),
        (
            "iexact",
            "Case-insensitive exact match",
            "WHERE UPPER({field}) = UPPER({value})",
        ),
        (
            "contains",
            "Case-sensitive containment test",
            "WHERE {field} LIKE '%{value}%'",
        ),
        (
            "icontains",
            "Case-insensitive containment test",
            "WHERE UPPER({field}) LIKE UPPER('%{value}%')",
        ),
        (
            "startswith",
            "Case-sensitive starts-with",
            "WHERE {field} LIKE '{value}%'",
        ),
        (
            "istartswith",
            "Case-insensitive starts-with",
            "WHERE UPPER({field}) LIKE UPPER('{value}%')",
        ),
        (
            "endswith",
            "Case-sensitive ends-with",
            "WHERE {field} LIKE '%{value}'",
        ),
        (
            "iendswith",
            "Case-insensitive ends-with",
            "WHERE UPPER({field}) LIKE UPPER('%{value}')",
        ),
        ("gt", "Greater than", "WHERE {field} > {value}"),
        ("gte", "Greater than or equal to", "WHERE {field} >= {value}"),
        ("lt", "Less than", "WHERE {field} < {value}"),
        ("lte", "Less than or equal to", "WHERE {field} <= {value}"),
        (
            "isnull",
            "Check if field is NULL or not",
            "WHERE {field} IS NULL",
        ),
        (
            "range",
            "Range test (inclusive)",
            "WHERE {field} BETWEEN {start} AND {end}",
        ),
        (
            "in",
            "Check if value is in list",
            "WHERE {field} IN ({values})",
        ),
        (
            "regex",
            "Case-sensitive regular expression match",
            "WHERE {field} ~ '{pattern}'",
        ),
        (
            "iregex",
            "Case-insensitive regular expression match",
            "WHERE {field} ~* '{pattern}'",
        ),
        (
            "year",
            "Extract year from date/datetime field",
            "WHERE EXTRACT(YEAR FROM {field}) = {value}",
        ),
        (
            "month",
            "Extract month from date/datetime field",
            "WHERE EXTRACT(MONTH FROM {field}) = {value}",
        ),
        (
            "day",
            "Extract day from date/datetime field",
            "WHERE EXTRACT(DAY FROM {field}) = {value}",
        ),
        (
            "week",
            "Extract ISO week number",
            "WHERE EXTRACT(WEEK FROM {field}) = {value}",
        ),
        (
            "week_day",
            "Day of week (1=Sunday, 7=Saturday)",
            "WHERE EXTRACT(DOW FROM {field}) = {value}",
        ),
        (
            "quarter",
            "Extract quarter (1-4)",
            "WHERE EXTRACT(QUARTER FROM {field}) = {value}",
        ),
        (
            "hour",
            "Extract hour from time/datetime field",
            "WHERE EXTRACT(HOUR FROM {field}) = {value}",
        ),
        (
            "minute",
            "Extract minute from time/datetime field",
            "WHERE EXTRACT(MINUTE FROM {field}) = {value}",
        ),
        (
            "second",
            "Extract second from time/datetime field",
            "WHERE EXTRACT(SECOND FROM {field}) = {value}",
        ),
        ("date", "Cast datetime to date", "WHERE DATE({field}) = {value}"),
        (
            "time",
            "Extract time from datetime field",
            "WHERE TIME({field}) = {value}",
        ),
        (
            "iso_year",
            "Extract ISO year",
            "WHERE EXTRACT(ISOYEAR FROM {field}) = {value}",
        ),
        (
            "iso_week_day",
            "ISO day of week (1=Monday, 7=Sunday)",
            "WHERE EXTRACT(ISODOW FROM {field}) = {value}",
        ),
        (
            "has_key",
            "Check if JSON has a specific key at top level",
            "WHERE {field} ? '{key}'",
        ),
        (
            "has_keys",
            "Check if JSON has all specified keys",
            "WHERE {field} ?& ARRAY['{keys}']",
        ),
        (
            "has_any_keys",
            "Check if JSON has any of the specified keys",
            "WHERE {field} ?| ARRAY['{keys}']",
        ),
        (
            "contained_by",
            "Check if JSON is contained by another JSON",
            "WHERE {field} <@ '{json}'",
        ),
    ];

    entries
        .into_iter()
        .map(|(name, description, sql)| (name, LookupDoc { description, sql }))
        .collect()
}
