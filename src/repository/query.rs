//!
//! # Query Filter Translation
//!
//! Translates a caller-supplied map of `field` / `field__op` keys into a
//! conjunction of per-column predicates, and parses the pagination directives
//! (`page`, `page_size`, `ordering`) that accompany a find request.
//!
//! Column names are only ever taken from an entity's static field registry,
//! never from raw client input; values are always bound as statement
//! parameters through `sqlx::QueryBuilder`.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use crate::config::{DEFAULT_ORDERING, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::error::AppError;

/// Keys with pagination meaning; never interpreted as filter fields.
const RESERVED_KEYS: [&str; 3] = ["page", "page_size", "ordering"];

/// The SQL type of a registered entity column, used to parse raw query-string
/// values into typed bind parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Text,
    Bool,
    Timestamp,
}

/// One entry of an entity's field registry.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// A typed scalar bound into a dynamically built statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

impl SqlValue {
    /// Parses a raw query-string value according to the column's kind.
    fn parse(kind: FieldKind, key: &str, raw: &str) -> Result<Self, AppError> {
        match kind {
            FieldKind::Int => raw
                .parse::<i64>()
                .map(SqlValue::Int)
                .map_err(|_| AppError::BadRequest(format!("invalid integer for '{}'", key))),
            FieldKind::Text => Ok(SqlValue::Text(raw.to_string())),
            FieldKind::Bool => match raw {
                "true" | "1" => Ok(SqlValue::Bool(true)),
                "false" | "0" => Ok(SqlValue::Bool(false)),
                _ => Err(AppError::BadRequest(format!(
                    "invalid boolean for '{}'",
                    key
                ))),
            },
            FieldKind::Timestamp => DateTime::parse_from_rfc3339(raw)
                .map(|ts| SqlValue::Timestamp(ts.with_timezone(&Utc)))
                .map_err(|_| {
                    AppError::BadRequest(format!("invalid RFC 3339 timestamp for '{}'", key))
                }),
        }
    }

    /// Appends this value to a query builder, as a bind parameter for
    /// concrete values and as a literal for `NULL`.
    pub fn push_to(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            SqlValue::Int(value) => {
                builder.push_bind(*value);
            }
            SqlValue::Text(value) => {
                builder.push_bind(value.clone());
            }
            SqlValue::Bool(value) => {
                builder.push_bind(*value);
            }
            SqlValue::Timestamp(value) => {
                builder.push_bind(*value);
            }
            SqlValue::Null => {
                builder.push("NULL");
            }
        }
    }
}

/// The closed set of comparison operators a filter key may carry as a
/// `__op` suffix. A bare field name means equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
}

impl CompareOp {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "eq" => Some(CompareOp::Eq),
            "ne" => Some(CompareOp::Ne),
            "gt" => Some(CompareOp::Gt),
            "gte" => Some(CompareOp::Gte),
            "lt" => Some(CompareOp::Lt),
            "lte" => Some(CompareOp::Lte),
            "like" => Some(CompareOp::Like),
            _ => None,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            CompareOp::Eq => " = ",
            CompareOp::Ne => " <> ",
            CompareOp::Gt => " > ",
            CompareOp::Gte => " >= ",
            CompareOp::Lt => " < ",
            CompareOp::Lte => " <= ",
            CompareOp::Like => " LIKE ",
        }
    }
}

/// A change to apply on create/update: registry column name plus typed value.
pub type Change = (&'static str, SqlValue);

#[derive(Debug, Clone)]
struct Predicate {
    column: &'static str,
    op: CompareOp,
    value: SqlValue,
}

/// A conjunction of per-column predicates. An empty map matches all rows.
#[derive(Debug, Clone, Default)]
pub struct FilterMap {
    predicates: Vec<Predicate>,
}

impl FilterMap {
    /// Builds a filter from query-string parameters against an entity's field
    /// registry.
    ///
    /// Keys are processed in sorted order so the rendered SQL is stable.
    /// Reserved pagination keys and unknown field names are skipped silently;
    /// a known field whose value cannot be parsed for its column type is an
    /// error.
    pub fn parse(
        params: &HashMap<String, String>,
        fields: &'static [FieldDef],
    ) -> Result<Self, AppError> {
        let mut filter = FilterMap::default();
        let mut keys: Vec<&String> = params.keys().collect();
        keys.sort();

        for key in keys {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let (name, op) = match key.rsplit_once("__") {
                Some((name, suffix)) => match CompareOp::from_suffix(suffix) {
                    Some(op) => (name, op),
                    // Unknown operator suffix: the whole key cannot name a
                    // column, so it is ignored like an unknown field.
                    None => continue,
                },
                None => (key.as_str(), CompareOp::Eq),
            };
            let field = match fields.iter().find(|field| field.name == name) {
                Some(field) => field,
                None => {
                    log::debug!("ignoring unknown filter field '{}'", key);
                    continue;
                }
            };
            let value = SqlValue::parse(field.kind, key, &params[key])?;
            filter.push(field.name, op, value);
        }
        Ok(filter)
    }

    /// Adds a predicate with a column name known to the caller's registry.
    pub fn push(&mut self, column: &'static str, op: CompareOp, value: SqlValue) {
        self.predicates.push(Predicate { column, op, value });
    }

    /// Convenience constructor for a single equality predicate.
    pub fn eq(column: &'static str, value: SqlValue) -> Self {
        let mut filter = FilterMap::default();
        filter.push(column, CompareOp::Eq, value);
        filter
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Appends `AND column <op> $n` clauses to a builder whose SQL already
    /// ends in a WHERE clause.
    pub fn apply(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        for predicate in &self.predicates {
            builder
                .push(" AND ")
                .push(predicate.column)
                .push(predicate.op.sql());
            predicate.value.push_to(builder);
        }
    }
}

/// An ordering directive: a field name with an optional leading `-` for
/// descending order.
#[derive(Debug, Clone)]
pub struct Ordering {
    raw: String,
    field: String,
    descending: bool,
}

impl Ordering {
    pub fn parse(raw: &str) -> Self {
        let (field, descending) = match raw.strip_prefix('-') {
            Some(field) => (field, true),
            None => (raw, false),
        };
        Self {
            raw: raw.to_string(),
            field: field.to_string(),
            descending,
        }
    }

    /// Resolves the directive against an entity's registry, failing fast on
    /// an unknown field name.
    pub fn resolve(&self, fields: &'static [FieldDef]) -> Result<(&'static str, bool), AppError> {
        fields
            .iter()
            .find(|field| field.name == self.field)
            .map(|field| (field.name, self.descending))
            .ok_or_else(|| AppError::BadRequest(format!("cannot order by '{}'", self.field)))
    }

    /// The directive as supplied, echoed back in search options.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl Default for Ordering {
    fn default() -> Self {
        Ordering::parse(DEFAULT_ORDERING)
    }
}

/// A page size: a positive row count, or every matching row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Limited(i64),
    All,
}

impl PageSize {
    fn parse(raw: &str) -> Result<Self, AppError> {
        if raw == "all" {
            return Ok(PageSize::All);
        }
        match raw.parse::<i64>() {
            Ok(size) if size > 0 => Ok(PageSize::Limited(size)),
            _ => Err(AppError::BadRequest(
                "page_size must be a positive integer or 'all'".into(),
            )),
        }
    }
}

impl serde::Serialize for PageSize {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageSize::Limited(size) => serializer.serialize_i64(*size),
            PageSize::All => serializer.serialize_str("all"),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PageSize::Limited(size) => write!(f, "{}", size),
            PageSize::All => write!(f, "all"),
        }
    }
}

/// Pagination input for a find query: page number, page size and ordering.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: PageSize,
    pub ordering: Ordering,
}

impl PageRequest {
    /// Extracts pagination directives from query-string parameters, applying
    /// the configured defaults for absent keys.
    pub fn from_map(params: &HashMap<String, String>) -> Result<Self, AppError> {
        let page = match params.get("page") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(page) if page >= 1 => page,
                _ => return Err(AppError::BadRequest("page must be a positive integer".into())),
            },
            None => DEFAULT_PAGE,
        };
        let page_size = match params.get("page_size") {
            Some(raw) => PageSize::parse(raw)?,
            None => PageSize::Limited(DEFAULT_PAGE_SIZE),
        };
        let ordering = match params.get("ordering") {
            Some(raw) => Ordering::parse(raw),
            None => Ordering::default(),
        };
        Ok(Self {
            page,
            page_size,
            ordering,
        })
    }

    /// The `(limit, offset)` window for this page, or `None` when every
    /// matching row is requested. A page number whose offset does not fit in
    /// `i64` is rejected rather than overflowing into a negative bind.
    pub fn window(&self) -> Result<Option<(i64, i64)>, AppError> {
        match self.page_size {
            PageSize::All => Ok(None),
            PageSize::Limited(size) => self
                .page
                .checked_sub(1)
                .and_then(|page| page.checked_mul(size))
                .map(|offset| Some((size, offset)))
                .ok_or_else(|| AppError::BadRequest("page is out of range".into())),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: PageSize::Limited(DEFAULT_PAGE_SIZE),
            ordering: Ordering::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIELDS: &[FieldDef] = &[
        FieldDef::new("id", FieldKind::Int),
        FieldDef::new("titulo", FieldKind::Text),
        FieldDef::new("estado", FieldKind::Text),
        FieldDef::new("fecha_creacion", FieldKind::Timestamp),
        FieldDef::new("id_usuario", FieldKind::Int),
    ];

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn rendered(filter: &FilterMap) -> String {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM tasks WHERE TRUE");
        filter.apply(&mut builder);
        builder.sql().to_string()
    }

    #[test]
    fn test_bare_key_is_equality() {
        let filter = FilterMap::parse(&params(&[("estado", "pendiente")]), FIELDS).unwrap();
        assert_eq!(
            rendered(&filter),
            "SELECT * FROM tasks WHERE TRUE AND estado = $1"
        );
    }

    #[test]
    fn test_operator_suffixes() {
        let filter = FilterMap::parse(
            &params(&[("id__gte", "10"), ("titulo__like", "%informe%")]),
            FIELDS,
        )
        .unwrap();
        // Keys are sorted, so id__gte renders before titulo__like.
        assert_eq!(
            rendered(&filter),
            "SELECT * FROM tasks WHERE TRUE AND id >= $1 AND titulo LIKE $2"
        );
    }

    #[test_log::test]
    fn test_unknown_fields_and_suffixes_are_ignored() {
        let filter = FilterMap::parse(
            &params(&[
                ("color", "azul"),
                ("estado__between", "a"),
                ("estado", "pendiente"),
            ]),
            FIELDS,
        )
        .unwrap();
        assert_eq!(
            rendered(&filter),
            "SELECT * FROM tasks WHERE TRUE AND estado = $1"
        );
    }

    #[test]
    fn test_reserved_keys_are_not_filters() {
        let filter = FilterMap::parse(
            &params(&[("page", "3"), ("page_size", "5"), ("ordering", "-id")]),
            FIELDS,
        )
        .unwrap();
        assert!(filter.is_empty());
        assert_eq!(rendered(&filter), "SELECT * FROM tasks WHERE TRUE");
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = FilterMap::parse(&HashMap::new(), FIELDS).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_bad_typed_value_is_rejected() {
        let result = FilterMap::parse(&params(&[("id_usuario", "abc")]), FIELDS);
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result = FilterMap::parse(&params(&[("fecha_creacion__gte", "yesterday")]), FIELDS);
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_timestamp_value_parses() {
        let filter = FilterMap::parse(
            &params(&[("fecha_creacion__lt", "2025-09-04T12:00:00Z")]),
            FIELDS,
        )
        .unwrap();
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_ordering_parse_and_resolve() {
        let ordering = Ordering::parse("-fecha_creacion");
        let (column, descending) = ordering.resolve(FIELDS).unwrap();
        assert_eq!(column, "fecha_creacion");
        assert!(descending);
        assert_eq!(ordering.raw(), "-fecha_creacion");

        let ordering = Ordering::parse("titulo");
        let (column, descending) = ordering.resolve(FIELDS).unwrap();
        assert_eq!(column, "titulo");
        assert!(!descending);
    }

    #[test]
    fn test_ordering_unknown_field_fails_fast() {
        let ordering = Ordering::parse("-no_such_column");
        assert!(matches!(
            ordering.resolve(FIELDS),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_page_request_defaults() {
        let request = PageRequest::from_map(&HashMap::new()).unwrap();
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, PageSize::Limited(20));
        assert_eq!(request.ordering.raw(), "-id");
    }

    #[test]
    fn test_page_request_explicit_values() {
        let request = PageRequest::from_map(&params(&[
            ("page", "3"),
            ("page_size", "all"),
            ("ordering", "titulo"),
        ]))
        .unwrap();
        assert_eq!(request.page, 3);
        assert_eq!(request.page_size, PageSize::All);
        assert_eq!(request.ordering.raw(), "titulo");
    }

    #[test]
    fn test_page_request_rejects_bad_values() {
        assert!(PageRequest::from_map(&params(&[("page", "0")])).is_err());
        assert!(PageRequest::from_map(&params(&[("page", "x")])).is_err());
        assert!(PageRequest::from_map(&params(&[("page_size", "-5")])).is_err());
        assert!(PageRequest::from_map(&params(&[("page_size", "some")])).is_err());
    }

    #[test]
    fn test_page_request_window() {
        let request = PageRequest::from_map(&params(&[("page", "3"), ("page_size", "10")])).unwrap();
        assert_eq!(request.window().unwrap(), Some((10, 20)));

        let request = PageRequest::from_map(&params(&[("page_size", "all")])).unwrap();
        assert_eq!(request.window().unwrap(), None);
    }

    #[test]
    fn test_page_request_window_rejects_huge_page_numbers() {
        let request = PageRequest::from_map(&params(&[
            ("page", "9223372036854775807"),
            ("page_size", "2"),
        ]))
        .unwrap();
        assert!(matches!(
            request.window(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_page_size_serializes_as_number_or_literal() {
        assert_eq!(serde_json::to_string(&PageSize::Limited(20)).unwrap(), "20");
        assert_eq!(serde_json::to_string(&PageSize::All).unwrap(), "\"all\"");
    }
}
