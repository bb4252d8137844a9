//! Translation of collection query strings into typed listing queries.
//!
//! Every collection endpoint accepts the same query vocabulary:
//!
//! - `select=name,description` restricts the returned fields (`id` is always
//!   returned)
//! - `sort=-average_cost,name` orders the results, a leading `-` meaning
//!   descending (default: `-created_at`)
//! - `page` / `limit` paginate (see [`crate::pagination`])
//! - any other parameter is a filter on a declared field of the resource:
//!   `field=value` for equality or `field[op]=value` with `op` one of `gt`,
//!   `gte`, `lt`, `lte`, `ne` and `in` (comma-separated list)
//!
//! Raw values are coerced to the declared [`FieldKind`] here, so the store
//! layer only ever binds typed values against known column names.
//!
//! ```ignore
//! let params = vec![
//!     ("average_cost[lte]".to_string(), "10000".to_string()),
//!     ("careers[in]".to_string(), "Business,UI/UX".to_string()),
//!     ("sort".to_string(), "-average_cost".to_string()),
//! ];
//! let query = ListingQuery::parse(&BOOTCAMP_SCHEMA, &params)?;
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;
use crate::pagination::{Pagination, parse_limit, parse_page};

pub const RESERVED_PARAMS: [&str; 4] = ["select", "sort", "page", "limit"];
pub const DEFAULT_SORT_FIELD: &str = "created_at";

/// Storage type of a filterable field; drives value coercion and which
/// operators apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
    Uuid,
    Timestamp,
    /// Text restricted to a fixed set of values (stored as a Postgres enum).
    Enum(&'static [&'static str]),
    /// Array of text; equality means "contains", `in` means "overlaps".
    TextArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// A related document embedded into every listed row.
///
/// `sql` is a scalar sub-select yielding `jsonb`; it may refer to the listed
/// row through the alias `t`.
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    pub name: &'static str,
    pub sql: &'static str,
}

/// Describes a listable collection: its table, the fields clients may
/// filter, sort and select on, and the relations populated into each row.
#[derive(Debug)]
pub struct ResourceSchema {
    pub table: &'static str,
    pub fields: &'static [Field],
    pub relations: &'static [Relation],
}

impl ResourceSchema {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl Operator {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
        }
    }

    /// SQL comparison operator for scalar comparisons.
    pub fn sql(self) -> &'static str {
        match self {
            Self::Eq | Self::In => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }

    fn is_ordering(self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }

    fn supported_on(self, kind: FieldKind) -> bool {
        match self {
            Self::Eq | Self::Ne => true,
            Self::In => !matches!(kind, FieldKind::Boolean | FieldKind::Timestamp),
            _ => matches!(
                kind,
                FieldKind::Text | FieldKind::Integer | FieldKind::Float | FieldKind::Timestamp
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    TextList(Vec<String>),
    IntegerList(Vec<i64>),
    FloatList(Vec<f64>),
    UuidList(Vec<Uuid>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: Field,
    pub op: Operator,
    pub value: FilterValue,
}

impl Filter {
    /// Equality filter used by nested routes to scope a listing to a parent.
    pub fn scope(field: &'static str, id: Uuid) -> Self {
        Self {
            field: Field::new(field, FieldKind::Uuid),
            op: Operator::Eq,
            value: FilterValue::Uuid(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: &'static str,
    pub descending: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),
    #[error("Unknown operator '{operator}' on field '{field}'")]
    UnknownOperator { field: String, operator: String },
    #[error("Operator '{operator}' is not supported on field '{field}'")]
    UnsupportedOperator { field: String, operator: String },
    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidValue { field: String, value: String },
    #[error("Malformed query parameter '{0}'")]
    MalformedParameter(String),
}

impl From<ListingError> for AppError {
    fn from(err: ListingError) -> Self {
        AppError::bad_request(err)
    }
}

/// A fully validated listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub filters: Vec<Filter>,
    /// Selected field names, `id` first; `None` selects every field.
    pub select: Option<Vec<&'static str>>,
    pub sort: Vec<SortKey>,
    pub page: i64,
    pub limit: i64,
}

impl ListingQuery {
    pub fn parse(
        schema: &ResourceSchema,
        params: &[(String, String)],
    ) -> Result<Self, ListingError> {
        let mut filters = Vec::new();
        let mut select = None;
        let mut sort = None;
        let mut page = None;
        let mut limit = None;

        for (key, value) in params {
            match key.as_str() {
                "select" => select = Some(parse_select(schema, value)?),
                "sort" => sort = Some(parse_sort(schema, value)?),
                "page" => page = Some(value.as_str()),
                "limit" => limit = Some(value.as_str()),
                _ => filters.push(parse_filter(schema, key, value)?),
            }
        }

        let sort = match sort {
            Some(keys) if !keys.is_empty() => keys,
            _ => vec![SortKey {
                field: DEFAULT_SORT_FIELD,
                descending: true,
            }],
        };

        Ok(Self {
            filters,
            select,
            sort,
            page: parse_page(page),
            limit: parse_limit(limit),
        })
    }

    /// Adds fixed filters ahead of the client-supplied ones.
    #[must_use]
    pub fn scoped(mut self, scope: Vec<Filter>) -> Self {
        let mut filters = scope;
        filters.append(&mut self.filters);
        self.filters = filters;
        self
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    pub fn pagination(&self, total: i64) -> Pagination {
        Pagination::new(self.page, self.limit, total)
    }
}

/// Envelope returned verbatim by listing handlers.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListingResponse {
    pub success: bool,
    pub count: usize,
    pub pagination: Pagination,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<serde_json::Value>,
}

impl ListingResponse {
    pub fn new(data: Vec<serde_json::Value>, pagination: Pagination) -> Self {
        Self {
            success: true,
            count: data.len(),
            pagination,
            data,
        }
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_select(
    schema: &ResourceSchema,
    raw: &str,
) -> Result<Vec<&'static str>, ListingError> {
    let mut selected = vec!["id"];
    for name in split_list(raw) {
        if schema.relation(name).is_some() {
            continue;
        }
        let field = schema
            .field(name)
            .ok_or_else(|| ListingError::UnknownField(name.to_string()))?;
        if !selected.contains(&field.name) {
            selected.push(field.name);
        }
    }
    Ok(selected)
}

fn parse_sort(schema: &ResourceSchema, raw: &str) -> Result<Vec<SortKey>, ListingError> {
    split_list(raw)
        .map(|token| {
            let (name, descending) = match token.strip_prefix('-') {
                Some(rest) => (rest, true),
                None => (token.strip_prefix('+').unwrap_or(token), false),
            };
            let field = schema
                .field(name)
                .ok_or_else(|| ListingError::UnknownField(name.to_string()))?;
            if field.kind == FieldKind::TextArray {
                return Err(ListingError::UnsupportedOperator {
                    field: name.to_string(),
                    operator: "sort".to_string(),
                });
            }
            Ok(SortKey {
                field: field.name,
                descending,
            })
        })
        .collect()
}

/// Splits `field[op]` into its parts; a bare key is an equality filter.
fn split_key(key: &str) -> Result<(&str, Option<&str>), ListingError> {
    match key.find('[') {
        None => Ok((key, None)),
        Some(open) => {
            let rest = &key[open + 1..];
            let operator = rest
                .strip_suffix(']')
                .filter(|op| !op.is_empty() && !op.contains(['[', ']']))
                .ok_or_else(|| ListingError::MalformedParameter(key.to_string()))?;
            Ok((&key[..open], Some(operator)))
        }
    }
}

fn parse_filter(
    schema: &ResourceSchema,
    key: &str,
    raw: &str,
) -> Result<Filter, ListingError> {
    let (name, operator) = split_key(key)?;
    let field = *schema
        .field(name)
        .ok_or_else(|| ListingError::UnknownField(name.to_string()))?;

    let op = match operator {
        None => Operator::Eq,
        Some(op) => Operator::parse(op).ok_or_else(|| ListingError::UnknownOperator {
            field: name.to_string(),
            operator: op.to_string(),
        })?,
    };

    if !op.supported_on(field.kind) {
        return Err(ListingError::UnsupportedOperator {
            field: name.to_string(),
            operator: op.as_str().to_string(),
        });
    }

    let value = if op == Operator::In {
        coerce_list(&field, raw)?
    } else {
        coerce_scalar(&field, raw)?
    };

    debug_assert!(!op.is_ordering() || !matches!(value, FilterValue::TextList(_)));

    Ok(Filter { field, op, value })
}

fn invalid(field: &Field, raw: &str) -> ListingError {
    ListingError::InvalidValue {
        field: field.name.to_string(),
        value: raw.to_string(),
    }
}

fn coerce_scalar(field: &Field, raw: &str) -> Result<FilterValue, ListingError> {
    let trimmed = raw.trim();
    match field.kind {
        FieldKind::Text | FieldKind::TextArray => Ok(FilterValue::Text(raw.to_string())),
        FieldKind::Enum(allowed) => {
            if allowed.contains(&trimmed) {
                Ok(FilterValue::Text(trimmed.to_string()))
            } else {
                Err(invalid(field, raw))
            }
        }
        FieldKind::Integer => trimmed
            .parse::<i64>()
            .map(FilterValue::Integer)
            .map_err(|_| invalid(field, raw)),
        FieldKind::Float => trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(FilterValue::Float)
            .ok_or_else(|| invalid(field, raw)),
        FieldKind::Boolean => match trimmed {
            "true" | "1" => Ok(FilterValue::Boolean(true)),
            "false" | "0" => Ok(FilterValue::Boolean(false)),
            _ => Err(invalid(field, raw)),
        },
        FieldKind::Uuid => Uuid::parse_str(trimmed)
            .map(FilterValue::Uuid)
            .map_err(|_| invalid(field, raw)),
        FieldKind::Timestamp => parse_timestamp(trimmed)
            .map(FilterValue::Timestamp)
            .ok_or_else(|| invalid(field, raw)),
    }
}

fn coerce_list(field: &Field, raw: &str) -> Result<FilterValue, ListingError> {
    let items: Vec<&str> = split_list(raw).collect();
    if items.is_empty() {
        return Err(invalid(field, raw));
    }

    let scalars = items
        .iter()
        .map(|item| coerce_scalar(field, item))
        .collect::<Result<Vec<_>, _>>()?;

    let value = match field.kind {
        FieldKind::Integer => FilterValue::IntegerList(
            scalars
                .into_iter()
                .filter_map(|v| match v {
                    FilterValue::Integer(i) => Some(i),
                    _ => None,
                })
                .collect(),
        ),
        FieldKind::Float => FilterValue::FloatList(
            scalars
                .into_iter()
                .filter_map(|v| match v {
                    FilterValue::Float(f) => Some(f),
                    _ => None,
                })
                .collect(),
        ),
        FieldKind::Uuid => FilterValue::UuidList(
            scalars
                .into_iter()
                .filter_map(|v| match v {
                    FilterValue::Uuid(u) => Some(u),
                    _ => None,
                })
                .collect(),
        ),
        _ => FilterValue::TextList(
            scalars
                .into_iter()
                .filter_map(|v| match v {
                    FilterValue::Text(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
    };
    Ok(value)
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
