//! SQL generation for collection listings.
//!
//! A [`ListingQuery`] is turned into two statements against the resource
//! table (aliased `t`):
//!
//! ```sql
//! SELECT COUNT(*) FROM bootcamps t WHERE <filters>;
//! SELECT jsonb_build_object('id', t.id, ...) || jsonb_build_object('courses', (...))
//!   FROM bootcamps t WHERE <filters> ORDER BY <sort>, t.id LIMIT $n OFFSET $m;
//! ```
//!
//! Column names only ever come from the static [`ResourceSchema`]; every
//! client-supplied value is bound as a parameter.

use devcamper_core::AppError;
use devcamper_core::listing::{
    Field, FieldKind, Filter, FilterValue, ListingQuery, ListingResponse, Operator, ResourceSchema,
    SortKey,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

/// Runs a listing query and wraps the page in the listing envelope.
#[instrument(skip(db, schema, query), fields(table = schema.table))]
pub async fn fetch_listing(
    db: &PgPool,
    schema: &ResourceSchema,
    query: &ListingQuery,
) -> Result<ListingResponse, AppError> {
    let total: i64 = build_count(schema, &query.filters)
        .build_query_scalar()
        .fetch_one(db)
        .await?;

    let data: Vec<serde_json::Value> = build_page(schema, query)
        .build_query_scalar()
        .fetch_all(db)
        .await?;

    Ok(ListingResponse::new(data, query.pagination(total)))
}

/// Loads a single row rendered the same way as a listed document, relations
/// included.
#[instrument(skip(db, schema), fields(table = schema.table))]
pub async fn fetch_document(
    db: &PgPool,
    schema: &ResourceSchema,
    id: Uuid,
) -> Result<Option<serde_json::Value>, AppError> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
    push_document(&mut builder, schema, None);
    builder.push(format_args!(" FROM {} t WHERE t.id = ", schema.table));
    builder.push_bind(id);

    let document = builder.build_query_scalar().fetch_optional(db).await?;
    Ok(document)
}

fn build_count<'a>(schema: &ResourceSchema, filters: &'a [Filter]) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {} t", schema.table));
    push_filters(&mut builder, filters);
    builder
}

fn build_page<'a>(schema: &ResourceSchema, query: &'a ListingQuery) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("SELECT ");
    push_document(&mut builder, schema, query.select.as_deref());
    builder.push(format_args!(" FROM {} t", schema.table));
    push_filters(&mut builder, &query.filters);
    push_sort(&mut builder, &query.sort);
    builder.push(" LIMIT ");
    builder.push_bind(query.limit);
    builder.push(" OFFSET ");
    builder.push_bind(query.offset());
    builder
}

/// Pushes the `jsonb` expression building one result document.
fn push_document(
    builder: &mut QueryBuilder<'_, Postgres>,
    schema: &ResourceSchema,
    select: Option<&[&'static str]>,
) {
    let columns: Vec<&str> = match select {
        Some(names) => names.to_vec(),
        None => schema.fields.iter().map(|f| f.name).collect(),
    };

    let pairs = columns
        .iter()
        .map(|name| format!("'{0}', t.{0}", name))
        .collect::<Vec<_>>()
        .join(", ");
    builder.push(format_args!("jsonb_build_object({})", pairs));

    for relation in schema.relations {
        builder.push(format_args!(
            " || jsonb_build_object('{}', {})",
            relation.name, relation.sql
        ));
    }
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filters: &'a [Filter]) {
    for (i, filter) in filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        push_condition(builder, filter);
    }
}

fn column(field: &Field) -> String {
    match field.kind {
        // enum columns compare against their labels
        FieldKind::Enum(_) => format!("t.{}::text", field.name),
        _ => format!("t.{}", field.name),
    }
}

fn push_condition<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a Filter) {
    let column = column(&filter.field);

    match (filter.field.kind, filter.op) {
        (FieldKind::TextArray, Operator::In) => {
            builder.push(format_args!("{} && ", column));
            push_value(builder, &filter.value);
        }
        (FieldKind::TextArray, Operator::Ne) => {
            builder.push("NOT (");
            push_value(builder, &filter.value);
            builder.push(format_args!(" = ANY({}))", column));
        }
        (FieldKind::TextArray, _) => {
            push_value(builder, &filter.value);
            builder.push(format_args!(" = ANY({})", column));
        }
        (_, Operator::In) => {
            builder.push(format_args!("{} = ANY(", column));
            push_value(builder, &filter.value);
            builder.push(")");
        }
        (_, op) => {
            builder.push(format_args!("{} {} ", column, op.sql()));
            push_value(builder, &filter.value);
        }
    }
}

fn push_value<'a>(builder: &mut QueryBuilder<'a, Postgres>, value: &'a FilterValue) {
    match value {
        FilterValue::Text(v) => builder.push_bind(v.as_str()),
        FilterValue::Integer(v) => builder.push_bind(*v),
        FilterValue::Float(v) => builder.push_bind(*v),
        FilterValue::Boolean(v) => builder.push_bind(*v),
        FilterValue::Uuid(v) => builder.push_bind(*v),
        FilterValue::Timestamp(v) => builder.push_bind(*v),
        FilterValue::TextList(v) => builder.push_bind(v.as_slice()),
        FilterValue::IntegerList(v) => builder.push_bind(v.as_slice()),
        FilterValue::FloatList(v) => builder.push_bind(v.as_slice()),
        FilterValue::UuidList(v) => builder.push_bind(v.as_slice()),
    };
}

fn push_sort(builder: &mut QueryBuilder<'_, Postgres>, sort: &[SortKey]) {
    let mut keys: Vec<String> = sort
        .iter()
        .map(|key| {
            format!(
                "t.{} {}",
                key.field,
                if key.descending { "DESC" } else { "ASC" }
            )
        })
        .collect();
    // stable pagination when sort values tie
    if !sort.iter().any(|key| key.field == "id") {
        keys.push("t.id ASC".to_string());
    }
    builder.push(format_args!(" ORDER BY {}", keys.join(", ")));
}
