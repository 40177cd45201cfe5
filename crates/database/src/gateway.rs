//! Generic CRUD over the entity catalog.
//!
//! Every operation takes the resolved [`Principal`]; there is no anonymous
//! path. Ownership is injected on create when the caller omits the owner
//! field. Update and delete apply exactly the filters given: an empty
//! filter set addresses the whole table, across all principals.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::catalog::{self, EntitySchema, FieldKind};
use crate::error::{DatabaseError, Result};
use crate::models::Principal;
use crate::query::{self, column_list, ident, OrderSpec, RangeSpec, StoreValue};
use crate::time::{now_iso, render_timestamp};

/// Equality filters as `(field, value)` pairs, AND-combined.
pub type Filters = [(String, Value)];

/// Parameters of a list request.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub filters: Vec<(String, Value)>,
    pub order: Option<OrderSpec>,
    pub range: Option<RangeSpec>,
}

/// Body of a create request: one item or a batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Submission {
    One(Map<String, Value>),
    Many(Vec<Map<String, Value>>),
}

impl Submission {
    fn into_items(self) -> Vec<Map<String, Value>> {
        match self {
            Submission::One(item) => vec![item],
            Submission::Many(items) => items,
        }
    }
}

/// Result of a create: a single entity when one item was submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Created {
    One(Value),
    Many(Vec<Value>),
}

impl Created {
    /// Created entities in input order.
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            Created::One(entity) => vec![entity],
            Created::Many(entities) => entities,
        }
    }
}

fn schema_for(table: &str) -> Result<&'static EntitySchema> {
    catalog::resolve(table).ok_or_else(|| DatabaseError::UnknownResource(table.to_string()))
}

/// List entities of `table` matching `params`.
pub async fn list(
    pool: &SqlitePool,
    principal: &Principal,
    table: &str,
    params: &ListParams,
) -> Result<Vec<Value>> {
    let schema = schema_for(table)?;
    let query = query::translate(
        schema,
        &params.filters,
        params.order.as_ref(),
        params.range,
    );

    debug!(user_id = %principal.id, table, page = ?query.page, "Listing entities");

    let rows = query.select().build().fetch_all(pool).await?;
    rows.iter().map(|row| row_to_json(schema, row)).collect()
}

/// Create one or many entities of `table` in a single transaction.
pub async fn create(
    pool: &SqlitePool,
    principal: &Principal,
    table: &str,
    submission: Submission,
) -> Result<Created> {
    let schema = schema_for(table)?;
    let items = submission.into_items();
    if items.is_empty() {
        return Err(DatabaseError::Validation("no items to create".to_string()));
    }

    let mut tx = pool.begin().await?;
    let mut created = Vec::with_capacity(items.len());
    for item in &items {
        created.push(insert_item(&mut tx, schema, principal, item).await?);
    }
    tx.commit().await?;

    debug!(user_id = %principal.id, table, count = created.len(), "Created entities");

    if created.len() == 1 {
        Ok(Created::One(created.remove(0)))
    } else {
        Ok(Created::Many(created))
    }
}

/// Apply `patch` to every row of `table` matching `filters`.
///
/// Returns the number of matching rows. Patch keys outside the schema are
/// ignored.
pub async fn update(
    pool: &SqlitePool,
    principal: &Principal,
    table: &str,
    filters: &Filters,
    patch: &Map<String, Value>,
) -> Result<u64> {
    let schema = schema_for(table)?;
    let query = query::translate(schema, filters, None, None);

    let mut assignments = Vec::new();
    for (key, value) in patch {
        let Some(field) = schema.field(key) else {
            continue;
        };
        let bound = StoreValue::coerce(field.kind, value)
            .ok_or_else(|| invalid_value(schema, field.name))?;
        assignments.push((field.name, bound));
    }

    let mut tx = pool.begin().await?;
    let affected = if assignments.is_empty() {
        let count: i64 = query.count().build_query_scalar().fetch_one(&mut *tx).await?;
        count as u64
    } else {
        if schema.tracks_updates() && !patch.contains_key("updated_at") {
            assignments.push(("updated_at", StoreValue::Text(now_iso())));
        }
        query
            .update(&assignments)
            .build()
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_statement)?
            .rows_affected()
    };
    tx.commit().await?;

    debug!(user_id = %principal.id, table, affected, "Updated entities");
    Ok(affected)
}

/// Delete every row of `table` matching `filters`. Returns the count.
pub async fn delete(
    pool: &SqlitePool,
    principal: &Principal,
    table: &str,
    filters: &Filters,
) -> Result<u64> {
    let schema = schema_for(table)?;
    let query = query::translate(schema, filters, None, None);

    let mut tx = pool.begin().await?;
    let deleted = query
        .delete()
        .build()
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from_statement)?
        .rows_affected();
    tx.commit().await?;

    debug!(user_id = %principal.id, table, deleted, "Deleted entities");
    Ok(deleted)
}

fn invalid_value(schema: &EntitySchema, field: &str) -> DatabaseError {
    DatabaseError::Validation(format!("invalid value for {}.{}", schema.table, field))
}

async fn insert_item(
    conn: &mut SqliteConnection,
    schema: &'static EntitySchema,
    principal: &Principal,
    item: &Map<String, Value>,
) -> Result<Value> {
    let mut columns: Vec<(&'static str, StoreValue)> = Vec::with_capacity(item.len() + 2);
    for (key, value) in item {
        let field = schema.field(key).ok_or_else(|| {
            DatabaseError::Validation(format!("unknown field {}.{}", schema.table, key))
        })?;
        let bound =
            StoreValue::coerce(field.kind, value).ok_or_else(|| invalid_value(schema, field.name))?;
        columns.push((field.name, bound));
    }

    if let Some(owner) = schema.owner_field {
        if !item.contains_key(owner) {
            columns.push((owner, StoreValue::Text(principal.id.clone())));
        }
    }
    if let Some(id) = schema.generated_id {
        if !item.contains_key(id) {
            columns.push((id, StoreValue::Text(Uuid::new_v4().to_string())));
        }
    }

    let mut builder: QueryBuilder<'static, Sqlite> =
        QueryBuilder::new(format!("INSERT INTO {}", ident(schema.table)));
    if columns.is_empty() {
        builder.push(" DEFAULT VALUES");
    } else {
        let names = columns
            .iter()
            .map(|(name, _)| ident(name))
            .collect::<Vec<_>>()
            .join(", ");
        builder.push(format!(" ({}) VALUES (", names));
        for (i, (_, value)) in columns.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            value.push_bind(&mut builder);
        }
        builder.push(")");
    }
    builder.push(format!(" RETURNING {}", column_list(schema)));

    let row = builder
        .build()
        .fetch_one(&mut *conn)
        .await
        .map_err(DatabaseError::from_statement)?;
    row_to_json(schema, &row)
}

/// Decode a row into its API shape: timestamps as ISO-8601, opaque JSON
/// as nested values.
pub(crate) fn row_to_json(schema: &EntitySchema, row: &SqliteRow) -> Result<Value> {
    let mut out = Map::with_capacity(schema.fields.len());
    for field in schema.fields {
        let value = match field.kind {
            FieldKind::Text | FieldKind::Date => row
                .try_get::<Option<String>, _>(field.name)?
                .map(Value::String),
            FieldKind::Integer => row.try_get::<Option<i64>, _>(field.name)?.map(Value::from),
            FieldKind::Boolean => row.try_get::<Option<bool>, _>(field.name)?.map(Value::Bool),
            FieldKind::Timestamp => row
                .try_get::<Option<String>, _>(field.name)?
                .map(|raw| Value::String(render_timestamp(&raw))),
            FieldKind::Json => row
                .try_get::<Option<String>, _>(field.name)?
                .map(decode_json),
        };
        out.insert(field.name.to_string(), value.unwrap_or(Value::Null));
    }
    Ok(Value::Object(out))
}

fn decode_json(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_db, test_user};
    use serde_json::json;

    fn item(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn eq(field: &str, value: &str) -> (String, Value) {
        (field.to_string(), json!(value))
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let db = test_db().await;
        let alice = test_user(&db, "alice@example.com").await;

        let result = list(db.pool(), &alice, "users", &ListParams::default()).await;
        assert!(matches!(result, Err(DatabaseError::UnknownResource(t)) if t == "users"));

        let result = delete(db.pool(), &alice, "sessions", &[]).await;
        assert!(matches!(result, Err(DatabaseError::UnknownResource(_))));
    }

    #[tokio::test]
    async fn test_create_injects_owner_for_every_item() {
        let db = test_db().await;
        let alice = test_user(&db, "alice@example.com").await;

        let created = create(
            db.pool(),
            &alice,
            "chats",
            Submission::Many(vec![
                item(json!({"title": "one"})),
                item(json!({"title": "two"})),
                item(json!({"title": "three"})),
            ]),
        )
        .await
        .unwrap();

        let entities = match created {
            Created::Many(entities) => entities,
            other => panic!("expected a batch, got {:?}", other),
        };
        let titles: Vec<_> = entities.iter().map(|e| e["title"].clone()).collect();
        assert_eq!(titles, vec![json!("one"), json!("two"), json!("three")]);
        for entity in &entities {
            assert_eq!(entity["user_id"], json!(alice.id));
            assert!(entity["id"].as_str().is_some_and(|id| !id.is_empty()));
        }
    }

    #[tokio::test]
    async fn test_create_single_returns_object() {
        let db = test_db().await;
        let alice = test_user(&db, "alice@example.com").await;

        let created = create(db.pool(), &alice, "chats", Submission::One(Map::new()))
            .await
            .unwrap();
        let Created::One(chat) = created else {
            panic!("expected a single entity");
        };
        assert_eq!(chat["title"], json!("New Chat"));
        assert!(chat["created_at"].as_str().unwrap().contains('T'));
    }

    #[tokio::test]
    async fn test_explicit_owner_is_not_overridden() {
        let db = test_db().await;
        let alice = test_user(&db, "alice@example.com").await;
        let bob = test_user(&db, "bob@example.com").await;

        let created = create(
            db.pool(),
            &alice,
            "notifications",
            Submission::One(item(json!({"user_id": bob.id, "title": "hi"}))),
        )
        .await
        .unwrap();
        let Created::One(notification) = created else {
            panic!("expected a single entity");
        };
        assert_eq!(notification["user_id"], json!(bob.id));
    }

    #[tokio::test]
    async fn test_json_fields_round_trip_as_nested_values() {
        let db = test_db().await;
        let alice = test_user(&db, "alice@example.com").await;

        let payload = json!({"total": 42, "lines": [{"sku": "a"}]});
        create(
            db.pool(),
            &alice,
            "ocr_bill_extractions",
            Submission::One(item(json!({"filename": "bill.png", "data": payload}))),
        )
        .await
        .unwrap();

        let rows = list(db.pool(), &alice, "ocr_bill_extractions", &ListParams::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["data"], payload);
        assert_eq!(rows[0]["approved"], json!(false));
    }

    #[tokio::test]
    async fn test_list_filters_order_and_range() {
        let db = test_db().await;
        let alice = test_user(&db, "alice@example.com").await;

        let items = (0..6)
            .map(|i| item(json!({"title": format!("chat {}", i)})))
            .collect();
        create(db.pool(), &alice, "chats", Submission::Many(items))
            .await
            .unwrap();

        let params = ListParams {
            filters: vec![eq("user_id", &alice.id), eq("bogus", "ignored")],
            order: OrderSpec::parse("title.desc"),
            range: Some(RangeSpec {
                from: Some(1),
                to: Some(2),
            }),
        };
        let rows = list(db.pool(), &alice, "chats", &params).await.unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r["title"].clone()).collect();
        assert_eq!(titles, vec![json!("chat 4"), json!("chat 3")]);

        let inverted = ListParams {
            range: Some(RangeSpec {
                from: Some(5),
                to: Some(3),
            }),
            ..ListParams::default()
        };
        assert_eq!(list(db.pool(), &alice, "chats", &inverted).await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_unscoped_update_touches_every_principal() {
        let db = test_db().await;
        let alice = test_user(&db, "alice@example.com").await;
        let bob = test_user(&db, "bob@example.com").await;

        for (who, count) in [(&alice, 2), (&bob, 3)] {
            let items = (0..count).map(|i| item(json!({"title": format!("n{}", i)}))).collect();
            create(db.pool(), who, "notifications", Submission::Many(items))
                .await
                .unwrap();
        }

        let updated = update(
            db.pool(),
            &alice,
            "notifications",
            &[],
            &item(json!({"read": true})),
        )
        .await
        .unwrap();
        assert_eq!(updated, 5);

        let unread = ListParams {
            filters: vec![("read".to_string(), json!("false"))],
            ..ListParams::default()
        };
        assert!(list(db.pool(), &bob, "notifications", &unread).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_serializes_json_and_ignores_unknown_keys() {
        let db = test_db().await;
        let alice = test_user(&db, "alice@example.com").await;

        let Created::One(chat) = create(db.pool(), &alice, "chats", Submission::One(Map::new()))
            .await
            .unwrap()
        else {
            panic!("expected a single entity");
        };
        let chat_id = chat["id"].as_str().unwrap().to_string();
        create(
            db.pool(),
            &alice,
            "messages",
            Submission::One(item(json!({
                "chat_id": chat_id,
                "role": "user",
                "content": {"text": "draft", "version": "V1", "meta": {}}
            }))),
        )
        .await
        .unwrap();

        let updated = update(
            db.pool(),
            &alice,
            "messages",
            &[eq("chat_id", &chat_id)],
            &item(json!({"content": {"text": "final"}, "nonsense": 1})),
        )
        .await
        .unwrap();
        assert_eq!(updated, 1);

        let rows = list(db.pool(), &alice, "messages", &ListParams::default())
            .await
            .unwrap();
        assert_eq!(rows[0]["content"], json!({"text": "final"}));

        let only_unknown = update(
            db.pool(),
            &alice,
            "messages",
            &[eq("chat_id", &chat_id)],
            &item(json!({"nonsense": 1})),
        )
        .await
        .unwrap();
        assert_eq!(only_unknown, 1);
    }

    #[tokio::test]
    async fn test_delete_returns_count() {
        let db = test_db().await;
        let alice = test_user(&db, "alice@example.com").await;

        let items = (0..3).map(|i| item(json!({"subject": format!("s{}", i), "message": "m"}))).collect();
        create(db.pool(), &alice, "help_requests", Submission::Many(items))
            .await
            .unwrap();

        let deleted = delete(db.pool(), &alice, "help_requests", &[eq("subject", "s1")])
            .await
            .unwrap();
        assert_eq!(deleted, 1);

        let deleted = delete(db.pool(), &alice, "help_requests", &[]).await.unwrap();
        assert_eq!(deleted, 2);
    }

    #[tokio::test]
    async fn test_failed_item_rolls_back_batch() {
        let db = test_db().await;
        let alice = test_user(&db, "alice@example.com").await;

        let result = create(
            db.pool(),
            &alice,
            "help_requests",
            Submission::Many(vec![
                item(json!({"subject": "ok", "message": "fine"})),
                item(json!({"subject": "missing message"})),
            ]),
        )
        .await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));

        let rows = list(db.pool(), &alice, "help_requests", &ListParams::default())
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_dates_are_rejected() {
        let db = test_db().await;
        let alice = test_user(&db, "alice@example.com").await;
        let today = chrono::NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        crate::credits::ensure(&mut conn, &alice.id, today).await.unwrap();
        drop(conn);

        let result = update(
            db.pool(),
            &alice,
            "user_credits",
            &[],
            &item(json!({"last_reset_month": "soon"})),
        )
        .await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));

        let mut conn = db.pool().acquire().await.unwrap();
        let entry = crate::credits::get(&mut conn, &alice.id).await.unwrap();
        assert_eq!(entry.last_reset_month, chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        drop(conn);

        create(
            db.pool(),
            &alice,
            "notifications",
            Submission::One(item(json!({"title": "hello"}))),
        )
        .await
        .unwrap();
        let result = update(
            db.pool(),
            &alice,
            "notifications",
            &[],
            &item(json!({"read_at": "whenever"})),
        )
        .await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));

        let updated = update(
            db.pool(),
            &alice,
            "notifications",
            &[],
            &item(json!({"read": true, "read_at": "2025-03-17T09:30:00.000Z"})),
        )
        .await
        .unwrap();
        assert_eq!(updated, 1);
    }

    #[tokio::test]
    async fn test_unknown_create_field_is_rejected() {
        let db = test_db().await;
        let alice = test_user(&db, "alice@example.com").await;

        let result = create(
            db.pool(),
            &alice,
            "chats",
            Submission::One(item(json!({"colour": "blue"}))),
        )
        .await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }

    #[test]
    fn test_submission_shapes() {
        let one: Submission = serde_json::from_value(json!({"title": "x"})).unwrap();
        assert!(matches!(one, Submission::One(_)));

        let many: Submission = serde_json::from_value(json!([{"title": "x"}, {}])).unwrap();
        assert!(matches!(many, Submission::Many(ref items) if items.len() == 2));
    }
}
