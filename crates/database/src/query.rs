//! Translation of declarative list requests into store queries.
//!
//! [`translate`] is pure: it validates filter and order fields against a
//! catalog schema and computes pagination. The resulting [`StoreQuery`]
//! renders itself into SQL via [`QueryBuilder`] for the gateway to run.

use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite};

use crate::catalog::{EntitySchema, FieldKind};
use crate::time;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Requested ordering, before validation against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub field: String,
    pub direction: Direction,
}

impl OrderSpec {
    /// Parse the `field.asc` / `field.desc` query form.
    ///
    /// Returns `None` when the value has no direction suffix or the
    /// direction is neither `asc` nor `desc`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (field, direction) = raw.rsplit_once('.')?;
        let direction = match direction {
            "asc" => Direction::Asc,
            "desc" => Direction::Desc,
            _ => return None,
        };
        Some(Self {
            field: field.to_string(),
            direction,
        })
    }
}

/// Inclusive row range, as sent by clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeSpec {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

/// Offset/limit pagination derived from a [`RangeSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl RangeSpec {
    /// Pagination for this range, if both bounds are present and ordered.
    ///
    /// A span too wide to count in an `i64` means no pagination.
    pub fn page(&self) -> Option<Page> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from >= 0 && to >= from => {
                let limit = to.checked_sub(from)?.checked_add(1)?;
                Some(Page { offset: from, limit })
            }
            _ => None,
        }
    }
}

/// A value bound into a statement, already coerced to its column kind.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreValue {
    Null,
    Text(String),
    Integer(i64),
    Bool(bool),
}

impl StoreValue {
    /// Coerce a JSON value for storage in a field of `kind`.
    ///
    /// Returns `None` when the value cannot represent that kind.
    pub fn coerce(kind: FieldKind, value: &Value) -> Option<Self> {
        if value.is_null() {
            return Some(StoreValue::Null);
        }
        match kind {
            FieldKind::Date => match value {
                Value::String(s) if time::parse_date(s).is_some() => {
                    Some(StoreValue::Text(s.trim().to_string()))
                }
                _ => None,
            },
            FieldKind::Timestamp => match value {
                Value::String(s) if time::is_timestamp(s) => Some(StoreValue::Text(s.trim().to_string())),
                _ => None,
            },
            FieldKind::Text => match value {
                Value::String(s) => Some(StoreValue::Text(s.clone())),
                Value::Number(n) => Some(StoreValue::Text(n.to_string())),
                Value::Bool(b) => Some(StoreValue::Text(b.to_string())),
                _ => None,
            },
            FieldKind::Integer => match value {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                    .map(StoreValue::Integer),
                Value::String(s) => s.trim().parse::<i64>().ok().map(StoreValue::Integer),
                Value::Bool(b) => Some(StoreValue::Integer(i64::from(*b))),
                _ => None,
            },
            FieldKind::Boolean => match value {
                Value::Bool(b) => Some(StoreValue::Bool(*b)),
                Value::Number(n) => n.as_i64().map(|i| StoreValue::Bool(i != 0)),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "t" => Some(StoreValue::Bool(true)),
                    "false" | "0" | "f" => Some(StoreValue::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            FieldKind::Json => match value {
                Value::String(s) => Some(StoreValue::Text(s.clone())),
                other => serde_json::to_string(other).ok().map(StoreValue::Text),
            },
        }
    }

    /// Bind this value into a query under construction.
    pub fn push_bind(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            StoreValue::Null => builder.push_bind(None::<String>),
            StoreValue::Text(s) => builder.push_bind(s.clone()),
            StoreValue::Integer(i) => builder.push_bind(*i),
            StoreValue::Bool(b) => builder.push_bind(*b),
        };
    }
}

/// A single equality condition on a schema field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(&'static str, StoreValue),
    /// The filter value cannot match any stored value of the field.
    Never,
}

/// A composable, I/O-free description of a query against one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub schema: &'static EntitySchema,
    pub conditions: Vec<Condition>,
    pub order: Option<(&'static str, Direction)>,
    pub page: Option<Page>,
}

/// Translate filters, ordering and range into a [`StoreQuery`].
///
/// Filters and order fields not present on the schema are dropped.
pub fn translate(
    schema: &'static EntitySchema,
    filters: &[(String, Value)],
    order: Option<&OrderSpec>,
    range: Option<RangeSpec>,
) -> StoreQuery {
    let conditions = filters
        .iter()
        .filter_map(|(name, value)| {
            let field = schema.field(name)?;
            Some(match StoreValue::coerce(field.kind, value) {
                Some(StoreValue::Null) => Condition::Never,
                Some(bound) => Condition::Eq(field.name, bound),
                None => Condition::Never,
            })
        })
        .collect();

    let order = order.and_then(|spec| {
        schema
            .field(&spec.field)
            .map(|field| (field.name, spec.direction))
    });

    StoreQuery {
        schema,
        conditions,
        order,
        page: range.and_then(|r| r.page()),
    }
}

/// Quote a catalog identifier. Catalog names are static, never caller input.
pub(crate) fn ident(name: &str) -> String {
    format!("\"{}\"", name)
}

/// Comma-separated, quoted list of every schema field.
pub(crate) fn column_list(schema: &EntitySchema) -> String {
    schema
        .fields
        .iter()
        .map(|f| ident(f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

impl StoreQuery {
    /// Append the `WHERE` clause for this query's conditions.
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        if self.conditions.is_empty() {
            return;
        }
        builder.push(" WHERE ");
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                builder.push(" AND ");
            }
            match condition {
                Condition::Eq(column, value) => {
                    builder.push(ident(column));
                    builder.push(" = ");
                    value.push_bind(builder);
                }
                Condition::Never => {
                    builder.push("0");
                }
            }
        }
    }

    /// `SELECT` of every schema field, filtered, ordered and paginated.
    ///
    /// Insertion order (`rowid`) breaks ties so results are deterministic.
    pub fn select(&self) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM {}",
            column_list(self.schema),
            ident(self.schema.table)
        ));
        self.push_where(&mut builder);

        match self.order {
            Some((column, direction)) => {
                builder.push(format!(
                    " ORDER BY {} {}, rowid ASC",
                    ident(column),
                    direction.sql()
                ));
            }
            None => {
                builder.push(" ORDER BY rowid ASC");
            }
        }

        if let Some(page) = self.page {
            builder.push(" LIMIT ");
            builder.push_bind(page.limit);
            builder.push(" OFFSET ");
            builder.push_bind(page.offset);
        }

        builder
    }

    /// `SELECT COUNT(*)` over the matching rows.
    pub fn count(&self) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT COUNT(*) FROM {}",
            ident(self.schema.table)
        ));
        self.push_where(&mut builder);
        builder
    }

    /// `UPDATE` of the matching rows with the given assignments.
    pub fn update(&self, assignments: &[(&'static str, StoreValue)]) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::new(format!("UPDATE {} SET ", ident(self.schema.table)));
        for (i, (column, value)) in assignments.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(ident(column));
            builder.push(" = ");
            value.push_bind(&mut builder);
        }
        self.push_where(&mut builder);
        builder
    }

    /// `DELETE` of the matching rows.
    pub fn delete(&self) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::new(format!("DELETE FROM {}", ident(self.schema.table)));
        self.push_where(&mut builder);
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use serde_json::json;

    fn chats() -> &'static EntitySchema {
        catalog::resolve("chats").unwrap()
    }

    #[test]
    fn test_range_translation() {
        let query = translate(
            chats(),
            &[],
            None,
            Some(RangeSpec {
                from: Some(2),
                to: Some(4),
            }),
        );
        assert_eq!(query.page, Some(Page { offset: 2, limit: 3 }));

        let inverted = translate(
            chats(),
            &[],
            None,
            Some(RangeSpec {
                from: Some(5),
                to: Some(3),
            }),
        );
        assert_eq!(inverted.page, None);

        let half = translate(
            chats(),
            &[],
            None,
            Some(RangeSpec {
                from: Some(5),
                to: None,
            }),
        );
        assert_eq!(half.page, None);

        let single = RangeSpec {
            from: Some(0),
            to: Some(0),
        };
        assert_eq!(single.page(), Some(Page { offset: 0, limit: 1 }));
    }

    #[test]
    fn test_range_too_wide_is_unpaginated() {
        let widest = RangeSpec {
            from: Some(0),
            to: Some(i64::MAX),
        };
        assert_eq!(widest.page(), None);

        let near_end = RangeSpec {
            from: Some(1),
            to: Some(i64::MAX),
        };
        assert_eq!(
            near_end.page(),
            Some(Page {
                offset: 1,
                limit: i64::MAX
            })
        );
    }

    #[test]
    fn test_date_and_timestamp_coercion() {
        assert_eq!(
            StoreValue::coerce(FieldKind::Date, &json!("2025-03-01")),
            Some(StoreValue::Text("2025-03-01".to_string()))
        );
        assert_eq!(StoreValue::coerce(FieldKind::Date, &json!("soon")), None);
        assert_eq!(StoreValue::coerce(FieldKind::Date, &json!(20250301)), None);

        assert_eq!(
            StoreValue::coerce(FieldKind::Timestamp, &json!("2025-03-01T10:00:00.000Z")),
            Some(StoreValue::Text("2025-03-01T10:00:00.000Z".to_string()))
        );
        assert_eq!(StoreValue::coerce(FieldKind::Timestamp, &json!("tomorrow")), None);
        assert_eq!(StoreValue::coerce(FieldKind::Timestamp, &json!(true)), None);
        assert_eq!(StoreValue::coerce(FieldKind::Timestamp, &Value::Null), Some(StoreValue::Null));
    }

    #[test]
    fn test_unknown_filters_are_dropped() {
        let query = translate(
            chats(),
            &[
                ("title".to_string(), json!("Trip")),
                ("not_a_column".to_string(), json!("x")),
            ],
            None,
            None,
        );
        assert_eq!(
            query.conditions,
            vec![Condition::Eq("title", StoreValue::Text("Trip".to_string()))]
        );
    }

    #[test]
    fn test_invalid_order_field_is_ignored() {
        let spec = OrderSpec::parse("bogus.desc").unwrap();
        let query = translate(chats(), &[], Some(&spec), None);
        assert!(query.order.is_none());

        let spec = OrderSpec::parse("created_at.desc").unwrap();
        let query = translate(chats(), &[], Some(&spec), None);
        assert_eq!(query.order, Some(("created_at", Direction::Desc)));
    }

    #[test]
    fn test_order_parse() {
        assert_eq!(
            OrderSpec::parse("created_at.asc"),
            Some(OrderSpec {
                field: "created_at".to_string(),
                direction: Direction::Asc
            })
        );
        assert!(OrderSpec::parse("created_at").is_none());
        assert!(OrderSpec::parse("created_at.sideways").is_none());
    }

    #[test]
    fn test_filter_coercion() {
        let notifications = catalog::resolve("notifications").unwrap();
        let query = translate(
            notifications,
            &[
                ("read".to_string(), json!("true")),
                ("title".to_string(), json!(7)),
            ],
            None,
            None,
        );
        assert_eq!(
            query.conditions,
            vec![
                Condition::Eq("read", StoreValue::Bool(true)),
                Condition::Eq("title", StoreValue::Text("7".to_string())),
            ]
        );

        let query = translate(
            notifications,
            &[("read".to_string(), json!("maybe"))],
            None,
            None,
        );
        assert_eq!(query.conditions, vec![Condition::Never]);
    }

    #[test]
    fn test_json_coercion_serializes_structures() {
        assert_eq!(
            StoreValue::coerce(FieldKind::Json, &json!({"a": 1})),
            Some(StoreValue::Text("{\"a\":1}".to_string()))
        );
        assert_eq!(
            StoreValue::coerce(FieldKind::Json, &json!("raw")),
            Some(StoreValue::Text("raw".to_string()))
        );
        assert_eq!(StoreValue::coerce(FieldKind::Integer, &json!("12x")), None);
    }

    #[test]
    fn test_select_sql() {
        let spec = OrderSpec::parse("created_at.desc").unwrap();
        let query = translate(
            chats(),
            &[("user_id".to_string(), json!("u1"))],
            Some(&spec),
            Some(RangeSpec {
                from: Some(0),
                to: Some(9),
            }),
        );
        let builder = query.select();
        let sql = builder.sql();
        assert_eq!(
            sql,
            "SELECT \"id\", \"user_id\", \"title\", \"created_at\", \"updated_at\" FROM \"chats\" \
             WHERE \"user_id\" = ? ORDER BY \"created_at\" DESC, rowid ASC LIMIT ? OFFSET ?"
        );
    }

    #[test]
    fn test_empty_filters_have_no_where() {
        let query = translate(chats(), &[], None, None);
        assert_eq!(query.delete().sql(), "DELETE FROM \"chats\"");
    }
}
