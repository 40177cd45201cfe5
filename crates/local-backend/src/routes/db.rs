//! Generic resource gateway routes: `/db/{table}`.
//!
//! Query parameters: `eq.<field>=<value>` (repeatable, AND-combined),
//! `order=<field>.<asc|desc>`, and `from=<n>&to=<m>` for an inclusive row
//! range.

use axum::extract::{Path, Query, State};
use axum::Json;
use database::gateway::{self, Created, ListParams, Submission};
use database::query::{OrderSpec, RangeSpec};
use serde_json::{json, Map, Value};

use crate::auth::CurrentPrincipal;
use crate::error::Result;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Raw query pairs, in request order.
type QueryPairs = Vec<(String, String)>;

fn filters(pairs: &[(String, String)]) -> Vec<(String, Value)> {
    pairs
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix("eq.")
                .map(|field| (field.to_string(), Value::String(value.clone())))
        })
        .collect()
}

fn list_params(pairs: &[(String, String)]) -> ListParams {
    let last = |name: &str| {
        pairs
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    };

    let range = RangeSpec {
        from: last("from").and_then(|v| v.parse().ok()),
        to: last("to").and_then(|v| v.parse().ok()),
    };

    ListParams {
        filters: filters(pairs),
        order: last("order").and_then(OrderSpec::parse),
        range: Some(range),
    }
}

pub async fn list(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(table): Path<String>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Vec<Value>>> {
    let rows = gateway::list(state.db.pool(), &principal, &table, &list_params(&pairs)).await?;
    Ok(Json(rows))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(table): Path<String>,
    ApiJson(submission): ApiJson<Submission>,
) -> Result<Json<Created>> {
    let created = gateway::create(state.db.pool(), &principal, &table, submission).await?;
    Ok(Json(created))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(table): Path<String>,
    Query(pairs): Query<QueryPairs>,
    ApiJson(patch): ApiJson<Map<String, Value>>,
) -> Result<Json<Value>> {
    let updated =
        gateway::update(state.db.pool(), &principal, &table, &filters(&pairs), &patch).await?;
    Ok(Json(json!({ "updated": updated })))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(table): Path<String>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Value>> {
    let deleted = gateway::delete(state.db.pool(), &principal, &table, &filters(&pairs)).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::query::Direction;

    fn pairs(raw: &[(&str, &str)]) -> QueryPairs {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_list_params() {
        let params = list_params(&pairs(&[
            ("eq.chat_id", "c1"),
            ("eq.role", "user"),
            ("order", "created_at.desc"),
            ("from", "2"),
            ("to", "4"),
            ("select", "*"),
        ]));

        assert_eq!(
            params.filters,
            vec![
                ("chat_id".to_string(), json!("c1")),
                ("role".to_string(), json!("user")),
            ]
        );
        let order = params.order.unwrap();
        assert_eq!(order.field, "created_at");
        assert_eq!(order.direction, Direction::Desc);
        let page = params.range.unwrap().page().unwrap();
        assert_eq!((page.offset, page.limit), (2, 3));
    }

    #[test]
    fn test_bad_range_and_order_are_ignored() {
        let params = list_params(&pairs(&[("order", "created_at.sideways"), ("from", "x"), ("to", "3")]));
        assert!(params.order.is_none());
        assert!(params.range.unwrap().page().is_none());
    }
}
