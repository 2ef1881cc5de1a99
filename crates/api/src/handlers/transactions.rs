//! Transaction handlers
//!
//! All routes are nested under an authenticated group; the transaction is
//! validated against that group's current users before any store call.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use splitty_core::{validate_transaction, Group, Payment, Transaction, Validator};
use std::collections::HashMap;

use crate::auth::{read_id, GroupAccess};
use crate::error::ApiResult;
use crate::handlers::{envelope, Envelope};
use crate::state::AppState;

const TRANSACTION_ID_PARAM: &str = "transactionID";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransactionInput {
    pub title: String,
    pub payments: Vec<Payment>,
    /// Only read on update; defaults to the currently stored version
    pub version: Option<i64>,
}

/// Build a transaction for `group` from the request body and validate it
fn validated(input: TransactionInput, group: &Group) -> ApiResult<Transaction> {
    let transaction = Transaction::new(input.title, input.payments, group.id);

    let mut v = Validator::new();
    validate_transaction(&mut v, &transaction, group);
    v.finish()?;

    Ok(transaction)
}

/// `POST /v1/groups/{groupID}/transactions`
pub async fn create_transaction(
    State(state): State<AppState>,
    GroupAccess(group): GroupAccess,
    payload: Result<Json<TransactionInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = payload?;
    let mut transaction = validated(input, &group)?;

    state.db.transactions().insert(&mut transaction).await?;
    tracing::info!(
        group_id = group.id,
        transaction_id = transaction.id,
        "created transaction"
    );

    let location = format!("/v1/groups/{}/transactions/{}", group.id, transaction.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        envelope("transaction", transaction),
    ))
}

/// `GET /v1/groups/{groupID}/transactions?after=N`
pub async fn list_transactions(
    State(state): State<AppState>,
    GroupAccess(group): GroupAccess,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Envelope<Vec<Transaction>>> {
    let after = match query.get("after").map(|raw| raw.parse::<i64>()) {
        Some(Ok(after)) => after,
        _ => {
            tracing::info!("no valid value for after, using 0");
            0
        }
    };

    let transactions = state
        .db
        .transactions()
        .get_all_after_id(after, group.id)
        .await?;
    tracing::info!(
        group_id = group.id,
        after,
        count = transactions.len(),
        "retrieved transactions"
    );

    Ok(envelope("transactions", transactions))
}

/// `GET /v1/groups/{groupID}/transactions/{transactionID}`
pub async fn get_transaction(
    State(state): State<AppState>,
    GroupAccess(group): GroupAccess,
    Path(params): Path<HashMap<String, String>>,
) -> ApiResult<Envelope<Transaction>> {
    let id = read_id(&params, TRANSACTION_ID_PARAM)?;
    let transaction = state.db.transactions().get(id, group.id).await?;

    Ok(envelope("transaction", transaction))
}

/// `PUT /v1/groups/{groupID}/transactions/{transactionID}`
pub async fn update_transaction(
    State(state): State<AppState>,
    GroupAccess(group): GroupAccess,
    Path(params): Path<HashMap<String, String>>,
    payload: Result<Json<TransactionInput>, JsonRejection>,
) -> ApiResult<Envelope<Transaction>> {
    let id = read_id(&params, TRANSACTION_ID_PARAM)?;
    let Json(input) = payload?;
    let expected_version = input.version;
    let mut updated = validated(input, &group)?;

    let current = state.db.transactions().get(id, group.id).await?;
    updated.id = current.id;
    updated.version = expected_version.unwrap_or(current.version);

    state.db.transactions().update(&mut updated).await?;
    tracing::info!(
        group_id = group.id,
        transaction_id = id,
        version = updated.version,
        "updated transaction"
    );

    Ok(envelope("transaction", updated))
}

/// `DELETE /v1/groups/{groupID}/transactions/{transactionID}`
pub async fn delete_transaction(
    State(state): State<AppState>,
    GroupAccess(group): GroupAccess,
    Path(params): Path<HashMap<String, String>>,
) -> ApiResult<Envelope<&'static str>> {
    let id = read_id(&params, TRANSACTION_ID_PARAM)?;
    state.db.transactions().delete(id, group.id).await?;
    tracing::info!(group_id = group.id, transaction_id = id, "deleted transaction");

    Ok(envelope("message", "transaction successfully deleted"))
}
