//! Group handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use splitty_core::{validate_group, Group, Validator};

use crate::auth::GroupAccess;
use crate::error::ApiResult;
use crate::handlers::{envelope, Envelope};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateGroupInput {
    pub name: String,
    pub users: Vec<String>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateGroupInput {
    pub name: Option<String>,
    pub users: Option<Vec<String>>,
    /// Version the client last read; defaults to the one just authenticated
    pub version: Option<i64>,
}

/// `POST /v1/groups`
pub async fn create_group(
    State(state): State<AppState>,
    payload: Result<Json<CreateGroupInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = payload?;
    let mut group = Group::new(input.name, input.users);

    let mut v = Validator::new();
    validate_group(&mut v, &group);
    v.finish()?;

    state.db.groups().insert(&mut group).await?;
    tracing::info!(group_id = group.id, "created group");

    let location = format!("/v1/groups/{}", group.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        envelope("group", group),
    ))
}

/// `GET /v1/groups/{groupID}`
pub async fn get_group(GroupAccess(group): GroupAccess) -> Envelope<Group> {
    tracing::info!(group_id = group.id, "retrieved group");
    envelope("group", group)
}

/// `PATCH /v1/groups/{groupID}`
pub async fn update_group(
    State(state): State<AppState>,
    GroupAccess(mut group): GroupAccess,
    payload: Result<Json<UpdateGroupInput>, JsonRejection>,
) -> ApiResult<Envelope<Group>> {
    let Json(input) = payload?;

    if let Some(name) = input.name {
        group.name = name;
    }
    if let Some(users) = input.users {
        group.users = users;
    }
    if let Some(version) = input.version {
        group.version = version;
    }

    let mut v = Validator::new();
    validate_group(&mut v, &group);
    v.finish()?;

    state.db.groups().update(&mut group).await?;
    tracing::info!(group_id = group.id, version = group.version, "updated group");

    Ok(envelope("group", group))
}

/// `DELETE /v1/groups/{groupID}`
pub async fn delete_group(
    State(state): State<AppState>,
    GroupAccess(group): GroupAccess,
) -> ApiResult<Envelope<&'static str>> {
    state.db.groups().delete(group.id, &group.token).await?;
    tracing::info!(group_id = group.id, "deleted group");

    Ok(envelope("message", "group successfully deleted"))
}
