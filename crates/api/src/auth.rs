//! Access control
//!
//! Resolves `(group id, token)` to a [`Group`] before any group-scoped
//! handler runs. The resolved group reaches the handler as the
//! [`GroupAccess`] argument; nothing is stored on the request.

use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use splitty_core::{validate_token, Group, Validator};
use splitty_persistence::GroupRepo;
use std::collections::HashMap;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Header carrying the group bearer token
pub const TOKEN_HEADER: &str = "x-group-token";

/// Legacy query parameter accepted when the header is absent
pub const TOKEN_QUERY: &str = "token";

/// Path parameter naming the group
pub const GROUP_ID_PARAM: &str = "groupID";

/// Parse a positive integer id out of the path parameters
pub fn read_id(params: &HashMap<String, String>, name: &str) -> ApiResult<i64> {
    params
        .get(name)
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|id| *id >= 1)
        .ok_or_else(|| ApiError::bad_request("invalid id parameter"))
}

/// Token from the `X-Group-Token` header, else the `token` query parameter
pub fn read_token(parts: &Parts) -> ApiResult<String> {
    if let Some(value) = parts.headers.get(TOKEN_HEADER) {
        return value
            .to_str()
            .ok()
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("invalid token header"));
    }

    Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(mut query)| query.remove(TOKEN_QUERY))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::bad_request("invalid token header"))
}

/// Check the token shape, then look the group up by id and token.
///
/// A wrong id and a wrong token both surface as `NotFound`.
pub async fn authenticate(groups: &GroupRepo, id: i64, token: &str) -> ApiResult<Group> {
    let mut v = Validator::new();
    validate_token(&mut v, token);
    v.finish()?;

    Ok(groups.get_by_id_and_token(id, token).await?)
}

/// An authenticated group, extracted from the request
#[derive(Debug, Clone)]
pub struct GroupAccess(pub Group);

impl GroupAccess {
    pub fn into_inner(self) -> Group {
        self.0
    }
}

impl FromRequestParts<AppState> for GroupAccess {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> ApiResult<Self> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state).await?;
        let id = read_id(&params, GROUP_ID_PARAM)?;
        let token = read_token(parts)?;

        let group = authenticate(state.db.groups(), id, &token).await?;
        tracing::debug!(group_id = group.id, "group authenticated");

        Ok(GroupAccess(group))
    }
}
