/// Role endpoints
///
/// # Endpoints
///
/// - `POST /users/:id/apps` - register a user with an application
/// - `PUT  /users/:id/apps/:app` - merge named roles into the mask
/// - `GET  /users/:id/apps/:app` - fetch the role row

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::Envelope,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use identra_shared::models::role::Role;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// App registration request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAppRequest {
    #[validate(length(min = 1, message = "app is required"))]
    pub app: String,
}

/// Role grant request
#[derive(Debug, Deserialize)]
pub struct AddRolesRequest {
    /// Role names; all must be valid or nothing is written
    pub roles: Vec<String>,
}

/// `POST /users/:id/apps`
///
/// Registers the user with an application, starting with an empty role
/// mask. The user must exist.
pub async fn create_app(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateAppRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<Role>>)> {
    req.validate()
        .map_err(|_| ApiError::BadRequest("app is required".to_string()))?;

    let role = state.roles.create(id, &req.app).await?;
    Ok((StatusCode::CREATED, Json(Envelope::created(role))))
}

/// `PUT /users/:id/apps/:app`
///
/// ORs the named roles into the existing mask. Granting a role the user
/// already holds is a no-op.
pub async fn add_roles(
    State(state): State<AppState>,
    Path((id, app)): Path<(Uuid, String)>,
    Json(req): Json<AddRolesRequest>,
) -> ApiResult<Json<Envelope<Role>>> {
    state.roles.add_roles(id, &app, &req.roles).await?;
    let role = state.roles.get(id, &app).await?;
    Ok(Json(Envelope::ok(role)))
}

/// `GET /users/:id/apps/:app`
pub async fn get_role(
    State(state): State<AppState>,
    Path((id, app)): Path<(Uuid, String)>,
) -> ApiResult<Json<Envelope<Role>>> {
    let role = state.roles.get(id, &app).await?;
    Ok(Json(Envelope::ok(role)))
}
