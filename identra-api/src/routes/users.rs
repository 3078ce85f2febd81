/// User endpoints
///
/// # Endpoints
///
/// - `GET    /users` - list with filters + pagination
/// - `POST   /users` - create
/// - `POST   /users/login` - authenticate, returns user + token
/// - `GET    /users/me` - user behind the bearer token
/// - `GET    /users/:id` - get by id
/// - `PATCH  /users/:id` - partial update
/// - `DELETE /users/:id` - delete (accepted, not applied)
/// - `PUT    /users/:id/password` - password change
/// - `GET    /users/:id/token/:token` - token access check

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::{Envelope, Meta},
};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use identra_shared::models::user::{Language, User, UserFilters, UserUpdate};
use identra_shared::service::user::CreateUser;
use identra_shared::service::ServiceError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "first_name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "last_name is required"))]
    pub last_name: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,

    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,

    #[serde(default)]
    pub phone: String,

    /// Normalized to the enumerated set; unknown values become "en"
    #[serde(default)]
    pub language: String,

    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub external_token: Option<String>,
}

/// List users query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    /// Exact username match, case-insensitive
    pub username: Option<String>,

    /// Comma-separated id set
    pub ids: Option<String>,

    pub limit: Option<i64>,
    pub page: Option<i64>,
}

/// Partial update request
///
/// Absent fields are left untouched; `null` is treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<String>,
    pub language: Option<String>,
}

/// Password change request
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Login response payload
#[derive(Debug, Serialize)]
pub struct LoginData {
    pub user: User,
    pub token: String,
}

/// Token access response payload
#[derive(Debug, Serialize)]
pub struct AuthData {
    /// 1 when the token was accepted for the requested user
    pub authorization: i32,
    pub user: User,
}

/// Collapses validator output into a single 400
fn validated<T: Validate>(req: &T) -> ApiResult<()> {
    req.validate().map_err(|e| {
        let message = e
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .filter_map(|error| error.message.as_ref().map(|m| m.to_string()))
            .next()
            .unwrap_or_else(|| "Validation failed".to_string());
        ApiError::BadRequest(message)
    })
}

/// Pulls the bearer token out of the Authorization header
fn bearer_token(headers: &HeaderMap) -> ApiResult<&str> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))
}

/// `POST /users`
///
/// Creates a user. The password is hashed before persistence and the
/// response never echoes it back.
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<User>>)> {
    validated(&req)?;

    let user = state
        .users
        .create(CreateUser {
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            password: req.password,
            email: req.email,
            phone: req.phone,
            client_id: req.client_id,
            client_secret: req.client_secret,
            external_token: req.external_token,
            language: req.language,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(Envelope::created(user))))
}

/// `GET /users`
///
/// Lists users newest first, filtered by exact username and/or id set,
/// with pagination metadata computed from the total match count.
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<Envelope<Vec<User>>>> {
    let ids = match &query.ids {
        Some(raw) => {
            let parsed: Result<Vec<Uuid>, _> =
                raw.split(',').map(|s| s.trim().parse::<Uuid>()).collect();
            Some(parsed.map_err(|_| ApiError::BadRequest("Invalid id filter".to_string()))?)
        }
        None => None,
    };

    let filters = UserFilters {
        username: query.username.clone(),
        ids,
    };

    let total = state.users.count(&filters).await?;
    let meta = Meta::new(query.page, query.limit, total, state.config.pagination_limit);

    let users = state
        .users
        .get_all(&filters, meta.offset(), meta.limit())
        .await?;

    Ok(Json(Envelope::ok_with_meta(users, meta)))
}

/// `GET /users/:id`
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<User>>> {
    let user = state.users.get(id).await?;
    Ok(Json(Envelope::ok(user)))
}

/// `GET /users/me`
///
/// Resolves the user behind the bearer token in the Authorization header.
pub async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Envelope<User>>> {
    let token = bearer_token(&headers)?;
    let user = state.users.get_by_token(token).await?;
    Ok(Json(Envelope::ok(user)))
}

/// `POST /users/login`
///
/// A username miss and a wrong password answer identically so the
/// endpoint doesn't reveal which usernames exist.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<Envelope<LoginData>>> {
    validated(&req)?;

    let user = state
        .users
        .find_by_username(&req.username)
        .await
        .map_err(|err| match err {
            ServiceError::NotFound { .. } => ServiceError::InvalidAuthentication,
            other => other,
        })?;

    let token = state.users.login(&user, &req.password).await?;

    Ok(Json(Envelope::ok(LoginData { user, token })))
}

/// `PATCH /users/:id`
///
/// Writes only the fields present in the body.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    let changes = UserUpdate {
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        phone: req.phone,
        photo: req.photo,
        language: req.language.as_deref().map(Language::normalize),
    };

    state.users.update(id, changes).await?;
    Ok(Json(Envelope::ok_empty()))
}

/// `DELETE /users/:id`
///
/// Accepted but not applied; see `UserService::delete`.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<()>>> {
    state.users.delete(id).await?;
    Ok(Json(Envelope::ok_empty()))
}

/// `PUT /users/:id/password`
pub async fn update_password(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePasswordRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    state
        .users
        .update_password(id, &req.old_password, &req.new_password)
        .await?;

    Ok(Json(Envelope::ok_empty()))
}

/// `GET /users/:id/token/:token`
///
/// Verifies the token against the expected user and returns the user when
/// it holds.
pub async fn token_access(
    State(state): State<AppState>,
    Path((id, token)): Path<(Uuid, String)>,
) -> ApiResult<Json<Envelope<AuthData>>> {
    let user = state.users.token_access(id, &token).await?;

    Ok(Json(Envelope::ok(AuthData {
        authorization: 1,
        user,
    })))
}
