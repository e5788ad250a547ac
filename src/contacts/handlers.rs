//! HTTP handlers for the contact endpoints.
//!
//! Thin glue over the engine: tag the raw `user` reference, hand it to the
//! engine together with the authenticated caller, and map the result.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::contacts::identity::UserRef;
use crate::contacts::relation::ContactView;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::server::state::AppState;

/// Body for add and accept: a username or numeric account id.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContactActionRequest {
    pub user: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveContactQuery {
    pub user: String,
}

/// `GET /api/contacts`
pub async fn list_contacts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ContactView>>, ApiError> {
    let contacts = state.contacts.list_contacts(&user.account()).await?;
    Ok(Json(contacts))
}

/// `GET /api/contacts/requests`
pub async fn incoming_requests(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ContactView>>, ApiError> {
    let requests = state.contacts.incoming_requests(&user.account()).await?;
    Ok(Json(requests))
}

/// `POST /api/contacts`
pub async fn add_contact(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<ContactActionRequest>,
) -> Result<Json<ContactView>, ApiError> {
    let target = UserRef::parse(&request.user);
    let view = state.contacts.add_contact(&user.account(), &target).await?;
    tracing::info!(
        caller = %user.username,
        target = %view.username,
        status = ?view.status,
        "contact add"
    );
    Ok(Json(view))
}

/// `POST /api/contacts/accept`
pub async fn accept_contact(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<ContactActionRequest>,
) -> Result<Json<ContactView>, ApiError> {
    let requester = UserRef::parse(&request.user);
    let view = state.contacts.accept(&user.account(), &requester).await?;
    tracing::info!(
        caller = %user.username,
        requester = %view.username,
        "contact request accepted"
    );
    Ok(Json(view))
}

/// `DELETE /api/contacts?user=`
pub async fn remove_contact(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<RemoveContactQuery>,
) -> Result<StatusCode, ApiError> {
    let other = UserRef::parse(&query.user);
    state.contacts.remove(&user.account(), &other).await?;
    Ok(StatusCode::NO_CONTENT)
}
