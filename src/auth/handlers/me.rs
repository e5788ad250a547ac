//! Current-user handler: `GET /api/auth/me`.

use axum::response::Json;

use crate::auth::handlers::types::MeResponse;
use crate::middleware::auth::AuthUser;

/// Return the authenticated caller's handle.
pub async fn get_me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        username: user.username,
    })
}
