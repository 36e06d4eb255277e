//! User route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::user::{
    delete_current_user, get_current_user, get_user, list_users, register_user,
    update_current_user,
};
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reg", post(register_user))
        .route(
            "/api/user",
            get(get_current_user)
                .patch(update_current_user)
                .delete(delete_current_user),
        )
        .route("/api/users", get(list_users))
        .route("/api/user/:id", get(get_user))
}
