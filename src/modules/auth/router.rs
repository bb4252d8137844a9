use axum::{
    Router,
    routing::{get, post, put},
};

use crate::modules::auth::controller::{
    forgot_password, login, logout, me, register, reset_password, update_details,
    update_password,
};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/me", get(me))
        .route("/updatedetails", put(update_details))
        .route("/updatepassword", put(update_password))
        .route("/forgotpassword", post(forgot_password))
        .route("/resetpassword/{resettoken}", put(reset_password))
}
