//! Route handlers for the local backend.

pub mod auth;
pub mod db;
pub mod functions;
pub mod health;
pub mod rpc;
pub mod storage;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        // Accounts and sessions
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signin", post(auth::signin))
        .route("/auth/signout", post(auth::signout))
        .route("/auth/session", get(auth::get_session))
        .route("/auth/update_user", post(auth::update_user))
        // Resource gateway
        .route(
            "/db/:table",
            get(db::list)
                .post(db::create)
                .patch(db::update)
                .delete(db::delete),
        )
        // Ledger
        .route("/rpc/reset_monthly_credits", post(rpc::reset_monthly_credits))
        .route("/rpc/reset_monthly_ocr_credits", post(rpc::reset_monthly_ocr_credits))
        .route("/rpc/consume_ocr_credit", post(rpc::consume_ocr_credit))
        // Functions
        .route("/functions/chat-router", post(functions::chat_router))
        .route("/functions/contact-support", post(functions::contact_support))
        // Storage
        .route(
            "/storage/:bucket/upload",
            post(storage::upload).layer(DefaultBodyLimit::max(storage::MAX_UPLOAD_BYTES)),
        )
        .route("/storage/:bucket/public/*path", get(storage::public))
}
