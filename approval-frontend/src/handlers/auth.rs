use crate::handlers::hx_redirect;
use crate::session::SessionContext;
use crate::utils::jwt::decode_jwt_claims;
use crate::utils::validation::LoginForm;
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use service_core::error::AppError;
use tower_sessions::Session;
use validator::Validate;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {}

pub async fn login_page() -> impl IntoResponse {
    LoginTemplate {}
}

fn error_fragment(status: StatusCode, message: &str) -> Response {
    (
        status,
        Html(format!("<p class=\"form-error\">{}</p>", message)),
    )
        .into_response()
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(payload): Form<LoginForm>,
) -> Response {
    if payload.validate().is_err() {
        return error_fragment(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Enter a valid email and password",
        );
    }

    let tokens = match state
        .identity_client
        .login(payload.email.trim(), &payload.password)
        .await
    {
        Ok(tokens) => tokens,
        Err(e @ (AppError::Unauthorized(_) | AppError::BadRequest(_))) => {
            tracing::info!(error = %e, "Login refused");
            return error_fragment(StatusCode::UNPROCESSABLE_ENTITY, "Invalid email or password");
        }
        Err(e) => {
            tracing::error!(error = %e, "Identity provider failed during login");
            return error_fragment(
                StatusCode::SERVICE_UNAVAILABLE,
                "Sign-in is temporarily unavailable, try again shortly",
            );
        }
    };

    let claims = match decode_jwt_claims(&tokens.access_token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::error!("Failed to decode JWT claims: {}", e);
            return error_fragment(StatusCode::INTERNAL_SERVER_ERROR, "Authentication error");
        }
    };

    match SessionContext::new(claims, tokens).start(&session).await {
        Ok(context) => {
            tracing::info!(
                user_id = %context.user_id,
                email = %context.email,
                "User logged in successfully"
            );
            hx_redirect("/workspaces")
        }
        Err(e) => e.into_response(),
    }
}

pub async fn logout_handler(State(state): State<AppState>, session: Session) -> Response {
    match SessionContext::load(&session).await {
        Ok(Some(context)) => {
            // Sign-out goes ahead even if the provider cannot revoke the token
            if let Err(e) = state.identity_client.logout(&context.access_token).await {
                tracing::error!(user_id = %context.user_id, "Failed to revoke token during logout: {}", e);
            } else {
                tracing::info!(user_id = %context.user_id, "Token revoked successfully");
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Could not read session during logout: {}", e),
    }

    if let Err(e) = SessionContext::end(&session).await {
        return e.into_response();
    }

    hx_redirect("/login")
}
