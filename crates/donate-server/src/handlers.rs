//! HTTP Handlers
//!
//! One user-facing surface: the donation form. Every outcome of a
//! submission, success or failure, re-renders the same page with an inline
//! flash message.

use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use donate_payments::{DonationOutcome, PaymentError};

use crate::state::AppState;

const DONATE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Donate</title>
</head>
<body>
  <h1>Make a Donation</h1>
  {{flash}}
  <form action="/donate" method="post">
    <label for="username">Username</label>
    <input type="text" id="username" name="username">
    <label for="amount">Amount ($)</label>
    <input type="text" id="amount" name="amount">
    <button type="submit">Donate</button>
  </form>
</body>
</html>
"#;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct DonateForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub amount: String,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/donate", get(donate_page).post(donate_submit))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Render the donation form
pub async fn donate_page() -> Html<String> {
    render_page(None)
}

/// Handle a donation submission
pub async fn donate_submit(
    State(state): State<AppState>,
    Form(form): Form<DonateForm>,
) -> Response {
    if form.username.trim().is_empty() {
        return flash("No username was specified!");
    }

    let amount_field = form.amount.trim();
    if amount_field.is_empty() {
        return flash("No amount was specified!");
    }
    let Ok(amount) = amount_field.parse::<Decimal>() else {
        return flash("Specified amount must be a number!");
    };
    if amount <= Decimal::ZERO {
        return flash("Specified amount must be a positive number!");
    }

    match state.donations.request_donation(&form.username, amount).await {
        Ok(DonationOutcome::Requested) => flash("Thank you for donating!"),
        Ok(DonationOutcome::UserNotFound) => {
            flash("Couldn't find an account with that username!")
        }
        Err(PaymentError::Validation(_)) => {
            // Form-level guards above should have caught this already
            flash("Invalid donation request!")
        }
        Err(e) => {
            tracing::error!(error = %e, "Donation request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                render_page(Some(
                    "Something went wrong processing your donation. Please try again.",
                )),
            )
                .into_response()
        }
    }
}

fn flash(message: &str) -> Response {
    render_page(Some(message)).into_response()
}

fn render_page(flash: Option<&str>) -> Html<String> {
    let flash_html = flash
        .map(|message| format!("<p class=\"flash\">{message}</p>"))
        .unwrap_or_default();
    Html(DONATE_PAGE.replace("{{flash}}", &flash_html))
}
