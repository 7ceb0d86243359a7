/// Payment endpoints
///
/// Two ingress paths for the same fact ("this user paid for this season"):
///
/// - `POST /api/payments/webhook` - Stripe pushes a signed
///   `checkout.session.completed` event. The session embedded in the event
///   is trusted once the signature over the raw body verifies.
/// - `GET /api/payments/confirm` - The client lands back from checkout with
///   a `session_id` and asks the server to confirm. The session contents
///   are NOT trusted from the client; the server re-fetches the session
///   from Stripe by ID.
///
/// Both paths converge on the shared reconciler, whose constraint-backed
/// insert makes duplicate and racing deliveries harmless.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use nextup_shared::payments::{
    reconcile::{reconcile_checkout, ReconcileOutcome},
    stripe::WebhookEvent,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Query parameters for the confirm endpoint
#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    /// Checkout session ID (`cs_...`) from the post-checkout redirect
    pub session_id: String,
}

/// Confirm endpoint response
#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    /// Whether a registration row exists after this call
    pub recorded: bool,

    /// Why nothing was recorded, when `recorded` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// Stripe webhook handler
///
/// Verifies the `Stripe-Signature` header against the exact raw body bytes
/// before any parsing. After the signature passes, the handler always
/// responds `200 {"received": true}` regardless of the business outcome;
/// Stripe retries on non-2xx, and an unpaid or undecodable session will
/// not become decodable on redelivery.
///
/// # Errors
///
/// - `400 Bad Request`: Missing, malformed, stale, or wrong signature, or
///   a body that is not a valid event
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<serde_json::Value>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Missing Stripe-Signature header".to_string()))?;

    let valid = state.stripe.verify_webhook_signature(&body, signature)?;
    if !valid {
        tracing::warn!("Rejected webhook with bad signature");
        return Err(ApiError::BadRequest(
            "Webhook signature verification failed".to_string(),
        ));
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

    if event.kind != "checkout.session.completed" {
        tracing::debug!(event_id = %event.id, kind = %event.kind, "Ignoring webhook event type");
        return Ok(Json(json!({ "received": true })));
    }

    // Business failures past this point are logged, not surfaced: the
    // signature proved the delivery authentic, so retrying it cannot help.
    let outcome = reconcile_checkout(&state.db, &event.data.object).await?;
    tracing::info!(event_id = %event.id, ?outcome, "Processed checkout webhook");

    Ok(Json(json!({ "received": true })))
}

/// Client-side payment confirmation
///
/// Fetches the checkout session from Stripe by ID and runs it through the
/// reconciler. Safe to call any number of times, and safe to race against
/// the webhook; whichever path inserts first wins and the other reports
/// the row as already present.
///
/// # Errors
///
/// - `404 Not Found`: Stripe does not know this session ID
pub async fn confirm(
    State(state): State<AppState>,
    Query(query): Query<ConfirmQuery>,
) -> ApiResult<Json<ConfirmResponse>> {
    if query.session_id.trim().is_empty() {
        return Err(ApiError::BadRequest("session_id is required".to_string()));
    }

    let session = state
        .stripe
        .retrieve_checkout_session(&query.session_id)
        .await?;

    let outcome = reconcile_checkout(&state.db, &session).await?;

    let response = match outcome {
        ReconcileOutcome::Recorded | ReconcileOutcome::AlreadyRecorded => ConfirmResponse {
            recorded: true,
            reason: None,
        },
        ReconcileOutcome::NotPaid => ConfirmResponse {
            recorded: false,
            reason: Some("not_paid"),
        },
        ReconcileOutcome::BadReference => ConfirmResponse {
            recorded: false,
            reason: Some("bad_ref"),
        },
        ReconcileOutcome::UnknownEntity => ConfirmResponse {
            recorded: false,
            reason: Some("unknown_entity"),
        },
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_response_omits_reason_when_recorded() {
        let response = ConfirmResponse {
            recorded: true,
            reason: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"recorded":true}"#);
    }

    #[test]
    fn test_confirm_response_includes_reason_when_not_recorded() {
        let response = ConfirmResponse {
            recorded: false,
            reason: Some("not_paid"),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"recorded":false,"reason":"not_paid"}"#);
    }
}
