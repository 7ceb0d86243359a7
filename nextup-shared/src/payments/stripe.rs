/// Stripe API client and webhook signature verification
///
/// Webhook signatures follow Stripe's `Stripe-Signature` scheme: the header
/// carries `t=<unix seconds>,v1=<hex hmac>` pairs, and the signature is
/// HMAC-SHA256 over the string `"{timestamp}.{raw_body}"` keyed with the
/// endpoint's webhook secret. Verification MUST run over the exact raw bytes
/// received, before any JSON parsing, since re-serialization would not
/// round-trip byte-for-byte.
///
/// # Example
///
/// ```no_run
/// use nextup_shared::payments::stripe::{StripeClient, StripeConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = StripeClient::new(StripeConfig {
///     secret_key: "sk_test_123".into(),
///     webhook_secret: "whsec_456".into(),
/// });
/// let session = client.retrieve_checkout_session("cs_test_abc").await?;
/// println!("status: {}", session.payment_status);
/// # Ok(())
/// # }
/// ```

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed age of a webhook signature timestamp, in seconds
const SIGNATURE_TOLERANCE_SECONDS: i64 = 300;

/// Error type for payment operations
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Signature header is missing or structurally malformed
    #[error("Malformed signature header: {0}")]
    MalformedSignature(String),

    /// Signature timestamp is outside the replay tolerance window
    #[error("Signature timestamp outside tolerance window")]
    SignatureExpired,

    /// HTTP request to the payment provider failed
    #[error("Payment provider request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("Payment provider returned {status}: {body}")]
    ProviderError { status: u16, body: String },
}

/// Stripe credentials
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// API secret key (`sk_...`), used as the bearer token for API calls
    pub secret_key: String,

    /// Webhook endpoint secret (`whsec_...`), used to verify signatures
    pub webhook_secret: String,
}

/// A Checkout Session as returned by the Stripe API and embedded in
/// `checkout.session.completed` events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Session ID (`cs_...`)
    pub id: String,

    /// "paid", "unpaid", or "no_payment_required"
    pub payment_status: String,

    /// Opaque reference set at session creation; this system encodes
    /// `"<user_id>|<season_id>"`
    pub client_reference_id: Option<String>,
}

/// Envelope of a webhook event
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// Event ID (`evt_...`)
    pub id: String,

    /// Event type, e.g. "checkout.session.completed"
    #[serde(rename = "type")]
    pub kind: String,

    /// Event payload
    pub data: WebhookEventData,
}

/// Payload wrapper inside a webhook event
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    /// The object the event describes; a checkout session for the events
    /// this system consumes
    pub object: CheckoutSession,
}

/// HTTP client for the Stripe API
#[derive(Debug, Clone)]
pub struct StripeClient {
    config: StripeConfig,
    http: reqwest::Client,
    api_base: String,
}

impl StripeClient {
    /// Creates a client against the live Stripe API
    pub fn new(config: StripeConfig) -> Self {
        Self::with_api_base(config, "https://api.stripe.com".to_string())
    }

    /// Creates a client against an alternate API base URL (tests)
    pub fn with_api_base(config: StripeConfig, api_base: String) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            api_base,
        }
    }

    /// Verifies a `Stripe-Signature` header against the raw request body
    ///
    /// Returns `Ok(true)` when a `v1` signature matches, `Ok(false)` when
    /// the header parses but no signature matches, and an error when the
    /// header is malformed or the timestamp is outside the 5-minute replay
    /// window.
    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<bool, PaymentError> {
        let (timestamp, signatures) = parse_signature_header(signature_header)?;

        let age = (Utc::now().timestamp() - timestamp).abs();
        if age > SIGNATURE_TOLERANCE_SECONDS {
            return Err(PaymentError::SignatureExpired);
        }

        let mut mac = HmacSha256::new_from_slice(self.config.webhook_secret.as_bytes())
            .map_err(|e| PaymentError::MalformedSignature(e.to_string()))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = hex::encode(mac.finalize().into_bytes());

        Ok(signatures.iter().any(|sig| constant_time_eq(sig, &expected)))
    }

    /// Fetches a checkout session by ID
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::ProviderError`] for non-2xx responses,
    /// including unknown session IDs (404).
    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions/{}", self.api_base, session_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.secret_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::ProviderError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<CheckoutSession>().await?)
    }
}

/// Parses `t=<ts>,v1=<hex>[,v1=<hex>...]` into (timestamp, signatures)
fn parse_signature_header(header: &str) -> Result<(i64, Vec<String>), PaymentError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<String> = Vec::new();

    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or_else(|| PaymentError::MalformedSignature(format!("bad element: {part}")))?;

        match key {
            "t" => {
                let ts = value.parse::<i64>().map_err(|_| {
                    PaymentError::MalformedSignature(format!("bad timestamp: {value}"))
                })?;
                timestamp = Some(ts);
            }
            "v1" => signatures.push(value.to_string()),
            // Stripe may add other schemes (v0); ignore them
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| PaymentError::MalformedSignature("missing timestamp".to_string()))?;

    if signatures.is_empty() {
        return Err(PaymentError::MalformedSignature(
            "missing v1 signature".to_string(),
        ));
    }

    Ok((timestamp, signatures))
}

/// Constant-time hex string comparison
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEBHOOK_SECRET: &str = "whsec_test_secret";

    fn test_client() -> StripeClient {
        StripeClient::new(StripeConfig {
            secret_key: "sk_test_key".to_string(),
            webhook_secret: WEBHOOK_SECRET.to_string(),
        })
    }

    fn sign(payload: &[u8], timestamp: i64, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_accepted() {
        let client = test_client();
        let payload = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;
        let ts = Utc::now().timestamp();
        let header = format!("t={},v1={}", ts, sign(payload, ts, WEBHOOK_SECRET));

        assert!(client
            .verify_webhook_signature(payload, &header)
            .expect("Verification should succeed"));
    }

    #[test]
    fn test_wrong_secret_signature_rejected() {
        let client = test_client();
        let payload = br#"{"id":"evt_1"}"#;
        let ts = Utc::now().timestamp();
        let header = format!("t={},v1={}", ts, sign(payload, ts, "whsec_other"));

        assert!(!client
            .verify_webhook_signature(payload, &header)
            .expect("Verification should succeed"));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let client = test_client();
        let payload = br#"{"id":"evt_1"}"#;
        let ts = Utc::now().timestamp();
        let header = format!("t={},v1={}", ts, sign(payload, ts, WEBHOOK_SECRET));

        assert!(!client
            .verify_webhook_signature(br#"{"id":"evt_2"}"#, &header)
            .expect("Verification should succeed"));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let client = test_client();
        let payload = b"{}";
        let ts = Utc::now().timestamp() - 600;
        let header = format!("t={},v1={}", ts, sign(payload, ts, WEBHOOK_SECRET));

        assert!(matches!(
            client.verify_webhook_signature(payload, &header),
            Err(PaymentError::SignatureExpired)
        ));
    }

    #[test]
    fn test_malformed_header_rejected() {
        let client = test_client();

        for header in ["", "garbage", "t=notanumber,v1=abc", "t=123", "v1=abc"] {
            assert!(
                matches!(
                    client.verify_webhook_signature(b"{}", header),
                    Err(PaymentError::MalformedSignature(_))
                ),
                "Header '{}' should be malformed",
                header
            );
        }
    }

    #[test]
    fn test_multiple_v1_signatures_any_match() {
        let client = test_client();
        let payload = b"{}";
        let ts = Utc::now().timestamp();
        let good = sign(payload, ts, WEBHOOK_SECRET);
        let header = format!("t={ts},v1={},v1={good}", "0".repeat(64));

        assert!(client
            .verify_webhook_signature(payload, &header)
            .expect("Verification should succeed"));
    }

    #[test]
    fn test_unknown_scheme_elements_ignored() {
        let client = test_client();
        let payload = b"{}";
        let ts = Utc::now().timestamp();
        let header = format!(
            "t={ts},v0=deadbeef,v1={}",
            sign(payload, ts, WEBHOOK_SECRET)
        );

        assert!(client
            .verify_webhook_signature(payload, &header)
            .expect("Verification should succeed"));
    }

    #[test]
    fn test_webhook_event_deserializes() {
        let json = r#"{
            "id": "evt_123",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_456",
                    "payment_status": "paid",
                    "client_reference_id": "u|s"
                }
            }
        }"#;

        let event: WebhookEvent = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(event.kind, "checkout.session.completed");
        assert_eq!(event.data.object.payment_status, "paid");
        assert_eq!(event.data.object.client_reference_id.as_deref(), Some("u|s"));
    }
}
