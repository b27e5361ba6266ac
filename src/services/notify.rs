//! Regeneration notifier.
//!
//! Tells the static-regeneration pipeline which slug to rebuild when
//! published content is saved. Delivery is fire-and-forget: the
//! mutation path never waits, downstream failures never roll back the
//! local write, and retry/idempotency belong to the receiving side.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

/// Regeneration event sender.
#[derive(Clone)]
pub struct RegenerationNotifier {
    client: reqwest::Client,
    endpoint: Option<String>,
    secret: Option<String>,
}

impl RegenerationNotifier {
    /// Create a notifier posting to `endpoint`. With no endpoint
    /// configured, events are logged and dropped. If `secret` is set,
    /// payloads carry an HMAC-SHA256 signature header so the receiver
    /// can verify authenticity.
    pub fn new(endpoint: Option<String>, secret: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint,
            secret,
        }
    }

    /// A notifier that drops every event. For tests and local setups.
    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    /// Emit a publication event for `slug` without waiting on delivery.
    pub fn content_published(&self, slug: &str) {
        let Some(endpoint) = self.endpoint.clone() else {
            debug!(slug = %slug, "no regeneration endpoint configured; dropping event");
            return;
        };

        let payload = serde_json::json!({
            "event": "content.published",
            "slug": slug,
            "timestamp": chrono::Utc::now().timestamp(),
        });
        let body = payload.to_string();
        let signature = self.secret.as_deref().and_then(|s| sign_payload(s, &body));

        let client = self.client.clone();
        let slug = slug.to_string();

        tokio::spawn(async move {
            let mut request = client
                .post(&endpoint)
                .header("Content-Type", "application/json");

            if let Some(sig) = signature {
                request = request.header("X-Regen-Signature", format!("sha256={sig}"));
            }

            match request.body(body).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(slug = %slug, "regeneration event delivered");
                }
                Ok(response) => {
                    warn!(
                        slug = %slug,
                        status = %response.status(),
                        "regeneration endpoint rejected event"
                    );
                }
                Err(e) => {
                    warn!(slug = %slug, error = %e, "regeneration event delivery failed");
                }
            }
        });
    }
}

/// Hex HMAC-SHA256 of the payload under the shared secret.
fn sign_payload(secret: &str, payload: &str) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

impl std::fmt::Debug for RegenerationNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegenerationNotifier")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
