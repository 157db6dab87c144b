//! Billing routes.

use axum::{Json, extract::State};
use serde::Deserialize;
use url::Url;

use design_library_core::{PriceType, TierId};

use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::services::{CheckoutRequest, CheckoutSession};
use crate::state::AppState;

/// Body of `POST /api/stripe/checkout`.
///
/// Fields are loosely typed so that bad values produce our own messages
/// instead of a deserializer error.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutBody {
    tier_id: Option<String>,
    price_type: Option<String>,
    success_url: Option<String>,
    cancel_url: Option<String>,
}

/// Where Stripe sends the browser after checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirects {
    pub success_url: String,
    pub cancel_url: String,
}

/// Resolve the success and cancel URLs against the configured base URL.
///
/// Absent values get the defaults. Supplied values must be absolute URLs on
/// the same origin as `base`.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for unparseable or off-origin URLs.
pub fn resolve_redirects(
    base: &Url,
    success_url: Option<&str>,
    cancel_url: Option<&str>,
) -> Result<Redirects> {
    let root = base.as_str().trim_end_matches('/');

    let success_url = match success_url {
        Some(url) => same_origin(base, "success_url", url)?,
        None => format!(
            "{root}/account/billing?checkout=success&session_id={{CHECKOUT_SESSION_ID}}"
        ),
    };
    let cancel_url = match cancel_url {
        Some(url) => same_origin(base, "cancel_url", url)?,
        None => format!("{root}/pricing?checkout=cancelled"),
    };

    Ok(Redirects {
        success_url,
        cancel_url,
    })
}

fn same_origin(base: &Url, field: &str, value: &str) -> Result<String> {
    let url = Url::parse(value)
        .map_err(|_| AppError::BadRequest(format!("{field} must be an absolute URL")))?;
    if url.origin() != base.origin() {
        return Err(AppError::BadRequest(format!(
            "{field} must be on {}",
            base.origin().ascii_serialization()
        )));
    }
    // Keep the caller's text so Stripe's `{CHECKOUT_SESSION_ID}` placeholder survives.
    Ok(value.to_string())
}

/// `POST /api/stripe/checkout`
///
/// Validates the request completely before touching the database or Stripe.
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    ApiJson(body): ApiJson<CheckoutBody>,
) -> Result<Json<CheckoutSession>> {
    let price_type: PriceType = body
        .price_type
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|e: design_library_core::PriceTypeError| AppError::BadRequest(e.to_string()))?;

    let tier_id: TierId = body
        .tier_id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("tier_id is required".to_string()))?
        .parse()
        .map_err(|_| AppError::BadRequest("tier_id must be a UUID".to_string()))?;

    let redirects = resolve_redirects(
        &state.config().base_url,
        body.success_url.as_deref(),
        body.cancel_url.as_deref(),
    )?;

    let tier = state
        .backends()
        .tiers
        .get(tier_id)
        .await?
        .filter(|tier| tier.active)
        .ok_or_else(|| AppError::BadRequest("Unknown or inactive tier".to_string()))?;

    let price_id = tier.price_id(price_type).ok_or_else(|| {
        AppError::BadRequest(format!("Tier {} has no {price_type} price", tier.slug))
    })?;

    let request = CheckoutRequest {
        user_id: session.identity.id,
        customer_email: session.identity.email.clone(),
        tier_id,
        price_type,
        price_id: price_id.to_string(),
        success_url: redirects.success_url,
        cancel_url: redirects.cancel_url,
    };

    let checkout = state
        .backends()
        .payments
        .create_checkout_session(&request)
        .await?;

    tracing::info!(
        user_id = %session.identity.id,
        tier = %tier.slug,
        price_type = %price_type,
        session_id = %checkout.session_id,
        "Checkout session created"
    );

    Ok(Json(checkout))
}
