//! Authentication and clients for external services.
//!
//! - [`auth`] - Bearer session tokens and identity resolution
//! - [`stripe`] - Stripe Checkout sessions
//! - [`queue`] - Managed background job queue

pub mod auth;
pub mod queue;
pub mod stripe;

pub use auth::{AuthSession, generate_session_token, hash_token};
pub use queue::{HttpJobQueue, JobQueue, JobSnapshot, QueueError};
pub use stripe::{CheckoutRequest, CheckoutSession, PaymentError, PaymentProcessor, StripeClient};
