use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{CheckoutRequest, CheckoutSession, PaymentError, PaymentProcessor};

/// In-memory payment processor for tests.
/// Records every checkout request and counts calls for assertions.
#[derive(Default)]
pub struct MockPaymentProcessor {
    calls: AtomicUsize,
    requests: Mutex<Vec<CheckoutRequest>>,
    fail: Mutex<Option<(u16, String)>>,
}

#[allow(clippy::expect_used)]
impl MockPaymentProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent calls fail with an API error.
    pub fn fail_with(&self, status: u16, message: &str) {
        *self.fail.lock().expect("lock poisoned") = Some((status, message.to_string()));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// The most recent checkout request, if any.
    pub fn last_request(&self) -> Option<CheckoutRequest> {
        self.requests.lock().expect("lock poisoned").last().cloned()
    }
}

#[allow(clippy::expect_used)]
#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        self.requests
            .lock()
            .expect("lock poisoned")
            .push(request.clone());

        if let Some((status, message)) = self.fail.lock().expect("lock poisoned").clone() {
            return Err(PaymentError::Api { status, message });
        }

        let session_id = format!("cs_test_{n}");
        Ok(CheckoutSession {
            url: format!("https://checkout.stripe.com/c/pay/{session_id}"),
            session_id,
        })
    }
}
