use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::{
    application::models::{
        page::Page,
        payment::{Payment, PaymentInitiation, PaymentRequest},
    },
    error::ApiError,
    transport::http_client::ApiHttpClient,
};

#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Initiates a payment for a course. Settlement is server-side; the
    /// response carries the gateway URL the UI redirects to, and the
    /// result lands on the payment record once the gateway calls back.
    async fn create_payment(&self, request: &PaymentRequest)
        -> Result<PaymentInitiation, ApiError>;

    async fn get_payment(&self, id: i64) -> Result<Payment, ApiError>;

    /// The current user's payment history.
    async fn list_payments(&self, page: Option<u32>) -> Result<Page<Payment>, ApiError>;
}

pub struct PaymentServiceImpl {
    client: Arc<ApiHttpClient>,
}

impl PaymentServiceImpl {
    pub fn new(client: Arc<ApiHttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PaymentService for PaymentServiceImpl {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentInitiation, ApiError> {
        info!(
            "Initiating {:?} payment for course {}",
            request.payment_method, request.course
        );
        self.client.post("/api/payments/", request).await
    }

    async fn get_payment(&self, id: i64) -> Result<Payment, ApiError> {
        self.client.get(&format!("/api/payments/{id}/")).await
    }

    async fn list_payments(&self, page: Option<u32>) -> Result<Page<Payment>, ApiError> {
        let path = match page {
            Some(page) => format!("/api/payments/?page={page}"),
            None => "/api/payments/".to_string(),
        };
        self.client.get(&path).await
    }
}
