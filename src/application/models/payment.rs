use crate::application::models::course::Course;
use crate::application::models::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Vnpay,
    Momo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: i64,
    pub user: User,
    pub course: Course,
    /// Decimal amount, serialized by the backend as a string.
    pub amount: String,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub transaction_id: String,
    pub created_at: DateTime<Utc>,
}

/// Body for initiating a payment. Settlement happens server-side; the
/// response carries the gateway redirect URL the UI must follow.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    pub course: i64,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInitiation {
    pub payment: Payment,
    /// Gateway checkout URL to redirect the user to.
    pub payment_url: String,
}
