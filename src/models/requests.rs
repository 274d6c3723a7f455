use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login body for both auth bases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

const ALLOWED_PAYMENT_METHOD_TYPES: [&str; 10] = [
    "OFFER",
    "CASH",
    "MERCHANT_WALLET",
    "DIRECT",
    "SWISH",
    "IDEAL",
    "BANCONTACT",
    "PAYTRAIL",
    "CREDIT_CARD",
    "QUICK_PAY",
];

/// Body of `POST /payment_intents` for a court booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    pub allowed_payment_method_types: Vec<String>,
    pub user_id: Option<String>,
    pub cart: Cart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub requested_item: RequestedItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestedItem {
    pub cart_item_type: String,
    pub cart_item_voucher_id: Option<String>,
    pub cart_item_data: CartItemData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItemData {
    pub supports_split_payment: bool,
    pub number_of_players: u8,
    pub tenant_id: String,
    pub resource_id: String,
    /// UTC, `YYYY-MM-DDTHH:MM:SS`
    pub start: String,
    /// Hours, e.g. 1.5
    pub duration: f64,
    pub match_registrations: Vec<MatchRegistration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRegistration {
    pub user_id: Option<String>,
    pub pay_now: bool,
}

impl PaymentIntentRequest {
    /// Build the cart for booking `resource_id` at `start` on behalf of `user_id`
    pub fn court_booking(
        user_id: Option<&str>,
        tenant_id: &str,
        resource_id: &str,
        start: DateTime<Utc>,
        duration_minutes: u32,
        number_of_players: u8,
    ) -> Self {
        let user_id = user_id.map(str::to_string);

        Self {
            allowed_payment_method_types: ALLOWED_PAYMENT_METHOD_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
            user_id: user_id.clone(),
            cart: Cart {
                requested_item: RequestedItem {
                    cart_item_type: "CUSTOMER_MATCH".to_string(),
                    cart_item_voucher_id: None,
                    cart_item_data: CartItemData {
                        supports_split_payment: true,
                        number_of_players,
                        tenant_id: tenant_id.to_string(),
                        resource_id: resource_id.to_string(),
                        start: start.format("%Y-%m-%dT%H:%M:%S").to_string(),
                        duration: duration_minutes as f64 / 60.0,
                        match_registrations: vec![MatchRegistration { user_id, pay_now: true }],
                    },
                },
            },
        }
    }
}

/// Body of `PATCH /payment_intents/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectPaymentMethodRequest {
    pub selected_payment_method_id: Option<String>,
    pub selected_payment_method_data: Option<serde_json::Value>,
}
