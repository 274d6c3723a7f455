use crate::models::{PaymentIntent, PaymentMethod};
use serde_json::Value;

/// Name fragments (lowercase) that mark a payment option as costing nothing
pub const DEFAULT_FREE_INDICATORS: [&str; 8] = [
    "included",
    "subscription",
    "member",
    "0 €",
    "0 eur",
    "0€",
    "pay at the club",
    "pay at club",
];

/// Decides whether a payment method is a zero-cost option
///
/// A method is free when its name contains one of the indicators
/// (case-insensitive) or one of its amount fields is numerically zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeMethodPolicy {
    indicators: Vec<String>,
}

impl Default for FreeMethodPolicy {
    fn default() -> Self {
        Self {
            indicators: DEFAULT_FREE_INDICATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FreeMethodPolicy {
    /// Built-in indicators plus venue-specific ones
    pub fn with_extra_indicators<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut policy = Self::default();
        policy.indicators.extend(
            extra
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        );
        policy
    }

    pub fn indicators(&self) -> &[String] {
        &self.indicators
    }

    pub fn is_free(&self, method: &PaymentMethod) -> bool {
        let name = method.name.as_deref().unwrap_or("").trim().to_lowercase();
        if self.indicators.iter().any(|i| name.contains(i.as_str())) {
            return true;
        }

        [&method.amount, &method.total, &method.price]
            .into_iter()
            .flatten()
            .any(is_numeric_zero)
    }

    /// First free method on the intent, if any
    pub fn select<'a>(&self, methods: &'a [PaymentMethod]) -> Option<&'a PaymentMethod> {
        methods.iter().find(|m| self.is_free(m))
    }
}

fn is_numeric_zero(value: &Value) -> bool {
    value.as_f64() == Some(0.0)
}

fn as_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Amount the booking would cost, from the intent or else from its methods
fn requested_amount(intent: &PaymentIntent) -> Option<&Value> {
    [&intent.total_amount, &intent.amount, &intent.total, &intent.price]
        .into_iter()
        .flatten()
        .next()
        .or_else(|| {
            intent
                .available_payment_methods
                .iter()
                .flat_map(|m| [&m.amount, &m.total, &m.price])
                .flatten()
                .next()
        })
}

fn format_amount(amount: f64, currency: &str) -> String {
    format!("{:.2} {}", amount, currency).replace(".00", "")
}

/// Explains why a booking was skipped when no free method was offered
pub fn payment_required_message(intent: &PaymentIntent) -> String {
    let currency = intent.currency.as_deref().unwrap_or("EUR");
    let amount = requested_amount(intent)
        .and_then(as_amount)
        .map(|a| format_amount(a, currency))
        .unwrap_or_else(|| "a non-zero amount".to_string());

    format!(
        "Booking requires payment ({}) and a payment method. Only 0 EUR bookings are automated. \
         Select a 0 EUR option (e.g. subscription, included, pay at the club) in the app or book manually.",
        amount
    )
}
