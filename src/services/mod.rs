// Service exports
pub mod client;
pub mod endpoints;
pub mod notifier;
pub mod playtomic;

pub use client::{AccountSession, BookingClient, ClientError, Credentials};
pub use endpoints::{EndpointKind, EndpointSelector, EndpointTarget, PaymentEndpoint};
pub use notifier::{BookingEvent, LogNotifier, Notifier, TelegramNotifier};
pub use playtomic::{PlaytomicClient, PlaytomicConfig};
