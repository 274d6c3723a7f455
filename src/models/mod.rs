// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AvailabilityEntry, Candidate, PaymentIntent, PaymentMethod, Preferences, ReservationRecord,
    ReservationResult, ReservationSummary, Slot, Tenant,
};
pub use requests::{LoginRequest, PaymentIntentRequest, SelectPaymentMethodRequest};
pub use responses::LoginResponse;
