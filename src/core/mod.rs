// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod payment;
pub mod reserver;
pub mod scheduler;
pub mod scoring;
pub mod window;

pub use filters::{matches_duration, matches_target_time, matches_weekday, slot_matches_target};
pub use matcher::{MatchResult, SlotMatcher};
pub use payment::{payment_required_message, FreeMethodPolicy};
pub use reserver::{ReservationError, ReservationTransaction, Reserver, TransactionState, MAX_RESERVATION_FAILURES};
pub use scheduler::{run_booking, AccountPlan, BookingError, Orchestrator, RunOptions};
pub use scoring::preference_rank;
pub use window::{compute_search_window, SearchWindow};
