//! Padel Booker - automated court booking for Playtomic venues
//!
//! This library provides the booking engine: it computes the date window to
//! search, ranks the free slots against the account's preferences and books
//! the best one through a zero-cost payment method.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{compute_search_window, run_booking, FreeMethodPolicy, Orchestrator, RunOptions, SlotMatcher};
pub use crate::models::{AvailabilityEntry, Candidate, Preferences, Slot, Tenant};
pub use crate::services::{BookingClient, PlaytomicClient};
