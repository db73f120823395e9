//! Order desk: compose purchase-order drafts and filter existing orders.
//!
//! The domain layer ([`domain`], [`filter`]) is synchronous and pure over
//! fetched snapshots. Data services are reached through the async traits in
//! [`providers`].

pub mod domain;
pub mod event_sourcing;
pub mod filter;
pub mod metrics;
pub mod providers;
pub mod settings;
pub mod utils;
