//! Checkout services: the working-copy protocol (checkout, draft saves,
//! check-in, discard) and the stale-checkout query.

pub mod checkin;
pub mod service;

pub use checkin::{CheckInRequest, ContentSource, NewContent};
pub use service::{CheckoutService, DraftMetadataUpdate};
