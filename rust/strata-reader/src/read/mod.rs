//! Stripe access.

pub mod column_reader;
pub mod column_selector;
pub mod params;
mod presence;
pub mod row_reader;
pub mod stripe_streams;
