//! Type trees, stripe stream addressing and query projections for the Strata
//! columnar stripe format.

pub mod filter;
pub mod scan_spec;
pub mod schema;
pub mod stream;
