//! Column readers for Strata stripes.
//!
//! A stripe holds the streams of every column for a range of rows. This crate
//! pairs a query-facing (requested) type tree with the on-disk (file) type
//! tree, validates the projection against the stripe's column selection and
//! builds a tree of [`read::column_reader::ColumnReader`]s that decode the
//! requested rows into [`strata_sequence`] sequences.
//!
//! The main entry points are:
//! - [`read::column_reader::build_reader`]: the recursive reader factory
//! - [`read::row_reader::StripeRowReader`]: frames of top-level fields with
//!   optional row filtering
//! - [`read::stripe_streams::StripeStreams`]: the stream source a stripe
//!   implementation provides

pub mod config;
pub mod read;

#[cfg(test)]
mod tests;
