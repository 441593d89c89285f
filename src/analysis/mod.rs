//! Booking analysis.
//!
//! Raw reservation rows are resolved into stay intervals, filtered down to
//! the bookings active within an analysis window, and then either shaped
//! into the active-bookings report or expanded into per-day guest totals.

pub mod filter;
pub mod occupancy;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod types;
