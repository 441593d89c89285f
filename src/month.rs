//! Month-name parsing.
//!
//! Arrival months arrive as full English names ("July"). They are resolved
//! once into [`chrono::Month`], which carries both the month number and the
//! canonical name (`Month::name`), so the active-bookings report never
//! re-parses them.

use chrono::Month;

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Parses a full English month name, ignoring case and surrounding whitespace.
///
/// Abbreviations ("Jul") are rejected.
pub fn parse_month_name(value: &str) -> Option<Month> {
    let value = value.trim();
    MONTHS
        .iter()
        .copied()
        .find(|m| m.name().eq_ignore_ascii_case(value))
}
