//! Selects the bookings that occupy rooms within the analysis window.

use tracing::debug;

use crate::analysis::types::{AnalysisWindow, ResolvedReservation};

/// A booking is active unless it is cancelled, has already ended on or
/// before the window start, or only begins after the window end.
pub fn is_active(reservation: &ResolvedReservation, window: &AnalysisWindow) -> bool {
    let outside =
        reservation.leaving_date <= window.start() || reservation.arrival_date > window.end();
    !outside && !reservation.is_canceled
}

/// Returns the active bookings in their original order.
///
/// An empty result is a normal outcome, not an error.
pub fn select_active(
    reservations: &[ResolvedReservation],
    window: &AnalysisWindow,
) -> Vec<ResolvedReservation> {
    let active: Vec<_> = reservations
        .iter()
        .filter(|r| is_active(r, window))
        .cloned()
        .collect();

    debug!(
        total = reservations.len(),
        active = active.len(),
        window_start = %window.start(),
        window_end = %window.end(),
        "Active bookings selected"
    );
    active
}
