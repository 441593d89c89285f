//! Request-level entry points: resolve, filter, then shape and persist the
//! reports.
//!
//! Every entry point recomputes from the dataset it is given. Reports are
//! computed in full before anything is written, so a failing request leaves
//! no output behind.

use std::path::Path;

use tracing::{info, instrument};

use crate::analysis::filter::select_active;
use crate::analysis::occupancy::daily_totals;
use crate::analysis::report::format_active_bookings;
use crate::analysis::resolver::resolve;
use crate::analysis::types::{ActiveBookingsTable, DailyGuestTotal, ResolvedReservation};
use crate::config::AnalysisRequest;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::output::{write_active_bookings, write_daily_totals};

/// Both reports of one analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReports {
    pub active_bookings: ActiveBookingsTable,
    pub daily_totals: Vec<DailyGuestTotal>,
}

/// Resolves every reservation and keeps the active ones.
pub fn active_reservations(
    dataset: &Dataset,
    request: &AnalysisRequest,
) -> Result<Vec<ResolvedReservation>> {
    let resolved = resolve(dataset)?;
    Ok(select_active(&resolved, &request.window))
}

pub fn active_bookings_report(
    dataset: &Dataset,
    request: &AnalysisRequest,
) -> Result<ActiveBookingsTable> {
    let active = active_reservations(dataset, request)?;
    Ok(format_active_bookings(dataset.headers(), &active))
}

pub fn total_guests_report(
    dataset: &Dataset,
    request: &AnalysisRequest,
) -> Result<Vec<DailyGuestTotal>> {
    let active = active_reservations(dataset, request)?;
    daily_totals(&active, dataset.headers(), &request.window, request.options)
}

/// Computes both reports from a single resolution pass.
pub fn analyze(dataset: &Dataset, request: &AnalysisRequest) -> Result<AnalysisReports> {
    let active = active_reservations(dataset, request)?;
    let daily_totals = daily_totals(&active, dataset.headers(), &request.window, request.options)?;
    Ok(AnalysisReports {
        active_bookings: format_active_bookings(dataset.headers(), &active),
        daily_totals,
    })
}

/// Loads the request's dataset and writes the active-bookings report to `output`.
#[instrument(skip_all, fields(dataset = %request.dataset.display(), date = %request.selected_date()))]
pub fn run_active_bookings(
    request: &AnalysisRequest,
    output: impl AsRef<Path>,
) -> Result<ActiveBookingsTable> {
    let dataset = Dataset::load(&request.dataset)?;
    let table = active_bookings_report(&dataset, request)?;
    write_active_bookings(&output, &table)?;

    info!(
        active = table.len(),
        output = %output.as_ref().display(),
        "Active bookings report written"
    );
    Ok(table)
}

/// Loads the request's dataset and writes the guest-totals report to `output`.
#[instrument(skip_all, fields(dataset = %request.dataset.display(), date = %request.selected_date()))]
pub fn run_total_guests(
    request: &AnalysisRequest,
    output: impl AsRef<Path>,
) -> Result<Vec<DailyGuestTotal>> {
    let dataset = Dataset::load(&request.dataset)?;
    let totals = total_guests_report(&dataset, request)?;
    write_daily_totals(&output, &totals)?;

    info!(
        days = totals.len(),
        output = %output.as_ref().display(),
        "Guest totals report written"
    );
    Ok(totals)
}

/// Loads the request's dataset, computes both reports and only then writes them.
#[instrument(skip_all, fields(dataset = %request.dataset.display(), date = %request.selected_date()))]
pub fn run_analysis(
    request: &AnalysisRequest,
    active_output: impl AsRef<Path>,
    totals_output: impl AsRef<Path>,
) -> Result<AnalysisReports> {
    let dataset = Dataset::load(&request.dataset)?;
    let reports = analyze(&dataset, request)?;

    write_active_bookings(&active_output, &reports.active_bookings)?;
    write_daily_totals(&totals_output, &reports.daily_totals)?;

    info!(
        rows = dataset.len(),
        active = reports.active_bookings.len(),
        days = reports.daily_totals.len(),
        "Analysis complete"
    );
    Ok(reports)
}
