//! Availability command handler.

use chrono::Datelike;
use tabled::Tabled;

use transferdesk_core::{AvailabilityDay, AvailabilityProvider, Period};

use crate::cli::{AvailabilityArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{RestPortal, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Day")]
    weekday: String,
    #[tabled(rename = "Vehicles")]
    vehicles: u32,
    #[tabled(rename = "Status")]
    status: String,
}

impl DayRow {
    fn new(day: &AvailabilityDay, color: bool) -> Self {
        let label = if day.is_available {
            "Available"
        } else {
            "Fully booked"
        };
        Self {
            date: day.date.to_string(),
            weekday: day.date.weekday().to_string(),
            vehicles: day.available_vehicles,
            status: output::availability_mark(label, day.is_available, color),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    portal: &RestPortal,
    args: AvailabilityArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let from = args.from.unwrap_or_else(util::today);
    let to = match args.to {
        Some(to) => to,
        None => Period::window(from, args.window.unwrap_or(portal.window_days())).end(),
    };
    if to < from {
        return Err(CliError::Validation {
            field: "to".into(),
            reason: format!("{to} is before {from}"),
        });
    }

    let spinner = output::spinner("Checking vehicle availability...", global.quiet);
    let result = portal.provider().fetch_range(from, to).await;
    spinner.finish_and_clear();

    let mut days = result?;
    if args.available_only {
        days.retain(|d| d.is_available);
    }

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &days,
        |d| DayRow::new(d, color),
        |d| format!("{} {}", d.date, d.available_vehicles),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
