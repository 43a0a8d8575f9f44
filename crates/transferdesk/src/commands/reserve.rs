//! Reserve command handler.
//!
//! Drives the two-click selection against live availability, then
//! submits the completed period as a pending request.

use serde::Serialize;

use transferdesk_core::{Period, ReservationStatus};

use crate::cli::{GlobalOpts, ReserveArgs};
use crate::error::CliError;
use crate::output;

use super::{RestPortal, util};

#[derive(Serialize)]
struct Submitted {
    id: String,
    title: String,
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
    status: ReservationStatus,
}

pub async fn handle(
    portal: &RestPortal,
    args: ReserveArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let start = args.start;
    let end = args.end.unwrap_or(start);
    if end < start {
        return Err(CliError::Validation {
            field: "end".into(),
            reason: format!("{end} is before {start}"),
        });
    }
    if args.title.trim().is_empty() {
        return Err(CliError::Validation {
            field: "title".into(),
            reason: "title must not be empty".into(),
        });
    }

    let from = args.from.unwrap_or_else(util::today);
    let spinner = output::spinner("Loading availability...", global.quiet);
    let loaded = portal.load_availability(from).await;
    spinner.finish_and_clear();
    loaded?;

    let window = Period::window(from, portal.window_days());
    portal.click_day(start).await?;
    if portal.selection().await.start() != Some(start) {
        return Err(unavailable(start, window));
    }
    let Some(period) = portal.click_day(end).await? else {
        return Err(unavailable(end, window));
    };

    let quiet = global.quiet;
    portal
        .on_submitted(move |id| {
            output::notify(&format!("Reservation request {id} sent"), quiet);
        })
        .await;

    let spinner = output::spinner("Submitting reservation...", global.quiet);
    let submitted = portal
        .submit(&args.title, args.observation.as_deref())
        .await;
    spinner.finish_and_clear();
    let id = submitted?;

    let view = Submitted {
        id: id.to_string(),
        title: args.title.trim().to_owned(),
        start_date: period.start(),
        end_date: period.end(),
        status: ReservationStatus::Pending,
    };
    let out = output::render_single(
        &global.output,
        &view,
        |v| {
            format!(
                "ID:      {}\nTitle:   {}\nPeriod:  {period}\nStatus:  {}",
                v.id,
                v.title,
                output::status_badge(v.status, output::should_color(&global.color)),
            )
        },
        |v| v.id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn unavailable(date: chrono::NaiveDate, window: Period) -> CliError {
    let message = if window.contains(date) {
        format!("no vehicles are free on {date}")
    } else {
        format!("{date} is outside the bookable window ({window})")
    };
    CliError::DateUnavailable { message }
}
