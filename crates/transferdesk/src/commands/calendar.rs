//! Calendar command handler: month grid plus a previewed selection.

use std::fmt::Write as _;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use transferdesk_core::{CalendarCell, LoadState, ReservationCalendar, SelectionState};

use crate::cli::{CalendarArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::{RestPortal, util};

// ── Structured view ─────────────────────────────────────────────────

#[derive(Serialize)]
struct CalendarView {
    selection: SelectionState,
    status: Option<String>,
    weeks: Vec<[Option<CalendarCell>; 7]>,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    portal: &RestPortal,
    args: CalendarArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let from = args.from.unwrap_or_else(util::today);

    let spinner = output::spinner("Loading availability...", global.quiet);
    let loaded = portal.load_availability(from).await;
    spinner.finish_and_clear();
    loaded?;

    for date in [args.start, args.end].into_iter().flatten() {
        let before = portal.selection().await;
        portal.click_day(date).await?;
        if portal.selection().await == before {
            output::notify(&format!("{date} is fully booked, click ignored"), global.quiet);
        }
    }

    let LoadState::Ready(calendar) = portal.calendar().await else {
        return Err(CliError::ApiError {
            code: "internal".into(),
            message: "availability is not loaded".into(),
        });
    };

    let view = CalendarView {
        selection: calendar.selection(),
        status: calendar.status_line(),
        weeks: calendar.weeks(),
    };
    let color = output::should_color(&global.color);
    let out = match global.output {
        OutputFormat::Table => render_grid(&calendar, color),
        _ => output::render_single(
            &global.output,
            &view,
            |_| String::new(),
            |v| v.status.clone().unwrap_or_default(),
        ),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Grid rendering ──────────────────────────────────────────────────

fn render_grid(calendar: &ReservationCalendar, color: bool) -> String {
    let mut out = String::new();
    let mut month: Option<(i32, u32)> = None;

    for week in calendar.weeks() {
        let first = week.iter().flatten().map(|c| c.day.date).next();
        if let Some(date) = first {
            // Label a month when a week contains its first day.
            let label_date = week
                .iter()
                .flatten()
                .map(|c| c.day.date)
                .find(|d| d.day() == 1 || month.is_none())
                .unwrap_or(date);
            let key = (label_date.year(), label_date.month());
            if month != Some(key) {
                month = Some(key);
                let _ = writeln!(out, "\n{}", month_label(label_date));
                let _ = writeln!(out, " Sun  Mon  Tue  Wed  Thu  Fri  Sat");
            }
        }
        let line: Vec<String> = week.iter().map(|cell| render_cell(cell.as_ref(), color)).collect();
        let _ = writeln!(out, "{}", line.join(" ").trim_end());
    }

    let _ = writeln!(out, "\n [dd] selected   dd x fully booked");
    if let Some(status) = calendar.status_line() {
        let _ = write!(out, "{status}");
    } else {
        let _ = write!(out, "Click a start date to begin a selection");
    }
    out.trim_start().to_owned()
}

fn render_cell(cell: Option<&CalendarCell>, color: bool) -> String {
    let Some(cell) = cell else {
        return "    ".into();
    };
    let day = cell.day.date.day();
    if cell.selected {
        return format!("[{day:02}]");
    }
    if cell.day.is_available {
        output::availability_mark(&format!(" {day:02} "), true, color)
    } else {
        output::availability_mark(&format!(" {day:02}x"), false, color)
    }
}

fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use transferdesk_core::AvailabilityDay;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> ReservationCalendar {
        // 2025-03-01 is a Saturday.
        let days = (1..=5)
            .map(|d| {
                if d == 3 {
                    AvailabilityDay::unavailable(date(2025, 3, d))
                } else {
                    AvailabilityDay::new(date(2025, 3, d), 2)
                }
            })
            .collect();
        ReservationCalendar::new(days)
    }

    #[test]
    fn grid_marks_booked_and_selected_days() {
        let mut cal = calendar();
        cal.click_day(date(2025, 3, 4));
        cal.click_day(date(2025, 3, 5));
        let grid = render_grid(&cal, false);

        assert!(grid.starts_with("March 2025"), "{grid}");
        assert!(grid.contains(" 03x"));
        assert!(grid.contains("[04]"));
        assert!(grid.contains("[05]"));
        assert!(grid.contains(" 01 "));
        assert!(grid.ends_with("Selected period: 2025-03-04 to 2025-03-05"));
    }

    #[test]
    fn empty_selection_prompts_for_start() {
        let grid = render_grid(&calendar(), false);
        assert!(grid.ends_with("Click a start date to begin a selection"));
    }

    #[test]
    fn first_week_is_padded_to_saturday() {
        let grid = render_grid(&calendar(), false);
        let first_row = grid.lines().nth(2).unwrap();
        assert!(first_row.starts_with("    "), "{first_row:?}");
        assert!(first_row.trim() == "01");
    }
}
