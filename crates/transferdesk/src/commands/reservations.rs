//! Reservation list and moderation command handlers.

use tabled::Tabled;

use transferdesk_core::{ListState, ModerationAction, PackageReservation, ReservationId};

use crate::cli::{GlobalOpts, OutputFormat, ReservationsArgs, ReservationsCommand};
use crate::error::CliError;
use crate::output;

use super::{RestPortal, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ReservationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Requested")]
    requested: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

impl ReservationRow {
    fn new(r: &PackageReservation, color: bool) -> Self {
        Self {
            id: util::short_id(r.id.as_str()),
            title: r.title.clone(),
            period: period_text(r),
            status: output::status_badge(r.status, color),
            requested: r
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            notes: r.observation.clone().unwrap_or_default(),
        }
    }
}

fn period_text(r: &PackageReservation) -> String {
    r.period()
        .map_or_else(|| format!("{} to {}", r.start_date, r.end_date), |p| p.to_string())
}

fn detail(r: &PackageReservation, color: bool) -> String {
    let mut lines = vec![
        format!("ID:        {}", r.id),
        format!("Title:     {}", r.title),
        format!("Period:    {}", period_text(r)),
        format!("Status:    {}", output::status_badge(r.status, color)),
    ];
    if let Some(created) = r.created_at {
        lines.push(format!("Requested: {}", created.format("%Y-%m-%d %H:%M")));
    }
    if let Some(ref notes) = r.observation {
        lines.push(format!("Notes:     {notes}"));
    }
    if let Some(ref vehicle) = r.vehicle_id {
        lines.push(format!("Vehicle:   {vehicle}"));
    }
    if let Some(ref driver) = r.driver_id {
        lines.push(format!("Driver:    {driver}"));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    portal: &RestPortal,
    args: ReservationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        ReservationsCommand::List => {
            let spinner = output::spinner("Loading reservations...", global.quiet);
            let state = portal.refresh_reservations().await;
            spinner.finish_and_clear();

            match &state {
                ListState::Failed(message) => {
                    return Err(CliError::ApiError {
                        code: "list_failed".into(),
                        message: message.clone(),
                    });
                }
                ListState::Empty | ListState::Loading
                    if matches!(global.output, OutputFormat::Table) =>
                {
                    output::notify("No reservation requests yet", global.quiet);
                    return Ok(());
                }
                _ => {}
            }

            let out = output::render_list(
                &global.output,
                state.rows(),
                |r| ReservationRow::new(r, color),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReservationsCommand::Get { id } => {
            let reservation = portal
                .service()
                .get_reservation(&ReservationId::from(id))
                .await?;
            let out = output::render_single(
                &global.output,
                &reservation,
                |r| detail(r, color),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReservationsCommand::Confirm { id } => {
            moderate(portal, id, ModerationAction::Confirm, global, color).await
        }

        ReservationsCommand::Cancel { id } => {
            if !util::confirm(&format!("Cancel reservation {id}?"), global.yes)? {
                return Ok(());
            }
            moderate(portal, id, ModerationAction::Cancel, global, color).await
        }
    }
}

async fn moderate(
    portal: &RestPortal,
    id: String,
    action: ModerationAction,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    let updated = portal.moderate(&ReservationId::from(id), action).await?;
    output::notify(
        &format!("Reservation {} is now {}", updated.id, updated.status.label()),
        global.quiet,
    );
    let out = output::render_single(
        &global.output,
        &updated,
        |r| detail(r, color),
        |r| r.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
