//! Command dispatch: bridges CLI args -> portal operations -> output formatting.

pub mod availability;
pub mod calendar;
pub mod config_cmd;
pub mod reservations;
pub mod reserve;
pub mod util;

use transferdesk_core::{Portal, RestAvailability, RestReservationStore};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Portal backed by the Supabase REST API.
pub type RestPortal = Portal<RestAvailability, RestReservationStore>;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    portal: &RestPortal,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Availability(args) => availability::handle(portal, args, global).await,
        Command::Calendar(args) => calendar::handle(portal, args, global).await,
        Command::Reserve(args) => reserve::handle(portal, args, global).await,
        Command::Reservations(args) => reservations::handle(portal, args, global).await,
        // Config and Completions are handled before a portal exists
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "this command does not talk to the backend".into(),
        }),
    }
}
