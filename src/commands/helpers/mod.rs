mod auth;
mod control;
mod formatting;

pub(super) use auth::is_authorized;
pub(super) use control::{acquire_command_slot, parse_mute_duration};
pub(crate) use formatting::as_html_block;
pub(super) use formatting::yes_no;
