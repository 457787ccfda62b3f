use teloxide::prelude::*;

use crate::app_context::AppContext;

use super::command_def::DoctorCommands;
use super::features::{
    alerts::{handle_alerts, handle_mute, handle_unmute},
    forecast::handle_forecast,
    health::{handle_health, handle_help},
    recent::handle_recent,
    status::handle_status,
};

pub(super) async fn route_command(
    bot: Bot,
    msg: Message,
    cmd: DoctorCommands,
    app_context: &AppContext,
) -> ResponseResult<()> {
    match cmd {
        DoctorCommands::Help => handle_help(&bot, &msg).await?,
        DoctorCommands::Status => handle_status(&bot, &msg, app_context).await?,
        DoctorCommands::Alerts => handle_alerts(&bot, &msg, app_context).await?,
        DoctorCommands::Recent(query) => handle_recent(&bot, &msg, app_context, &query).await?,
        DoctorCommands::Forecast => handle_forecast(&bot, &msg, app_context).await?,
        DoctorCommands::Health => handle_health(&bot, &msg, app_context).await?,
        DoctorCommands::Mute(duration_str) => {
            handle_mute(&bot, &msg, app_context, &duration_str).await?
        }
        DoctorCommands::Unmute => handle_unmute(&bot, &msg, app_context).await?,
    }

    Ok(())
}
