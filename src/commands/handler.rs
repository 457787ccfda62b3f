use teloxide::prelude::*;

use super::command_def::DoctorCommands;
use super::helpers::{acquire_command_slot, is_authorized};
use super::router::route_command;
use crate::app_context::AppContext;

pub async fn answer(
    bot: Bot,
    msg: Message,
    cmd: DoctorCommands,
    app_context: &AppContext,
) -> ResponseResult<()> {
    let config = &app_context.config;
    if !is_authorized(&msg, config) {
        let owner_user_id = config
            .owner_user_id()
            .map(|id| id.0.to_string())
            .unwrap_or_else(|_| "invalid_owner_id".to_string());
        let user_id = msg
            .from()
            .map(|user| user.id.0.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        log::warn!(
            "unauthorized_command mode=owner_dm_only expected_user_id={} user_id={} chat_id={} command_text={:?}",
            owner_user_id,
            user_id,
            msg.chat.id.0,
            msg.text()
        );
        return Ok(());
    }

    let Some(_permit) = acquire_command_slot(&app_context.command_slots, &msg, &bot).await? else {
        return Ok(());
    };
    route_command(bot, msg, cmd, app_context).await
}
