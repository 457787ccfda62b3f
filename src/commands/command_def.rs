use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum DoctorCommands {
    #[command(description = "Show help menu.")]
    Help,
    #[command(description = "Show the latest snapshot, verdict and online score.")]
    Status,
    #[command(description = "Show alert thresholds, policy and gate state.")]
    Alerts,
    #[command(description = "Show journaled alerts, e.g. /recent 5")]
    Recent(String),
    #[command(description = "Show the CPU mean and short-term forecast.")]
    Forecast,
    #[command(description = "Show polling loop liveness.")]
    Health,
    #[command(description = "Mute alerts for a duration, e.g. /mute 30m")]
    Mute(String),
    #[command(description = "Unmute alerts immediately.")]
    Unmute,
}
