use teloxide::{prelude::*, types::ParseMode};

use crate::app_context::AppContext;
use crate::monitor::{MIN_FORECAST_SAMPLES, MonitorStatus};

use super::super::helpers::as_html_block;

pub(crate) async fn handle_forecast(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
) -> ResponseResult<()> {
    let body = forecast_body(&app_context.status(), app_context.config.forecast_horizon);

    bot.send_message(msg.chat.id, as_html_block("CPU Forecast", &body))
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

fn forecast_body(status: &MonitorStatus, horizon: usize) -> String {
    if status.history_len == 0 {
        return "No CPU samples collected yet.".to_string();
    }

    let method = if status.history_len >= MIN_FORECAST_SAMPLES {
        "trend smoothing".to_string()
    } else {
        format!(
            "mean ({} of {} samples needed for trend smoothing)",
            status.history_len, MIN_FORECAST_SAMPLES
        )
    };

    format!(
        "Samples: {}/{}\nMean CPU: {:.1}%\nForecast ({} polls ahead): {:.1}%\nMethod: {}",
        status.history_len,
        status.history_capacity,
        status.cpu_mean,
        horizon,
        status.cpu_forecast,
        method
    )
}

#[cfg(test)]
mod tests {
    use super::forecast_body;
    use crate::monitor::MonitorStatus;

    #[test]
    fn forecast_explains_method_by_sample_count() {
        let mut status = MonitorStatus::new(5);
        assert_eq!(forecast_body(&status, 5), "No CPU samples collected yet.");

        status.history_len = 4;
        status.cpu_mean = 20.0;
        status.cpu_forecast = 20.0;
        assert!(forecast_body(&status, 5).contains("mean (4 of 10 samples"));

        status.history_len = 12;
        status.history_capacity = 30;
        status.cpu_forecast = 33.4;
        let body = forecast_body(&status, 5);
        assert!(body.contains("Forecast (5 polls ahead): 33.4%"));
        assert!(body.contains("Samples: 12/30"));
        assert!(body.contains("Method: trend smoothing"));
    }
}
