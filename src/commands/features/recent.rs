use teloxide::{prelude::*, types::ParseMode};

use crate::app_context::AppContext;
use crate::journal::AlertRecord;

use super::super::helpers::as_html_block;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 50;

pub(crate) async fn handle_recent(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
    query: &str,
) -> ResponseResult<()> {
    let Some(limit) = parse_limit(query) else {
        bot.send_message(
            msg.chat.id,
            as_html_block(
                "Recent alerts",
                &format!("Invalid limit. Usage:\n/recent\n/recent 5 (max {})", MAX_LIMIT),
            ),
        )
        .parse_mode(ParseMode::Html)
        .await?;
        return Ok(());
    };

    if !app_context.journal.is_enabled() {
        bot.send_message(
            msg.chat.id,
            as_html_block("Recent alerts", "The alert journal is disabled."),
        )
        .parse_mode(ParseMode::Html)
        .await?;
        return Ok(());
    }

    let records = app_context.journal.recent(limit);
    let body = if records.is_empty() {
        "No alerts journaled yet.".to_string()
    } else {
        format_records(&records)
    };

    bot.send_message(msg.chat.id, as_html_block("Recent alerts", &body))
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

fn parse_limit(query: &str) -> Option<usize> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Some(DEFAULT_LIMIT);
    }

    match trimmed.parse::<usize>() {
        Ok(limit) if (1..=MAX_LIMIT).contains(&limit) => Some(limit),
        _ => None,
    }
}

fn format_records(records: &[AlertRecord]) -> String {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            format!(
                "{}. {} [{}] CPU {:.1}% | RAM {:.1}% | score {:.2}\n   {}",
                index + 1,
                record.timestamp,
                record.severity,
                record.metrics.cpu_usage,
                record.metrics.ram_usage,
                record.score,
                record.message.replace('\n', " / ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_LIMIT, format_records, parse_limit};
    use crate::detector::Verdict;
    use crate::dispatch::{Alert, Severity};
    use crate::journal::AlertRecord;
    use crate::monitor::MetricsSnapshot;

    #[test]
    fn limit_defaults_and_bounds() {
        assert_eq!(parse_limit(""), Some(DEFAULT_LIMIT));
        assert_eq!(parse_limit(" 5 "), Some(5));
        assert_eq!(parse_limit("0"), None);
        assert_eq!(parse_limit("51"), None);
        assert_eq!(parse_limit("6h"), None);
    }

    #[test]
    fn records_render_one_entry_each() {
        let record = AlertRecord::new(
            &Alert::new("line one\nline two", Severity::Critical),
            Verdict::Anomalous,
            0.91,
            MetricsSnapshot::from_row([95.0, 50.0, 40.0, 300.0, 1.0, 2.0, 0.0, 40.0]),
        );

        let text = format_records(&[record]);
        assert!(text.starts_with("1. "));
        assert!(text.contains("[critical] CPU 95.0% | RAM 50.0% | score 0.91"));
        assert!(text.contains("line one / line two"));
    }
}
