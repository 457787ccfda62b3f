mod alert;
mod dispatcher;
mod sinks;
mod worker;

pub use alert::{ALERT_TITLE, Alert, AlertPlan, Severity};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use sinks::{AlertSink, DesktopSink, DialogSink, SinkError, SpeechSink, TelegramSink};
pub use worker::SinkWorkerPool;
