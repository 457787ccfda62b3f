use crate::app_context::AppContext;
use crate::monitor::MonitorServices;

mod config_reload;
mod monitor;
mod schedules;

pub fn start_background_jobs(app_context: AppContext, services: MonitorServices) {
    monitor::start_monitor_job(app_context.clone(), services);
    config_reload::start_config_hot_reload_job(app_context.clone());

    if app_context.journal.is_enabled() {
        schedules::start_maintenance_job(app_context.journal.clone());
    }
}
