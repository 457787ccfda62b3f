mod defaults;
mod io;
mod schema;
mod validate;

pub use io::{load_config, load_config_or_default};
pub use schema::{
    Alerts, Config, CpuBreachAction, Fallbacks, Journal, ModelConfig, OnlineScorerConfig, Policy,
    RamBreachAction, RuntimeConfig, Simulation, Sinks, Telegram,
};
pub use validate::ConfigError;
