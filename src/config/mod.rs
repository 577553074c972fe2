mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{DispatcherSettings, LoggingSettings, Settings};

/// Prefix of environment variables read by `load_config`.
pub const ENV_PREFIX: &str = "NEWSLETTER";

/// Loads the configuration from the optional `config/default` file and from
/// environment variables, then merges it over the default values.
///
/// Environment keys use `__` between sections, for example
/// `NEWSLETTER_DISPATCHER__TOPICS=Tech,Travel` or `NEWSLETTER_LOGGING__LEVEL=debug`.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("dispatcher.topics"),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    let default = Settings::default();

    Ok(Settings {
        dispatcher: DispatcherSettings {
            topics: partial
                .dispatcher
                .and_then(|d| d.topics)
                .map(|topics| {
                    topics
                        .into_iter()
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect()
                })
                .unwrap_or(default.dispatcher.topics),
        },
        logging: LoggingSettings {
            level: partial
                .logging
                .and_then(|l| l.level)
                .unwrap_or(default.logging.level),
        },
    })
}
