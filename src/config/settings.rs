use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for both the dispatcher and logging.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    pub dispatcher: DispatcherSettings,
    pub logging: LoggingSettings,
}

/// Configuration settings for the dispatcher.
///
/// `topics` are the newsletters created at startup.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DispatcherSettings {
    pub topics: Vec<String>,
}

/// Configuration settings for logging.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub dispatcher: Option<PartialDispatcherSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialDispatcherSettings {
    pub topics: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dispatcher: DispatcherSettings {
                topics: vec![
                    "Tech".to_string(),
                    "Travel".to_string(),
                    "Fashion".to_string(),
                ],
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}
