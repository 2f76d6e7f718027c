use serde::{Deserialize, Serialize};

use crate::interceptor::ActionLogLevel;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Action log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Install the action log interceptor (default: false).
    #[serde(default)]
    pub enabled: bool,
    /// Level of the event emitted per action (default: info).
    #[serde(default)]
    pub level: ActionLogLevel,
    /// Category attached to every action event (default: "unistore").
    #[serde(default = "default_category")]
    pub category: String,
}

/// Lifecycle anomaly reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Report ignored protocol violations as warnings (default: true).
    #[serde(default = "default_report_anomalies")]
    pub report_anomalies: bool,
}

fn default_category() -> String {
    "unistore".to_string()
}

fn default_report_anomalies() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: ActionLogLevel::default(),
            category: default_category(),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            report_anomalies: default_report_anomalies(),
        }
    }
}
