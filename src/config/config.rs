use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;

/// Controls what telemetry records and how the crate logs.
///
/// Every field has a default, so an absent config file yields a fully
/// working setup: monitoring enabled, no namespace prefix, stock buckets.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct MonitoringConfig {
    /// When false, every recorder is its no-op variant and nothing registers.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Optional prefix prepended to every metric name.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Latency histogram buckets in milliseconds. Defaults span 1ms to 10s.
    #[serde(default)]
    pub latency_buckets_millis: Option<Vec<f64>>,
    /// Size histogram buckets in bytes. Defaults span 64B to 4MiB.
    #[serde(default)]
    pub size_buckets_bytes: Option<Vec<f64>>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MonitoringConfig {
    /// Load from "monitoring.yaml" in the current directory, with
    /// `MONITRON_*` environment variables taking precedence (nested fields
    /// via double underscore, e.g. `MONITRON_LOGGING__LEVEL`). Hosts that
    /// embed monitron in a larger config tree deserialize
    /// `MonitoringConfig` themselves instead.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Yaml::file("./monitoring.yaml"))
            .merge(Env::prefixed("MONITRON_").split("__"))
            .extract()
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        MonitoringConfig {
            enabled: default_enabled(),
            namespace: None,
            latency_buckets_millis: None,
            size_buckets_bytes: None,
            logging: LoggingConfig::default(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Print the JSON schema for the monitoring configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(MonitoringConfig);
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}
