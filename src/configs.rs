use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::context::Environment;

#[derive(Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(Clone, Deserialize)]
pub struct LogConfig {
    pub level: String,
    /// When set, log lines go to a daily-rolling file in this directory instead of stdout.
    #[serde(default)]
    pub directory: Option<String>,
    /// Request paths excluded from the access log.
    #[serde(default)]
    pub skip_paths: Vec<String>,
}

#[derive(Deserialize)]
pub struct Config {
    pub app: HttpServerConfig,
    pub log: LogConfig,
}

/// App environment. Defaults to dev (local/dev) if no env is specified.
pub fn current_environment() -> Environment {
    std::env::var("REQID_ENV")
        .unwrap_or_else(|_| "dev".into())
        .try_into()
        .expect("REQID_ENV env variable is not an accepted environment")
}

pub fn load_config() -> Result<Config, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Could not determine current directory");
    let config_path = base_path.join("config");

    // load config filename for set REQID_ENV environment
    let env = current_environment();
    let env_config_file = format!("{}.yml", env.as_str());

    // Initialise the configurations
    let config = config::Config::builder()
        // Add base configuration values from a file named `app.yaml`.
        .add_source(config::File::from(config_path.join("app.yaml")))
        // Add configuration values from the environment specific file
        .add_source(config::File::from(config_path.join(env_config_file)))
        // Add configurations set from the exported environment
        .add_source(
            config::Environment::with_prefix("REQID")
                .prefix_separator("_")
                .separator("-"),
        )
        .build()?;

    // Try converting the configuration values into our Config type
    config.try_deserialize::<Config>()
}
