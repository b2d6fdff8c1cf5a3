use std::{convert::Infallible, str::FromStr};

use envconfig::{Envconfig, Error as EnvconfigError};
use tracedump::{HarnessConfig, ReportMode};

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(from = "TRACEDUMP_MODULE", default = "IPython")]
    pub module: String,

    /// Comma-separated `sys.argv` entries.
    #[envconfig(from = "TRACEDUMP_ARGV", default = "python")]
    pub argv: ArgvList,

    #[envconfig(from = "TRACEDUMP_SENTINEL", default = "NULL")]
    pub sentinel: String,

    #[envconfig(from = "TRACEDUMP_MODE", default = "format_and_delegate")]
    pub mode: ReportMode,
}

impl Config {
    /// Builds the harness config, `module` taking precedence over `TRACEDUMP_MODULE`.
    pub fn into_harness_config(self, module: Option<String>) -> HarnessConfig {
        HarnessConfig {
            module: module.unwrap_or(self.module),
            argv: self.argv.0,
            sentinel: self.sentinel,
            mode: self.mode,
        }
    }
}

/// Harness config from the environment, falling back to the defaults when the
/// environment is invalid so the import still runs and the exit status stays 0.
pub fn harness_config(env: Result<Config, EnvconfigError>, module: Option<String>) -> HarnessConfig {
    match env {
        Ok(config) => config.into_harness_config(module),
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration, using defaults");
            let defaults = HarnessConfig::default();
            HarnessConfig {
                module: module.unwrap_or(defaults.module),
                ..defaults
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgvList(pub Vec<String>);

impl FromStr for ArgvList {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.split(',').map(str::to_owned).collect()))
    }
}
