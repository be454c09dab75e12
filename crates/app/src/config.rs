//! Runner configuration

use std::path::PathBuf;

/// Environment variable naming a scenario file
pub const SCENARIO_ENV_VAR: &str = "SURGERY_SCENARIO";

/// Where the scripted steps come from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScenarioSource {
    /// Incise, dissect and stitch until healed
    #[default]
    BuiltIn,
    /// JSON scenario file
    File(PathBuf),
}

impl ScenarioSource {
    /// First command-line argument, then `SURGERY_SCENARIO`, then built-in
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::args().nth(1),
            std::env::var(SCENARIO_ENV_VAR).ok(),
        )
    }

    fn resolve(arg: Option<String>, env: Option<String>) -> Self {
        arg.or(env)
            .filter(|path| !path.is_empty())
            .map(|path| Self::File(PathBuf::from(path)))
            .unwrap_or_default()
    }
}
