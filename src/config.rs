use filesdr_driver::Kwargs;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    pub log_level: Option<String>,
    pub args: Kwargs,
}

impl ProbeConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config '{}': {e}", path.display()))?;
        Self::parse(&text).map_err(|e| format!("Invalid config '{}': {e}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Device args from the file with command-line args layered on top.
    pub fn device_args(&self, cli: Option<&str>) -> Kwargs {
        let mut args = self.args.clone();
        if let Some(cli) = cli {
            args.merge(&Kwargs::parse(cli));
        }
        args
    }
}
