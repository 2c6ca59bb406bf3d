use serde::{Deserialize, Serialize};

use crate::connections::types::ConParams;
use crate::core::config::SdkConfig;

/// A user-named connection preset.
///
/// JSON looks like:
/// `{ "name":"rig-a", "instance":0, "con_params":{"inst-addr":"192.168.137.128"}, "config":{"get_continuous":true} }`
/// Omitted fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub name: String,
    #[serde(default)]
    pub instance: u32,
    #[serde(default)]
    pub con_params: ConParams,
    #[serde(default)]
    pub config: SdkConfig,
}

impl ConnectionProfile {
    /// A profile with default parameters and configuration.
    pub fn new(name: impl Into<String>) -> Self {
        ConnectionProfile {
            name: name.into(),
            instance: 0,
            con_params: ConParams::default(),
            config: SdkConfig::default(),
        }
    }

    /// Returns the unique, human-readable identifier.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_profile_takes_defaults() {
        let profile: ConnectionProfile = serde_json::from_value(json!({ "name": "rig-a" })).unwrap();
        assert_eq!(profile, ConnectionProfile::new("rig-a"));
    }
}
