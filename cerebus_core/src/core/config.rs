//! The option mapping held by the connection manager.
//!
//! Keys are passed through to the SDK untouched. Only the handful of options
//! that shape a `trial_config` call are interpreted, see [`SdkConfig::trial_config`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::connections::types::TrialConfig;

const BUFFER_PARAMETER: &str = "buffer_parameter";
const RANGE_PARAMETER: &str = "range_parameter";

/// Mapping from option name to value (`reset`, `get_continuous`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SdkConfig(Map<String, Value>);

impl Default for SdkConfig {
    /// Absolute event timing, events and continuous data enabled.
    fn default() -> Self {
        let mut map = Map::new();
        map.insert(BUFFER_PARAMETER.into(), json!({ "absolute": true }));
        map.insert(RANGE_PARAMETER.into(), json!({}));
        map.insert("get_events".into(), Value::Bool(true));
        map.insert("get_continuous".into(), Value::Bool(true));
        SdkConfig(map)
    }
}

impl From<Map<String, Value>> for SdkConfig {
    fn from(map: Map<String, Value>) -> Self {
        SdkConfig(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for SdkConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        SdkConfig(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl SdkConfig {
    /// An empty mapping; every option resolves to its trial default.
    pub fn empty() -> Self {
        SdkConfig(Map::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Truthiness of `key`, or `default` when it is absent.
    pub fn flag(&self, key: &str, default: bool) -> bool {
        self.0.get(key).map(truthy).unwrap_or(default)
    }

    /// Merge `other` into this mapping.
    ///
    /// Top-level keys overwrite. `buffer_parameter` and `range_parameter`
    /// are merged key by key so a partial update keeps the other entries.
    pub fn merge(&mut self, other: SdkConfig) {
        for (key, value) in other.0 {
            if key == BUFFER_PARAMETER || key == RANGE_PARAMETER {
                if let (Some(Value::Object(current)), Value::Object(updates)) =
                    (self.0.get_mut(&key), &value)
                {
                    current.extend(updates.clone());
                    continue;
                }
            }
            self.0.insert(key, value);
        }
    }

    /// Resolve the mapping into the arguments of a `trial_config` call.
    ///
    /// Absent options take the SDK defaults: `reset` on, every stream off.
    pub fn trial_config(&self) -> TrialConfig {
        TrialConfig {
            reset: self.flag("reset", true),
            buffer_parameter: self.nested(BUFFER_PARAMETER),
            range_parameter: self.nested(RANGE_PARAMETER),
            noevent: !self.flag("get_events", false),
            nocontinuous: !self.flag("get_continuous", false),
            nocomment: !self.flag("get_comments", false),
        }
    }

    fn nested(&self, key: &str) -> Map<String, Value> {
        match self.0.get(key) {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
