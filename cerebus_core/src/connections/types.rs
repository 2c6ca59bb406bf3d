use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Display};

/// Whatever structure the SDK hands back. The manager never looks inside.
pub type SdkData = Value;

/// Result code returned by every SDK call.
///
/// Non-negative codes are success or warnings, negative codes are failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SdkStatus(pub i32);

impl SdkStatus {
    pub const SUCCESS: SdkStatus = SdkStatus(0);
    /// The interface was already open; still a usable session.
    pub const WARN_OPEN: SdkStatus = SdkStatus(1);
    pub const WARN_CLOSED: SdkStatus = SdkStatus(2);
    pub const INVALID_PARAM: SdkStatus = SdkStatus(-3);
    pub const CLOSED: SdkStatus = SdkStatus(-4);
    pub const ERR_OPEN_UDP: SdkStatus = SdkStatus(-7);
    pub const INVALID_CHANNEL: SdkStatus = SdkStatus(-12);

    pub fn code(self) -> i32 {
        self.0
    }

    pub fn is_ok(self) -> bool {
        self == Self::SUCCESS
    }

    /// `open` counts both success and "already open" as a live session.
    pub fn is_open_ok(self) -> bool {
        self == Self::SUCCESS || self == Self::WARN_OPEN
    }
}

impl Display for SdkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network parameters used to open the interface to the NSP.
///
/// Missing fields fall back to the vendor defaults, so a partial JSON object
/// like `{"inst-addr": "10.0.0.2"}` only overrides that one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConParams {
    /// `192.168.137.1` style address when wired directly, broadcast when behind a switch.
    pub client_addr: String,
    pub client_port: u16,
    pub inst_addr: String,
    pub inst_port: u16,
    pub receive_buffer_size: usize,
}

impl Default for ConParams {
    fn default() -> Self {
        let client_addr = if cfg!(target_os = "macos") {
            "255.255.255.255"
        } else {
            "192.168.137.255"
        };
        let receive_buffer_size = if cfg!(windows) {
            8 * 1024 * 1024
        } else {
            6 * 1024 * 1024
        };
        ConParams {
            client_addr: client_addr.to_string(),
            client_port: 51002,
            inst_addr: "192.168.137.128".to_string(),
            inst_port: 51001,
            receive_buffer_size,
        }
    }
}

/// Comment colour as sent to the NSP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Default for Rgba {
    fn default() -> Self {
        Rgba(0, 0, 0, 64)
    }
}

/// `get_sys_config` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SysConfig {
    pub spklength: u32,
    pub spkpretrig: u32,
    pub sysfreq: u32,
}

/// Fully resolved arguments of a `trial_config` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialConfig {
    /// `true` clears the buffers and starts acquisition, `false` stops it.
    pub reset: bool,
    pub buffer_parameter: Map<String, Value>,
    pub range_parameter: Map<String, Value>,
    pub noevent: bool,
    pub nocontinuous: bool,
    pub nocomment: bool,
}
