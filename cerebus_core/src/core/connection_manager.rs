use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::fmt::{self, Display};

use crate::connections::errors::ConnectionError;
use crate::connections::sdk::{CbSdk, SpikeCache};
use crate::connections::types::{ConParams, Rgba, SdkData, SdkStatus, SysConfig};
use crate::core::config::SdkConfig;

/// Analog-out channel wired to the NSP audio output.
const AUDIO_OUT_CHANNEL: u16 = 149;

/// Externally observable state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    /// Connected, but the backend is a simulated NSP.
    Simulating,
    Disconnected,
}

impl Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConnectionState::Connected => "Connected to NSP",
            ConnectionState::Simulating => "Connected to NSP simulator",
            ConnectionState::Disconnected => "Not connected",
        };
        f.write_str(msg)
    }
}

/// Owns the one SDK session of an NSP instance.
///
/// The manager is the single access point for opening and closing the
/// session and for the option mapping handed to `trial_config`. It holds at
/// most one live session: `connect` checks the status flag first and never
/// opens the SDK twice.
///
/// Options set with [`set_config`](Self::set_config) or
/// [`update_config`](Self::update_config) are only stored. They reach the SDK
/// on the next `connect`, or right away through [`apply_config`](Self::apply_config).
///
/// Dropping a connected manager closes the session; failures there are
/// logged and otherwise ignored.
pub struct ConnectionManager {
    sdk: Box<dyn CbSdk + Send>,
    instance: u32,
    con_params: ConParams,
    config: SdkConfig,
    connected: bool,
    /// One waveform cache per channel, created on first use.
    spike_caches: HashMap<u16, Box<dyn SpikeCache + Send>>,
}

impl ConnectionManager {
    /// A manager for SDK instance 0 with the default connection parameters.
    pub fn new(sdk: Box<dyn CbSdk + Send>) -> Self {
        Self::with_params(sdk, 0, ConParams::default())
    }

    pub fn with_params(sdk: Box<dyn CbSdk + Send>, instance: u32, con_params: ConParams) -> Self {
        ConnectionManager {
            sdk,
            instance,
            con_params,
            config: SdkConfig::default(),
            connected: false,
            spike_caches: HashMap::new(),
        }
    }

    pub fn instance(&self) -> u32 {
        self.instance
    }

    pub fn con_params(&self) -> &ConParams {
        &self.con_params
    }

    /// Takes effect on the next `connect`.
    pub fn set_con_params(&mut self, con_params: ConParams) {
        self.con_params = con_params;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn state(&self) -> ConnectionState {
        match (self.connected, self.sdk.is_simulator()) {
            (true, true) => ConnectionState::Simulating,
            (true, false) => ConnectionState::Connected,
            (false, _) => ConnectionState::Disconnected,
        }
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Replace the held option mapping.
    pub fn set_config(&mut self, config: SdkConfig) {
        debug!("Config set to {:?}", config);
        self.config = config;
    }

    /// Merge options into the held mapping, see [`SdkConfig::merge`].
    pub fn update_config(&mut self, config: SdkConfig) {
        self.config.merge(config);
        debug!("Config updated to {:?}", self.config);
    }

    /// Open the SDK session and apply the held configuration.
    ///
    /// Connecting while connected is a no-op.
    pub fn connect(&mut self) -> Result<(), ConnectionError> {
        if self.connected {
            debug!("connect: instance {} already connected", self.instance);
            return Ok(());
        }

        info!(
            "Opening cbsdk instance {} ({}:{})",
            self.instance, self.con_params.inst_addr, self.con_params.inst_port
        );
        let (status, connect_info) = self.sdk.open(self.instance, &self.con_params);
        if !status.is_open_ok() {
            error!("cbsdk open failed with status {}", status);
            return Err(ConnectionError::Connect { status });
        }
        self.connected = true;
        info!("cbsdk open returned {}; connect_info: {}", status, connect_info);

        if let Err(e) = self.apply_config() {
            warn!("Connected, but the trial configuration was rejected: {}", e);
        }
        Ok(())
    }

    /// Store `config` and connect with it.
    ///
    /// When already connected the mapping is stored but not applied.
    pub fn connect_with(&mut self, config: SdkConfig) -> Result<(), ConnectionError> {
        self.set_config(config);
        self.connect()
    }

    /// Close the session. Disconnecting while disconnected is a no-op.
    ///
    /// The manager ends up disconnected even when the SDK reports a failing
    /// close; that failure is still returned.
    pub fn disconnect(&mut self) -> Result<(), ConnectionError> {
        if !self.connected {
            debug!("disconnect: instance {} not connected", self.instance);
            return Ok(());
        }

        let status = self.sdk.close(self.instance);
        self.connected = false;
        self.spike_caches.clear();

        if status.is_ok() {
            info!("Closed cbsdk instance {}", self.instance);
            Ok(())
        } else {
            warn!("cbsdk close returned status {}", status);
            Err(ConnectionError::Sdk { op: "close", status })
        }
    }

    /// Push the held configuration to the SDK now.
    pub fn apply_config(&mut self) -> Result<(), ConnectionError> {
        self.require_connected()?;
        let trial = self.config.trial_config();
        debug!("trial_config: {:?}", trial);
        let status = self.sdk.trial_config(self.instance, &trial);
        check(status, "trial_config")
    }

    /// Spike events collected since the previous call.
    pub fn get_event_data(&mut self) -> Result<(SdkStatus, SdkData), ConnectionError> {
        self.require_stream("get_events", "events")?;
        let reply = self.sdk.trial_event(self.instance, true);
        Ok(reported(reply, "trial_event"))
    }

    /// Continuous samples collected since the previous call.
    pub fn get_continuous_data(&mut self) -> Result<(SdkStatus, SdkData), ConnectionError> {
        self.require_stream("get_continuous", "continuous")?;
        let reply = self.sdk.trial_continuous(self.instance, true);
        Ok(reported(reply, "trial_continuous"))
    }

    pub fn get_comments(&mut self) -> Result<(SdkStatus, SdkData), ConnectionError> {
        self.require_stream("get_comments", "comments")?;
        let reply = self.sdk.trial_comment(self.instance, true);
        Ok(reported(reply, "trial_comment"))
    }

    /// Send each comment to the NSP and return their statuses in order.
    pub fn set_comments<I, S>(&mut self, comments: I, rgba: Rgba) -> Result<Vec<SdkStatus>, ConnectionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.require_connected()?;
        let statuses = comments
            .into_iter()
            .map(|comment| {
                let status = self.sdk.set_comment(self.instance, comment.as_ref(), rgba);
                if !status.is_ok() {
                    warn!("set_comment '{}' failed: {}", comment.as_ref(), status);
                }
                status
            })
            .collect();
        Ok(statuses)
    }

    pub fn get_group_config(&mut self, group: u32) -> Result<(SdkStatus, SdkData), ConnectionError> {
        self.require_connected()?;
        let reply = self.sdk.get_sample_group(self.instance, group);
        Ok(reported(reply, "get_sample_group"))
    }

    pub fn get_channel_info(&mut self, channel: u16) -> Result<(SdkStatus, SdkData), ConnectionError> {
        self.require_connected()?;
        let reply = self.sdk.get_channel_config(self.instance, channel);
        Ok(reported(reply, "get_channel_config"))
    }

    pub fn set_channel_info(&mut self, channel: u16, info: &SdkData) -> Result<(), ConnectionError> {
        self.require_connected()?;
        let status = self.sdk.set_channel_config(self.instance, channel, info);
        check(status, "set_channel_config")
    }

    /// NSP processor time, in samples.
    pub fn time(&mut self) -> Result<(SdkStatus, u64), ConnectionError> {
        self.require_connected()?;
        Ok(reported(self.sdk.time(self.instance), "time"))
    }

    /// Route `channel` to the audio output.
    pub fn monitor_channel(&mut self, channel: u16) -> Result<(), ConnectionError> {
        self.require_connected()?;
        let status = self
            .sdk
            .analog_out(self.instance, AUDIO_OUT_CHANNEL, channel, false, false);
        check(status, "analog_out")
    }

    /// Waveforms on `channel` since the previous call.
    pub fn get_waveforms(&mut self, channel: u16) -> Result<SdkData, ConnectionError> {
        self.require_connected()?;
        let (sdk, instance) = (&mut self.sdk, self.instance);
        let cache = self
            .spike_caches
            .entry(channel)
            .or_insert_with(|| sdk.spike_cache(instance, channel));
        Ok(cache.new_waveforms())
    }

    pub fn get_sys_config(&mut self) -> Result<(SdkStatus, SysConfig), ConnectionError> {
        self.require_connected()?;
        Ok(reported(self.sdk.get_sys_config(self.instance), "get_sys_config"))
    }

    fn require_connected(&self) -> Result<(), ConnectionError> {
        if self.connected {
            Ok(())
        } else {
            Err(ConnectionError::NotConnected)
        }
    }

    fn require_stream(&self, key: &str, stream: &'static str) -> Result<(), ConnectionError> {
        self.require_connected()?;
        if self.config.flag(key, false) {
            Ok(())
        } else {
            Err(ConnectionError::StreamDisabled(stream))
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Err(e) = self.disconnect() {
            error!("Disconnect during teardown failed: {}", e);
        }
    }
}

fn check(status: SdkStatus, op: &'static str) -> Result<(), ConnectionError> {
    if status.is_ok() {
        Ok(())
    } else {
        warn!("{} failed. Error ({})", op, status);
        Err(ConnectionError::Sdk { op, status })
    }
}

fn reported<T>(reply: (SdkStatus, T), op: &str) -> (SdkStatus, T) {
    if !reply.0.is_ok() {
        warn!("{} failed. Error ({})", op, reply.0);
    }
    reply
}
