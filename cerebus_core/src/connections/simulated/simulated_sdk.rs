use log::{debug, info};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::connections::sdk::{CbSdk, SpikeCache};
use crate::connections::types::{ConParams, Rgba, SdkData, SdkStatus, SysConfig, TrialConfig};

const SYSFREQ: u32 = 30_000;
const SPIKE_LENGTH: u32 = 48;
const SPIKE_PRETRIG: u32 = 10;
/// Samples produced per channel on every continuous poll.
const SAMPLES_PER_POLL: u64 = 30;
/// Sample group 5 is the 30 kHz raw group on a real NSP.
const RAW_GROUP: u32 = 5;
const AUDIO_OUT: u16 = 149;

struct Comment {
    timestamp: u64,
    text: String,
    rgba: Rgba,
}

/// A deterministic in-process NSP.
///
/// Produces synthetic ramps and spike trains so the connection manager and
/// the CLI can be exercised without hardware. Two managers sharing one
/// simulator is not supported; each owns its own.
pub struct SimulatedSdk {
    channel_count: u16,
    reachable: bool,
    open: bool,
    trial: Option<TrialConfig>,
    clock: u64,
    comments: Vec<Comment>,
    channel_configs: HashMap<u16, SdkData>,
    monitored: Option<u16>,
}

impl Default for SimulatedSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSdk {
    /// A reachable simulator with four channels.
    pub fn new() -> Self {
        Self::with_channels(4)
    }

    pub fn with_channels(channel_count: u16) -> Self {
        SimulatedSdk {
            channel_count,
            reachable: true,
            open: false,
            trial: None,
            clock: 0,
            comments: Vec::new(),
            channel_configs: HashMap::new(),
            monitored: None,
        }
    }

    /// A simulator whose `open` always fails, as if no NSP answered.
    pub fn unreachable() -> Self {
        SimulatedSdk {
            reachable: false,
            ..Self::new()
        }
    }

    /// Channel currently routed to the audio output, if any.
    pub fn monitored_channel(&self) -> Option<u16> {
        self.monitored
    }

    fn valid_channel(&self, channel: u16) -> bool {
        (1..=self.channel_count).contains(&channel)
    }

    fn default_channel_config(channel: u16) -> SdkData {
        json!({
            "chan": channel,
            "label": format!("chan{channel}"),
            "smpgroup": RAW_GROUP,
        })
    }

    fn sample(t: u64, channel: u16) -> i64 {
        ((t + u64::from(channel) * 37) % 200) as i64 - 100
    }
}

impl CbSdk for SimulatedSdk {
    fn open(&mut self, instance: u32, con_params: &ConParams) -> (SdkStatus, SdkData) {
        if !self.reachable {
            debug!(
                "Simulated NSP at {}:{} is unreachable",
                con_params.inst_addr, con_params.inst_port
            );
            return (SdkStatus::ERR_OPEN_UDP, Value::Null);
        }
        let status = if self.open {
            SdkStatus::WARN_OPEN
        } else {
            SdkStatus::SUCCESS
        };
        self.open = true;
        info!("Simulated NSP opened (instance {})", instance);
        let connect_info = json!({
            "connection": "Simulator",
            "instrument": "NSP",
            "instance": instance,
            "inst-addr": con_params.inst_addr,
        });
        (status, connect_info)
    }

    fn close(&mut self, instance: u32) -> SdkStatus {
        if !self.open {
            return SdkStatus::WARN_CLOSED;
        }
        self.open = false;
        self.trial = None;
        info!("Simulated NSP closed (instance {})", instance);
        SdkStatus::SUCCESS
    }

    fn trial_config(&mut self, _instance: u32, config: &TrialConfig) -> SdkStatus {
        if !self.open {
            return SdkStatus::CLOSED;
        }
        if config.reset {
            self.comments.clear();
        }
        self.trial = Some(config.clone());
        SdkStatus::SUCCESS
    }

    fn trial_event(&mut self, _instance: u32, _reset: bool) -> (SdkStatus, SdkData) {
        if !self.open {
            return (SdkStatus::CLOSED, Value::Null);
        }
        match &self.trial {
            Some(trial) if !trial.noevent => {}
            _ => return (SdkStatus::INVALID_PARAM, Value::Null),
        }
        let tick = self.clock / SAMPLES_PER_POLL;
        let channels: Vec<Value> = (1..=self.channel_count)
            .map(|channel| {
                let timestamps: Vec<u64> = if (tick + u64::from(channel)) % 3 == 0 {
                    vec![self.clock.saturating_sub(u64::from(SPIKE_PRETRIG))]
                } else {
                    Vec::new()
                };
                json!({ "channel": channel, "timestamps": timestamps })
            })
            .collect();
        (SdkStatus::SUCCESS, json!({ "channels": channels }))
    }

    fn trial_continuous(&mut self, _instance: u32, _reset: bool) -> (SdkStatus, SdkData) {
        if !self.open {
            return (SdkStatus::CLOSED, Value::Null);
        }
        match &self.trial {
            Some(trial) if !trial.nocontinuous => {}
            _ => return (SdkStatus::INVALID_PARAM, Value::Null),
        }
        let start = self.clock;
        self.clock += SAMPLES_PER_POLL;
        let channels: Vec<Value> = (1..=self.channel_count)
            .map(|channel| {
                let samples: Vec<i64> = (start..self.clock)
                    .map(|t| Self::sample(t, channel))
                    .collect();
                json!({ "channel": channel, "samples": samples })
            })
            .collect();
        (
            SdkStatus::SUCCESS,
            json!({ "trial_start_time": start, "channels": channels }),
        )
    }

    fn trial_comment(&mut self, _instance: u32, reset: bool) -> (SdkStatus, SdkData) {
        if !self.open {
            return (SdkStatus::CLOSED, Value::Null);
        }
        match &self.trial {
            Some(trial) if !trial.nocomment => {}
            _ => return (SdkStatus::INVALID_PARAM, Value::Null),
        }
        let comments: Vec<Value> = self
            .comments
            .iter()
            .map(|c| json!({ "timestamp": c.timestamp, "comment": c.text, "rgba": c.rgba }))
            .collect();
        if reset {
            self.comments.clear();
        }
        (SdkStatus::SUCCESS, Value::Array(comments))
    }

    fn set_comment(&mut self, _instance: u32, comment: &str, rgba: Rgba) -> SdkStatus {
        if !self.open {
            return SdkStatus::CLOSED;
        }
        self.comments.push(Comment {
            timestamp: self.clock,
            text: comment.to_string(),
            rgba,
        });
        SdkStatus::SUCCESS
    }

    fn get_sample_group(&mut self, _instance: u32, group: u32) -> (SdkStatus, SdkData) {
        if !self.open {
            return (SdkStatus::CLOSED, Value::Null);
        }
        if !(1..=6).contains(&group) {
            return (SdkStatus::INVALID_PARAM, Value::Null);
        }
        let members: Vec<Value> = if group == RAW_GROUP {
            (1..=self.channel_count)
                .map(|channel| json!({ "chan": channel, "label": format!("chan{channel}") }))
                .collect()
        } else {
            Vec::new()
        };
        (SdkStatus::SUCCESS, Value::Array(members))
    }

    fn get_channel_config(&mut self, _instance: u32, channel: u16) -> (SdkStatus, SdkData) {
        if !self.open {
            return (SdkStatus::CLOSED, Value::Null);
        }
        if !self.valid_channel(channel) {
            return (SdkStatus::INVALID_CHANNEL, Value::Null);
        }
        let config = self
            .channel_configs
            .get(&channel)
            .cloned()
            .unwrap_or_else(|| Self::default_channel_config(channel));
        (SdkStatus::SUCCESS, config)
    }

    fn set_channel_config(&mut self, _instance: u32, channel: u16, info: &SdkData) -> SdkStatus {
        if !self.open {
            return SdkStatus::CLOSED;
        }
        if !self.valid_channel(channel) {
            return SdkStatus::INVALID_CHANNEL;
        }
        let Some(updates) = info.as_object() else {
            return SdkStatus::INVALID_PARAM;
        };
        let entry = self
            .channel_configs
            .entry(channel)
            .or_insert_with(|| Self::default_channel_config(channel));
        if let Some(current) = entry.as_object_mut() {
            for (key, value) in updates {
                current.insert(key.clone(), value.clone());
            }
        }
        SdkStatus::SUCCESS
    }

    fn time(&mut self, _instance: u32) -> (SdkStatus, u64) {
        if !self.open {
            return (SdkStatus::CLOSED, 0);
        }
        // The NSP keeps sampling between polls.
        self.clock += SAMPLES_PER_POLL;
        (SdkStatus::SUCCESS, self.clock)
    }

    fn analog_out(
        &mut self,
        _instance: u32,
        out_channel: u16,
        in_channel: u16,
        _track_last: bool,
        _spike_only: bool,
    ) -> SdkStatus {
        if !self.open {
            return SdkStatus::CLOSED;
        }
        if !self.valid_channel(in_channel) {
            return SdkStatus::INVALID_CHANNEL;
        }
        if out_channel == AUDIO_OUT {
            self.monitored = Some(in_channel);
        }
        SdkStatus::SUCCESS
    }

    fn get_sys_config(&mut self, _instance: u32) -> (SdkStatus, SysConfig) {
        let sys_config = SysConfig {
            spklength: SPIKE_LENGTH,
            spkpretrig: SPIKE_PRETRIG,
            sysfreq: SYSFREQ,
        };
        if !self.open {
            return (SdkStatus::CLOSED, sys_config);
        }
        (SdkStatus::SUCCESS, sys_config)
    }

    fn spike_cache(&mut self, _instance: u32, channel: u16) -> Box<dyn SpikeCache + Send> {
        Box::new(SimulatedSpikeCache { channel, polls: 0 })
    }

    fn is_simulator(&self) -> bool {
        true
    }
}

/// Hands out one synthetic waveform per poll.
struct SimulatedSpikeCache {
    channel: u16,
    polls: u64,
}

impl SpikeCache for SimulatedSpikeCache {
    fn new_waveforms(&mut self) -> SdkData {
        self.polls += 1;
        let waveform: Vec<i64> = (0..u64::from(SPIKE_LENGTH))
            .map(|i| {
                if i == u64::from(SPIKE_PRETRIG) {
                    -250
                } else {
                    SimulatedSdk::sample(i + self.polls, self.channel) / 4
                }
            })
            .collect();
        json!({ "channel": self.channel, "waveforms": [waveform] })
    }
}
