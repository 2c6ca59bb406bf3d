//! A deterministic **in‑process stand‑in** for a cbsdk binding.
//!
//! *  **From the test’s perspective**
//!    * Choose what `open` / `close` answer with [`FakeSdk::with_open_status`]
//!      and [`FakeSdk::with_close_status`].
//!    * Inspect every call the manager made via the shared [`CallLog`].
//!
//! The manager owns the boxed fake, so the log lives behind an `Arc` the test
//! keeps a clone of.

use cerebus_core::connections::{
    CbSdk, ConParams, Rgba, SdkData, SdkStatus, SpikeCache, SysConfig, TrialConfig,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum SdkCall {
    Open(u32),
    Close(u32),
    TrialConfig(TrialConfig),
    TrialEvent,
    TrialContinuous,
    TrialComment,
    SetComment(String, Rgba),
    GetSampleGroup(u32),
    GetChannelConfig(u16),
    SetChannelConfig(u16, SdkData),
    Time,
    AnalogOut { out_channel: u16, in_channel: u16 },
    GetSysConfig,
    SpikeCache(u16),
}

#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<SdkCall>>>);

impl CallLog {
    fn push(&self, call: SdkCall) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<SdkCall> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&SdkCall) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    pub fn opens(&self) -> usize {
        self.count(|c| matches!(c, SdkCall::Open(_)))
    }

    pub fn closes(&self) -> usize {
        self.count(|c| matches!(c, SdkCall::Close(_)))
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

pub struct FakeSdk {
    log: CallLog,
    open_status: SdkStatus,
    close_status: SdkStatus,
    data_status: SdkStatus,
}

impl FakeSdk {
    /// Returns the fake plus a handle to its call log.
    pub fn new() -> (Self, CallLog) {
        let log = CallLog::default();
        (
            FakeSdk {
                log: log.clone(),
                open_status: SdkStatus::SUCCESS,
                close_status: SdkStatus::SUCCESS,
                data_status: SdkStatus::SUCCESS,
            },
            log,
        )
    }

    pub fn with_open_status(mut self, status: SdkStatus) -> Self {
        self.open_status = status;
        self
    }

    pub fn with_close_status(mut self, status: SdkStatus) -> Self {
        self.close_status = status;
        self
    }

    /// Status returned by every data call.
    pub fn with_data_status(mut self, status: SdkStatus) -> Self {
        self.data_status = status;
        self
    }

    fn reply(&self, data: SdkData) -> (SdkStatus, SdkData) {
        if self.data_status.is_ok() {
            (self.data_status, data)
        } else {
            (self.data_status, SdkData::Null)
        }
    }
}

impl CbSdk for FakeSdk {
    fn open(&mut self, instance: u32, _con_params: &ConParams) -> (SdkStatus, SdkData) {
        self.log.push(SdkCall::Open(instance));
        (self.open_status, json!({ "connection": "Fake" }))
    }

    fn close(&mut self, instance: u32) -> SdkStatus {
        self.log.push(SdkCall::Close(instance));
        self.close_status
    }

    fn trial_config(&mut self, _instance: u32, config: &TrialConfig) -> SdkStatus {
        self.log.push(SdkCall::TrialConfig(config.clone()));
        SdkStatus::SUCCESS
    }

    fn trial_event(&mut self, _instance: u32, _reset: bool) -> (SdkStatus, SdkData) {
        self.log.push(SdkCall::TrialEvent);
        self.reply(json!({ "channels": [{ "channel": 1, "timestamps": [42] }] }))
    }

    fn trial_continuous(&mut self, _instance: u32, _reset: bool) -> (SdkStatus, SdkData) {
        self.log.push(SdkCall::TrialContinuous);
        self.reply(json!({ "trial_start_time": 0, "channels": [{ "channel": 1, "samples": [1, 2, 3] }] }))
    }

    fn trial_comment(&mut self, _instance: u32, _reset: bool) -> (SdkStatus, SdkData) {
        self.log.push(SdkCall::TrialComment);
        self.reply(json!([]))
    }

    fn set_comment(&mut self, _instance: u32, comment: &str, rgba: Rgba) -> SdkStatus {
        self.log.push(SdkCall::SetComment(comment.to_string(), rgba));
        SdkStatus::SUCCESS
    }

    fn get_sample_group(&mut self, _instance: u32, group: u32) -> (SdkStatus, SdkData) {
        self.log.push(SdkCall::GetSampleGroup(group));
        self.reply(json!([]))
    }

    fn get_channel_config(&mut self, _instance: u32, channel: u16) -> (SdkStatus, SdkData) {
        self.log.push(SdkCall::GetChannelConfig(channel));
        self.reply(json!({ "chan": channel }))
    }

    fn set_channel_config(&mut self, _instance: u32, channel: u16, info: &SdkData) -> SdkStatus {
        self.log.push(SdkCall::SetChannelConfig(channel, info.clone()));
        self.data_status
    }

    fn time(&mut self, _instance: u32) -> (SdkStatus, u64) {
        self.log.push(SdkCall::Time);
        (self.data_status, 1234)
    }

    fn analog_out(
        &mut self,
        _instance: u32,
        out_channel: u16,
        in_channel: u16,
        _track_last: bool,
        _spike_only: bool,
    ) -> SdkStatus {
        self.log.push(SdkCall::AnalogOut {
            out_channel,
            in_channel,
        });
        self.data_status
    }

    fn get_sys_config(&mut self, _instance: u32) -> (SdkStatus, SysConfig) {
        self.log.push(SdkCall::GetSysConfig);
        (
            self.data_status,
            SysConfig {
                spklength: 48,
                spkpretrig: 10,
                sysfreq: 30_000,
            },
        )
    }

    fn spike_cache(&mut self, _instance: u32, channel: u16) -> Box<dyn SpikeCache + Send> {
        self.log.push(SdkCall::SpikeCache(channel));
        Box::new(FakeSpikeCache(channel))
    }
}

struct FakeSpikeCache(u16);

impl SpikeCache for FakeSpikeCache {
    fn new_waveforms(&mut self) -> SdkData {
        json!({ "channel": self.0, "waveforms": [] })
    }
}
