use super::types::{ConParams, Rgba, SdkData, SdkStatus, SysConfig, TrialConfig};

/// The call surface of a cbsdk binding (native library, simulator, test fake).
///
/// Every call reports an [`SdkStatus`] next to its payload instead of failing,
/// the same convention the vendor library uses.
pub trait CbSdk {
    fn open(&mut self, instance: u32, con_params: &ConParams) -> (SdkStatus, SdkData);
    fn close(&mut self, instance: u32) -> SdkStatus;

    fn trial_config(&mut self, instance: u32, config: &TrialConfig) -> SdkStatus;
    fn trial_event(&mut self, instance: u32, reset: bool) -> (SdkStatus, SdkData);
    fn trial_continuous(&mut self, instance: u32, reset: bool) -> (SdkStatus, SdkData);
    fn trial_comment(&mut self, instance: u32, reset: bool) -> (SdkStatus, SdkData);

    fn set_comment(&mut self, instance: u32, comment: &str, rgba: Rgba) -> SdkStatus;

    fn get_sample_group(&mut self, instance: u32, group: u32) -> (SdkStatus, SdkData);
    fn get_channel_config(&mut self, instance: u32, channel: u16) -> (SdkStatus, SdkData);
    fn set_channel_config(&mut self, instance: u32, channel: u16, info: &SdkData) -> SdkStatus;

    /// Current NSP processor time in samples.
    fn time(&mut self, instance: u32) -> (SdkStatus, u64);

    fn analog_out(
        &mut self,
        instance: u32,
        out_channel: u16,
        in_channel: u16,
        track_last: bool,
        spike_only: bool,
    ) -> SdkStatus;

    fn get_sys_config(&mut self, instance: u32) -> (SdkStatus, SysConfig);

    /// Open a waveform cache on one channel.
    fn spike_cache(&mut self, instance: u32, channel: u16) -> Box<dyn SpikeCache + Send>;

    /// `true` when the binding talks to a simulated NSP rather than hardware.
    fn is_simulator(&self) -> bool {
        false
    }
}

/// Rolling buffer of spike waveforms for a single channel.
pub trait SpikeCache {
    /// Waveforms captured since the previous call.
    fn new_waveforms(&mut self) -> SdkData;
}
