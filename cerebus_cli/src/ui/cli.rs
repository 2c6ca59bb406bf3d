use anyhow::Context;
use cerebus_core::storage::{ConnectionProfile, ProfileStore};
use cerebus_core::{ConnectionManager, Rgba, SdkConfig, SimulatedSdk};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde_json::json;
use std::thread;
use std::time::Duration;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "cerebus-rs", version = "0.1.0", subcommand_required = true)]
pub struct Args {
    /// Load connection settings from a saved profile
    #[arg(long, global = true)]
    pub profile: Option<String>,
    /// cbsdk instance id
    #[arg(long, global = true)]
    pub instance: Option<u32>,
    /// NSP address
    #[arg(long, global = true)]
    pub inst_addr: Option<String>,
    /// Local address to receive NSP packets on
    #[arg(long, global = true)]
    pub client_addr: Option<String>,
    /// Channel count of the simulated NSP
    #[arg(long, global = true, default_value_t = 4)]
    pub channels: u16,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect, print connection state, system config and NSP time
    Status,
    /// Poll one data stream and print each reply as a JSON line
    Poll {
        #[arg(long, value_enum, default_value_t = Stream::Continuous)]
        stream: Stream,
        /// Number of polls
        #[arg(long, default_value_t = 5)]
        count: u32,
        /// Pause between polls
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,
    },
    /// Send comments to the NSP
    Comment {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Manage saved connection profiles
    Profiles {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Stream {
    Continuous,
    Events,
    Comments,
}

impl Stream {
    fn config_key(self) -> &'static str {
        match self {
            Stream::Continuous => "get_continuous",
            Stream::Events => "get_events",
            Stream::Comments => "get_comments",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// List saved profiles
    List,
    /// Save the current flags under a name
    Save { name: String },
    /// Delete a saved profile
    Delete { name: String },
}

pub fn run_cli(args: Args) -> anyhow::Result<()> {
    let profile = resolve_profile(&args, open_store)?;

    match args.command {
        Command::Status => run_status(&profile, args.channels),
        Command::Poll {
            stream,
            count,
            interval_ms,
        } => run_poll(&profile, args.channels, stream, count, interval_ms),
        Command::Comment { text } => run_comment(&profile, args.channels, &text),
        Command::Profiles { action } => run_profiles(&open_store()?, profile, action),
    }
}

/// Creates the config directory, so only called when a profile is needed.
fn open_store() -> anyhow::Result<ProfileStore> {
    ProfileStore::new().context("opening the profile store")
}

/// The named profile (or defaults) with command-line flags layered on top.
/// `open_store` runs only when `--profile` is given.
fn resolve_profile(
    args: &Args,
    open_store: impl FnOnce() -> anyhow::Result<ProfileStore>,
) -> anyhow::Result<ConnectionProfile> {
    let mut profile = match &args.profile {
        Some(name) => open_store()?
            .load(name)?
            .with_context(|| format!("no profile named '{name}'"))?,
        None => ConnectionProfile::new("default"),
    };
    if let Some(instance) = args.instance {
        profile.instance = instance;
    }
    if let Some(addr) = &args.inst_addr {
        profile.con_params.inst_addr = addr.clone();
    }
    if let Some(addr) = &args.client_addr {
        profile.con_params.client_addr = addr.clone();
    }
    Ok(profile)
}

fn build_manager(profile: &ConnectionProfile, channels: u16) -> ConnectionManager {
    info!(
        "Using a simulated NSP with {} channels for profile '{}'",
        channels,
        profile.name()
    );
    let mut manager = ConnectionManager::with_params(
        Box::new(SimulatedSdk::with_channels(channels)),
        profile.instance,
        profile.con_params.clone(),
    );
    manager.set_config(profile.config.clone());
    manager
}

fn run_status(profile: &ConnectionProfile, channels: u16) -> anyhow::Result<()> {
    let mut manager = build_manager(profile, channels);
    println!("{}", manager.state());
    manager.with_session(|session| -> anyhow::Result<()> {
        println!("{}", session.state());
        let (_, sys_config) = session.get_sys_config()?;
        println!("{}", serde_json::to_string(&sys_config)?);
        let (_, time) = session.time()?;
        println!("time: {time}");
        Ok(())
    })
}

fn run_poll(
    profile: &ConnectionProfile,
    channels: u16,
    stream: Stream,
    count: u32,
    interval_ms: u64,
) -> anyhow::Result<()> {
    let mut manager = build_manager(profile, channels);
    manager.update_config(SdkConfig::from_iter([(stream.config_key(), json!(true))]));

    manager.with_session(|session| -> anyhow::Result<()> {
        for poll in 0..count {
            if poll > 0 {
                thread::sleep(Duration::from_millis(interval_ms));
            }
            let (status, data) = match stream {
                Stream::Continuous => session.get_continuous_data()?,
                Stream::Events => session.get_event_data()?,
                Stream::Comments => session.get_comments()?,
            };
            println!("{}", json!({ "status": status, "data": data }));
        }
        Ok(())
    })
}

fn run_comment(profile: &ConnectionProfile, channels: u16, text: &[String]) -> anyhow::Result<()> {
    let mut manager = build_manager(profile, channels);
    manager.with_session(|session| -> anyhow::Result<()> {
        let statuses = session.set_comments(text, Rgba::default())?;
        for (comment, status) in text.iter().zip(statuses) {
            println!("{status}\t{comment}");
        }
        Ok(())
    })
}

fn run_profiles(
    store: &ProfileStore,
    profile: ConnectionProfile,
    action: ProfileAction,
) -> anyhow::Result<()> {
    match action {
        ProfileAction::List => {
            for profile in store.list()? {
                println!(
                    "{}\tinstance {}\t{}:{}",
                    profile.name(),
                    profile.instance,
                    profile.con_params.inst_addr,
                    profile.con_params.inst_port
                );
            }
        }
        ProfileAction::Save { name } => {
            let profile = ConnectionProfile { name, ..profile };
            store.save(&profile)?;
            info!("Saved profile '{}'", profile.name());
        }
        ProfileAction::Delete { name } => {
            if store.delete(&name)? {
                info!("Deleted profile '{}'", name);
            } else {
                anyhow::bail!("no profile named '{name}'");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_alone_never_open_the_profile_store() {
        let args = Args::parse_from(["cerebus-rs", "--instance", "2", "--inst-addr", "10.0.0.2", "status"]);

        let profile = resolve_profile(&args, || {
            anyhow::bail!("profile store must not be opened without --profile")
        })
        .expect("defaults resolve without a store");

        assert_eq!(profile.name(), "default");
        assert_eq!(profile.instance, 2);
        assert_eq!(profile.con_params.inst_addr, "10.0.0.2");
    }

    #[test]
    fn named_profile_is_loaded_and_overridden_by_flags() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ProfileStore::with_dir(dir.path())?;
        let mut saved = ConnectionProfile::new("rig");
        saved.instance = 1;
        saved.con_params.inst_addr = "10.0.0.9".into();
        store.save(&saved)?;

        let args = Args::parse_from(["cerebus-rs", "--profile", "rig", "--instance", "3", "poll"]);
        let profile = resolve_profile(&args, || Ok(store.clone()))?;

        assert_eq!(profile.name(), "rig");
        assert_eq!(profile.instance, 3);
        assert_eq!(profile.con_params.inst_addr, "10.0.0.9");
        Ok(())
    }

    #[test]
    fn unknown_profile_is_an_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ProfileStore::with_dir(dir.path())?;

        let args = Args::parse_from(["cerebus-rs", "--profile", "missing", "status"]);
        let err = resolve_profile(&args, || Ok(store.clone())).expect_err("missing profile");

        assert!(err.to_string().contains("no profile named 'missing'"));
        Ok(())
    }
}
