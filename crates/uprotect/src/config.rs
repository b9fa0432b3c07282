//! Profile resolution: config file, environment, and CLI flag overlays.
//!
//! Persistence lives in `uprotect-config`; this module only decides which
//! profile is active and folds the global flags over it before handing
//! the result to the core crate.

use uprotect_config::{Config, DEFAULT_PROFILE, Profile, config_path, profile_to_connect_config};
use uprotect_core::ConnectConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Name of the profile selected by flag, env, or config default.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| DEFAULT_PROFILE.to_owned())
}

/// Build the connection settings for this invocation.
///
/// Uses the active profile when one exists, otherwise a profile
/// synthesized purely from flags and environment. The returned name is
/// the active profile's; it doubles as the instance name that prefixes
/// entity ids.
pub fn build_connect_config(global: &GlobalOpts) -> Result<(String, ConnectConfig), CliError> {
    let cfg = uprotect_config::load_config_or_default();
    let name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&name) {
        Some(profile) => overlay(profile.clone(), global),
        // No profile but --nvr/UPROTECT_NVR given: flags alone may be enough.
        None if global.nvr.is_some() => overlay(Profile::default(), global),
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    let connect = profile_to_connect_config(&profile, &name)?;
    Ok((name, connect))
}

/// Fold command-line overrides into a profile. Flags win over the file.
fn overlay(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref nvr) = global.nvr {
        profile.nvr.clone_from(nvr);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    profile
}
