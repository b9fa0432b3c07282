//! Config subcommand handlers.
//!
//! Persistence and keyring access live in `uprotect-config`; these
//! handlers drive the interactive flows and key-by-key edits on top.

use std::collections::HashMap;

use dialoguer::{Input, Select};
use uprotect_config::{self as config_file, Config, Defaults, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::active_profile_name;
use crate::error::CliError;
use crate::output;

// ── Prompt & key helpers ────────────────────────────────────────────

/// Prompt failures (EOF on stdin, broken pipe) as a CLI error.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "prompt".into(),
        reason: e.to_string(),
    }
}

/// One wizard question: prompt, optional default, the typed answer.
fn ask(prompt: &str, default: Option<String>) -> Result<String, CliError> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(value) = default {
        input = input.default(value);
    }
    input.interact_text().map_err(prompt_err)
}

/// ProfileNotFound with the available names filled in.
fn unknown_profile(cfg: &Config, name: String) -> CliError {
    let available = if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
        names.sort();
        names.join(", ")
    };
    CliError::ProfileNotFound { name, available }
}

fn bad_value(field: &str, expected: &str) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: expected.into(),
    }
}

/// Apply one `config set` key to a profile. Keys accept both snake and
/// kebab case so `uprotect config set scan-interval 5` works as typed.
fn apply_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "nvr" => profile.nvr = value,
        "username" => profile.username = Some(value),
        "password_env" | "password-env" => profile.password_env = Some(value),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "insecure" => {
            profile.insecure = Some(
                value
                    .parse()
                    .map_err(|_| bad_value(key, "must be 'true' or 'false'"))?,
            );
        }
        "timeout" => {
            profile.timeout = Some(
                value
                    .parse()
                    .map_err(|_| bad_value(key, "must be a number (seconds)"))?,
            );
        }
        "scan_interval" | "scan-interval" => {
            profile.scan_interval = Some(
                value
                    .parse()
                    .map_err(|_| bad_value(key, "must be a number (seconds)"))?,
            );
        }
        other => {
            return Err(bad_value(
                other,
                "unknown config key. Valid keys: nvr, username, password_env, \
                 ca_cert, insecure, timeout, scan_interval",
            ));
        }
    }
    Ok(())
}

// ── Dispatch ────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init wizard ─────────────────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config_file::config_path();
            eprintln!("uprotect -- configuration wizard");
            eprintln!("   Config file: {}\n", config_path.display());

            let profile_name = ask("Profile name", Some(config_file::DEFAULT_PROFILE.into()))?;
            let nvr = ask("NVR URL", Some("https://192.168.1.1".into()))?;
            let username = ask("Local account username", None)?;
            let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;

            if username.is_empty() || password.is_empty() {
                return Err(bad_value(
                    "credentials",
                    "username and password cannot be empty",
                ));
            }

            let storage = &["System keyring (recommended)", "Plaintext in the config file"];
            let picked = Select::new()
                .with_prompt("Password storage")
                .items(storage)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let plaintext = if picked == 0 {
                config_file::store_password(&profile_name, &password)?;
                eprintln!("   Password stored in system keyring");
                None
            } else {
                Some(password)
            };

            let profile = Profile {
                nvr,
                username: Some(username),
                password: plaintext,
                ..Profile::default()
            };

            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Defaults::default(),
                profiles: HashMap::from([(profile_name.clone(), profile)]),
            };
            config_file::save_config(&cfg)?;

            eprintln!("\nConfiguration written to {}", config_path.display());
            eprintln!("  Default profile: {profile_name}");
            eprintln!("\n  Test it: uprotect nvr info");

            Ok(())
        }

        // ── Show merged config ──────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config_file::load_config_or_default();
            let rendered = output::render_single(
                global.output,
                &cfg,
                |c| format!("{c:#?}"),
                |_| "config".into(),
            );
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        // ── Set key on active profile ───────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config_file::load_config_or_default();
            let profile_name = active_profile_name(global, &cfg);

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            apply_profile_key(profile, &key, value)?;

            config_file::save_config(&cfg)?;
            eprintln!("Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── List profiles ───────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config_file::load_config_or_default();
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: uprotect config init");
                return Ok(());
            }

            let default = cfg
                .default_profile
                .as_deref()
                .unwrap_or(config_file::DEFAULT_PROFILE);
            let mut names = cfg.profiles.keys().collect::<Vec<_>>();
            names.sort();
            for name in names {
                if name == default {
                    println!("{name} *");
                } else {
                    println!("{name}");
                }
            }
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config_file::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(unknown_profile(&cfg, name));
            }

            cfg.default_profile = Some(name.clone());
            config_file::save_config(&cfg)?;
            eprintln!("Default profile set to '{name}'");
            Ok(())
        }

        // ── Store password ──────────────────────────────────────────
        ConfigCommand::SetPassword { profile } => {
            let cfg = config_file::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(unknown_profile(&cfg, profile_name));
            }

            let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if password.is_empty() {
                return Err(bad_value("password", "password cannot be empty"));
            }

            config_file::store_password(&profile_name, &password)?;
            eprintln!("Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
