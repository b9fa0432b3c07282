//! CLI argument definitions.
//!
//! This module is compiled both into the binary and by `build.rs` (for man
//! page generation), so it must only depend on `clap` and `clap_complete`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Root command ─────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "uprotect",
    version,
    about = "Manage UniFi Protect NVRs and cameras",
    long_about = "Inspect and control UniFi Protect cameras: connection state, motion \
                  and doorbell activity, snapshots, recording and infrared modes.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect and control cameras
    #[command(alias = "camera", alias = "cams")]
    Cameras(CamerasArgs),

    /// Motion and doorbell sensors derived from camera state
    #[command(alias = "sensor")]
    Sensors(SensorsArgs),

    /// NVR identity and recent events
    Nvr(NvrArgs),

    /// Manage configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Global options ───────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// NVR profile to use
    #[arg(long, short = 'p', env = "UPROTECT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// NVR URL (overrides profile)
    #[arg(long, short = 'n', env = "UPROTECT_NVR", global = true)]
    pub nvr: Option<String>,

    /// Local Protect account name
    #[arg(long, short = 'u', env = "UPROTECT_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "UPROTECT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept the NVR's self-signed TLS certificate
    #[arg(long, short = 'k', env = "UPROTECT_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "UPROTECT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── cameras ──────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct CamerasArgs {
    #[command(subcommand)]
    pub command: CamerasCommand,
}

#[derive(Subcommand, Debug)]
pub enum CamerasCommand {
    /// List cameras with their current state
    #[command(alias = "ls")]
    List {
        /// Only doorbell cameras
        #[arg(long)]
        doorbells: bool,
    },

    /// Show one camera in detail
    Get {
        /// Camera id or name
        camera: String,
    },

    /// Print camera state changes until interrupted
    Watch {
        /// Only this camera (id or name)
        camera: Option<String>,

        /// Poll interval in seconds (default: profile scan_interval)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Fetch a live snapshot JPEG
    Snapshot {
        /// Camera id or name
        camera: String,

        /// Output file (default: <camera>-<timestamp>.jpg)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Fetch the thumbnail of the latest motion event
    Thumbnail {
        /// Camera id or name
        camera: String,

        /// Output file (default: <camera>-event.jpg)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Requested image width in pixels
        #[arg(long)]
        width: Option<u32>,
    },

    /// Change a camera's recording mode
    SetRecording {
        /// Camera id or name
        camera: String,

        /// New mode
        mode: RecordingModeArg,
    },

    /// Change a camera's infrared LED mode
    SetIr {
        /// Camera id or name
        camera: String,

        /// New mode
        mode: IrModeArg,
    },
}

// ── sensors ──────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct SensorsArgs {
    #[command(subcommand)]
    pub command: SensorsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SensorsCommand {
    /// List binary sensors with their current state
    #[command(alias = "ls")]
    List,

    /// Print sensor transitions until interrupted
    Watch {
        /// Only sensors of this camera (id or name)
        camera: Option<String>,

        /// Poll interval in seconds (default: profile scan_interval)
        #[arg(long)]
        interval: Option<u64>,
    },
}

// ── nvr ──────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct NvrArgs {
    #[command(subcommand)]
    pub command: NvrCommand,
}

#[derive(Subcommand, Debug)]
pub enum NvrCommand {
    /// Show NVR identity and version
    Info,

    /// List recent motion and ring events
    Events {
        /// Trailing window in seconds
        #[arg(long, default_value_t = 300)]
        last: u64,
    },
}

// ── config ───────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Print the effective configuration
    Show,

    /// Set a key on the active profile
    Set {
        /// One of: nvr, username, password_env, ca_cert, insecure, timeout, scan_interval
        key: String,
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile to store for (default: active profile)
        profile: Option<String>,
    },
}

// ── completions ──────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

// ── Value enums ──────────────────────────────────────────────────────

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    #[value(name = "json-compact")]
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain identifiers, one per line
    Plain,
}

/// When to colorize output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Color when stdout is a terminal and NO_COLOR is unset
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

/// Recording mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordingModeArg {
    /// Record continuously
    Always,
    /// Record on motion
    Motion,
    /// Do not record
    Never,
}

impl RecordingModeArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Motion => "motion",
            Self::Never => "never",
        }
    }
}

/// Infrared LED mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IrModeArg {
    /// IR filter and LEDs follow ambient light
    Auto,
    /// LEDs always on
    On,
    /// IR filter engages but LEDs stay dark
    #[value(name = "led-off")]
    LedOff,
    /// IR fully disabled
    Off,
}
