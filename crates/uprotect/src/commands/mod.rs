//! Command handlers, one module per top-level noun.

pub mod cameras;
pub mod config_cmd;
pub mod nvr;
pub mod sensors;
mod util;

use uprotect_core::ProtectInstance;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler.
///
/// `config` and `completions` never reach this point; main handles them
/// before any NVR connection exists.
pub async fn dispatch(
    cmd: Command,
    instance: &ProtectInstance,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Cameras(args) => cameras::handle(instance, args, global).await,
        Command::Sensors(args) => sensors::handle(instance, args, global).await,
        Command::Nvr(args) => nvr::handle(instance, args, global).await,
        Command::Config(_) | Command::Completions(_) => {
            unreachable!("handled in main before connecting")
        }
    }
}
