//! Camera command handlers.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use owo_colors::AnsiColors;
use tabled::Tabled;
use uprotect_core::entity::slugify;
use uprotect_core::{CameraId, CameraState, Coordinator, IrMode, ProtectInstance};

use crate::cli::{CamerasArgs, CamerasCommand, GlobalOpts, IrModeArg, RecordingModeArg};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CameraRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Online")]
    online: String,
    #[tabled(rename = "Recording")]
    recording: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
    #[tabled(rename = "Last Motion")]
    last_motion: String,
}

impl From<&CameraState> for CameraRow {
    fn from(c: &CameraState) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            class: c.device_class.to_string(),
            online: output::yes_no(c.online).into(),
            recording: c.recording_mode.to_string(),
            uptime: output::uptime(c.up_since),
            last_motion: output::ts(c.last_motion),
        }
    }
}

fn detail(c: &CameraState) -> String {
    let mut lines = vec![
        format!("ID:          {}", c.id),
        format!("Name:        {}", c.name),
        format!("Class:       {}", c.device_class),
        format!("Model:       {}", c.model.as_deref().unwrap_or("-")),
        format!("Online:      {}", output::yes_no(c.online)),
        format!("Uptime:      {}", output::uptime(c.up_since)),
        format!("Recording:   {}", c.recording_mode),
        format!(
            "Infrared:    {}",
            c.ir_mode.map_or_else(|| "-".into(), |m| m.to_string())
        ),
        format!("RTSP:        {}", c.rtsp.as_deref().unwrap_or("-")),
        format!("Last motion: {}", output::ts(c.last_motion)),
    ];
    if c.is_doorbell() {
        lines.push(format!("Last ring:   {}", output::ts(c.last_ring)));
    }
    if c.event_on {
        lines.push(format!("Motion:      active (score {})", c.event_score));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    instance: &ProtectInstance,
    args: CamerasArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CamerasCommand::List { doorbells } => {
            let cameras: Vec<CameraState> = instance
                .coordinator()
                .data()
                .iter()
                .map(|c| (**c).clone())
                .filter(|c| !doorbells || c.is_doorbell())
                .collect();
            let out = output::render_list(global.output, &cameras, |c| CameraRow::from(c), |c| {
                c.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CamerasCommand::Get { camera } => {
            let found = instance.resolve_camera(&camera)?;
            let out = output::render_single(global.output, &*found, detail, |c| c.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CamerasCommand::Watch {
            camera,
            interval: _,
        } => {
            let only = camera
                .map(|c| instance.resolve_camera(&c))
                .transpose()?
                .map(|c| c.id.clone());
            watch(instance, only, global).await
        }

        CamerasCommand::Snapshot { camera, file } => {
            let found = instance.resolve_camera(&camera)?;
            let path = file.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "{}-{}.jpg",
                    slugify(&found.name),
                    Utc::now().format("%Y%m%d-%H%M%S")
                ))
            });
            instance.save_snapshot(found.id.as_str(), &path).await?;
            if !global.quiet {
                eprintln!("Snapshot saved to {}", path.display());
            }
            Ok(())
        }

        CamerasCommand::Thumbnail {
            camera,
            file,
            width,
        } => {
            let found = instance.resolve_camera(&camera)?;
            let path = file
                .unwrap_or_else(|| PathBuf::from(format!("{}-event.jpg", slugify(&found.name))));
            instance
                .save_thumbnail(found.id.as_str(), &path, width)
                .await?;
            if !global.quiet {
                eprintln!("Event thumbnail saved to {}", path.display());
            }
            Ok(())
        }

        CamerasCommand::SetRecording { camera, mode } => {
            // Turning recording off loses footage; make sure it's meant.
            if mode == RecordingModeArg::Never
                && !util::confirm(
                    "set-recording never",
                    &format!("Disable recording on {camera}?"),
                    global.yes,
                )?
            {
                return Ok(());
            }
            let applied = instance.set_recording_mode(&camera, mode.as_str()).await?;
            if !global.quiet {
                eprintln!("Recording mode set to {applied}");
            }
            Ok(())
        }

        CamerasCommand::SetIr { camera, mode } => {
            instance.set_ir_mode(&camera, ir_mode(mode)).await?;
            if !global.quiet {
                eprintln!("Infrared mode set to {}", ir_mode(mode));
            }
            Ok(())
        }
    }
}

fn ir_mode(arg: IrModeArg) -> IrMode {
    match arg {
        IrModeArg::Auto => IrMode::Auto,
        IrModeArg::On => IrMode::On,
        IrModeArg::LedOff => IrMode::LedOff,
        IrModeArg::Off => IrMode::Off,
    }
}

// ── Watch loop ──────────────────────────────────────────────────────

/// Follow refresh cycles and print camera transitions until Ctrl-C.
async fn watch(
    instance: &ProtectInstance,
    only: Option<CameraId>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    let coordinator = instance.coordinator();
    let mut stream = coordinator.subscribe();

    let initial = snapshot(coordinator, only.as_ref());
    if !global.quiet {
        eprintln!("Watching {} camera(s); Ctrl-C to stop", initial.len());
    }
    let mut prev: HashMap<CameraId, CameraState> = by_id(initial);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            cycle = stream.changed() => {
                let Some(cycle) = cycle else { break };
                if !cycle.success {
                    let line = util::watch_line(cycle.completed_at, "-", "poll failed, data may be stale");
                    println!("{}", util::paint(&line, AnsiColors::Yellow, color));
                    continue;
                }
                let next = snapshot(coordinator, only.as_ref());
                report_changes(&prev, &next, cycle.completed_at, color);
                prev = by_id(next);
            }
        }
    }
    Ok(())
}

/// Current camera set, optionally narrowed to one id. Store order (by
/// name) is preserved so lines within a cycle come out stable.
fn snapshot(coordinator: &Coordinator, only: Option<&CameraId>) -> Vec<CameraState> {
    coordinator
        .data()
        .iter()
        .map(|c| (**c).clone())
        .filter(|c| only.is_none_or(|id| &c.id == id))
        .collect()
}

fn by_id(cameras: Vec<CameraState>) -> HashMap<CameraId, CameraState> {
    cameras.into_iter().map(|c| (c.id.clone(), c)).collect()
}

fn report_changes(
    prev: &HashMap<CameraId, CameraState>,
    next: &[CameraState],
    at: DateTime<Utc>,
    color: bool,
) {
    for cam in next {
        let Some(old) = prev.get(&cam.id) else {
            emit(at, &cam.name, "appeared", AnsiColors::Cyan, color);
            continue;
        };

        if old.online != cam.online {
            if cam.online {
                emit(at, &cam.name, "went online", AnsiColors::Green, color);
            } else {
                emit(at, &cam.name, "went offline", AnsiColors::Red, color);
            }
        }
        if !old.event_on && cam.event_on {
            let message = format!("motion started (score {})", cam.event_score);
            emit(at, &cam.name, &message, AnsiColors::Green, color);
        } else if old.event_on && !cam.event_on {
            emit(at, &cam.name, "motion ended", AnsiColors::Default, color);
        }
        if !old.event_ring_on && cam.event_ring_on {
            emit(at, &cam.name, "doorbell ring", AnsiColors::Magenta, color);
        }
        if old.recording_mode != cam.recording_mode {
            let message = format!("recording mode now {}", cam.recording_mode);
            emit(at, &cam.name, &message, AnsiColors::Default, color);
        }
    }

    for (id, old) in prev {
        if !next.iter().any(|c| &c.id == id) {
            emit(at, &old.name, "removed from NVR", AnsiColors::Yellow, color);
        }
    }
}

fn emit(at: DateTime<Utc>, name: &str, message: &str, color: AnsiColors, enabled: bool) {
    let line = util::watch_line(at, name, message);
    println!("{}", util::paint(&line, color, enabled));
}
