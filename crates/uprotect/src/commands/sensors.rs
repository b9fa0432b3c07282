//! Binary sensor command handlers.
//!
//! Sensors are live entities computed from the coordinator snapshot, so
//! listing goes through a serializable view struct rather than the
//! entities themselves.

use std::collections::HashMap;

use owo_colors::AnsiColors;
use serde::Serialize;
use tabled::Tabled;
use uprotect_core::{BinarySensor, CameraId, Entity, ProtectInstance};

use crate::cli::{GlobalOpts, SensorsArgs, SensorsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── View + table row ────────────────────────────────────────────────

/// Point-in-time reading of one sensor.
#[derive(Serialize)]
struct SensorView {
    unique_id: String,
    entity_id: String,
    name: String,
    device_class: String,
    state: String,
    available: bool,
    camera_id: String,
}

impl SensorView {
    fn capture(sensor: &BinarySensor) -> Self {
        Self {
            unique_id: sensor.unique_id(),
            entity_id: sensor.entity_id(),
            name: sensor.name(),
            device_class: sensor.sensor_kind().device_class().into(),
            state: output::on_off(sensor.is_on()).into(),
            available: sensor.available(),
            camera_id: sensor.camera_id().to_string(),
        }
    }
}

#[derive(Tabled)]
struct SensorRow {
    #[tabled(rename = "Entity")]
    entity_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Class")]
    device_class: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Available")]
    available: String,
}

impl From<&SensorView> for SensorRow {
    fn from(v: &SensorView) -> Self {
        Self {
            entity_id: v.entity_id.clone(),
            name: v.name.clone(),
            device_class: v.device_class.clone(),
            state: v.state.clone(),
            available: output::yes_no(v.available).into(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    instance: &ProtectInstance,
    args: SensorsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SensorsCommand::List => {
            let views: Vec<SensorView> = instance
                .binary_sensors()
                .iter()
                .map(SensorView::capture)
                .collect();
            let out = output::render_list(global.output, &views, |v| SensorRow::from(v), |v| {
                v.entity_id.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SensorsCommand::Watch {
            camera,
            interval: _,
        } => {
            let only = camera
                .map(|c| instance.resolve_camera(&c))
                .transpose()?
                .map(|c| c.id.clone());
            watch(instance, only, global).await
        }
    }
}

// ── Watch loop ──────────────────────────────────────────────────────

/// Follow refresh cycles and print sensor transitions until Ctrl-C.
///
/// The sensor set is rebuilt every cycle so cameras that appear mid-watch
/// get their sensors picked up without a restart.
async fn watch(
    instance: &ProtectInstance,
    only: Option<CameraId>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    let mut stream = instance.coordinator().subscribe();

    let mut prev = states(instance, only.as_ref());
    if !global.quiet {
        eprintln!("Watching {} sensor(s); Ctrl-C to stop", prev.len());
    }

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

                for sensor in filtered(instance, only.as_ref()) {
                    let on = sensor.is_on();
                    let name = sensor.name();
                    let newsworthy = match prev.insert(sensor.entity_id(), on) {
                        Some(was) => was != on,
                        // Brand-new sensor; only report it if already tripped.
                        None => on,
                    };
                    if newsworthy {
                        let message = if on { "tripped" } else { "cleared" };
                        let style = if on { AnsiColors::Green } else { AnsiColors::Default };
                        let line = util::watch_line(cycle.completed_at, &name, message);
                        println!("{}", util::paint(&line, style, color));
                    }
                }
            }
        }
    }
    Ok(())
}

fn filtered(instance: &ProtectInstance, only: Option<&CameraId>) -> Vec<BinarySensor> {
    instance
        .binary_sensors()
        .into_iter()
        .filter(|s| only.is_none_or(|id| s.camera_id() == id))
        .collect()
}

fn states(instance: &ProtectInstance, only: Option<&CameraId>) -> HashMap<String, bool> {
    filtered(instance, only)
        .iter()
        .map(|s| (s.entity_id(), s.is_on()))
        .collect()
}
