//! Headless driver for the annotation engine.
//!
//! Replays a script of pointer events and commands against a software-rendered canvas, logging every
//! notification, and optionally saves the composited result:
//!
//! `inkpad [--settings <settings.toml>] [--output <image.png>] [script.toml]`

mod export;
mod global;
mod script;

use anyhow::Result as AnyResult;
use inkpad_core::{events::Notification, surface::RasterSurface, Engine};

#[derive(Clone, PartialEq, Eq, Debug, Default)]
struct Args {
    settings: Option<std::path::PathBuf>,
    output: Option<std::path::PathBuf>,
    script: Option<std::path::PathBuf>,
}
impl Args {
    /// Paths are OSStrings, let the system handle character encoding restrictions.
    fn parse(args: impl IntoIterator<Item = std::ffi::OsString>) -> AnyResult<Self> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let slot = match arg.to_str() {
                Some("--settings") => &mut parsed.settings,
                Some("--output" | "-o") => &mut parsed.output,
                Some(flag) if flag.starts_with('-') => anyhow::bail!("unknown flag {flag:?}"),
                _ => {
                    if parsed.script.is_some() {
                        anyhow::bail!("more than one script given");
                    }
                    parsed.script = Some(std::path::PathBuf::from(&arg));
                    continue;
                }
            };
            let Some(value) = args.next() else {
                anyhow::bail!("{arg:?} expects a path");
            };
            *slot = Some(value.into());
        }
        Ok(parsed)
    }
}

fn drain(notifications: &crossbeam::channel::Receiver<Notification>) {
    for notification in notifications.try_iter() {
        match notification {
            Notification::Ready { version, features } => {
                log::info!("ready: v{version}, {features:?}");
            }
            Notification::StrokeAdded {
                stroke,
                layer_index,
            } => log::info!(
                "stroke-added: {} with {} points on layer {layer_index}",
                stroke.id,
                stroke.points.len()
            ),
            Notification::LayerChanged {
                current_layer,
                total_layers,
                layer_name,
            } => log::info!("layer-changed: {layer_name:?} ({current_layer} of {total_layers})"),
        }
    }
}

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let args = Args::parse(std::env::args_os().skip(1))?;

    let settings = match (&args.settings, global::settings::Settings::default_path()) {
        (Some(path), _) => global::settings::Settings::load_or_default(path).0,
        (None, Some(path)) => {
            let (settings, existed) = global::settings::Settings::load_or_default(&path);
            // Leave a documented file behind for the user to edit.
            if !existed {
                if let Err(e) = settings.save(&path) {
                    log::warn!("Failed to save default settings:\n{e:?}");
                }
            }
            settings
        }
        (None, None) => {
            log::warn!("No preferences directory, using default settings");
            global::settings::Settings::default()
        }
    };

    let (send, notifications) = crossbeam::channel::unbounded();
    let mut engine = Engine::<RasterSurface, _>::new(settings.engine_config(), send)
        .map_err(|e| anyhow::anyhow!("failed to create canvas: {e}"))?;
    drain(&notifications);

    if let Some(path) = &args.script {
        let script = script::Script::load(path)
            .map_err(|e| anyhow::anyhow!("failed to read script {path:?}: {e:#}"))?;
        log::info!("running {} steps from {path:?}", script.step.len());
        script.run(&mut engine, |_| drain(&notifications));
    }

    let stats = engine.stats();
    log::info!(
        "{} layers, {} strokes, current layer {}",
        stats.total_layers,
        stats.total_strokes,
        stats.current_layer
    );

    if let Some(path) = &args.output {
        export::save_png(path, engine.display())?;
    }
    Ok(())
}
