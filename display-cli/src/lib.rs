//! # Saorsa Display CLI
//!
//! Native diagnostics for the display controller. Everything the browser
//! adapter decides can be reproduced here from plain inputs.
//!
//! ## Usage
//!
//! ```bash
//! # Which family is this agent, and which hints would show?
//! display-cli classify --user-agent "Mozilla/5.0 (iPhone; ...)" --fullscreen webkit
//!
//! # Canvas size for a viewport
//! display-cli size 1200 900 --max-aspect 1.4 --dpr 2
//!
//! # Validate a page config
//! display-cli config display.json
//!
//! # Dry-run a session where the orientation lock is rejected
//! display-cli simulate --user-agent "Linux; Android 14" --fullscreen standard \
//!     --orientation-lock --lock-response reject
//! ```
//!
//! Output is JSON on stdout; logs go to stderr.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod simulate;

pub use simulate::{
    describe_outcome, simulate, ExitPoint, FullscreenResponse, LockResponse, Script,
    SimulationReport, Trigger,
};

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use display_core::{
    classify, compute_canvas_size, CanvasTargetSize, DisplayConfig, EnvironmentClassification,
    EnvironmentSignals, FullscreenProbe, MaxAspect, PresentationHooks, ViewportSize,
};
use serde::Serialize;

/// Command-line arguments for display-cli.
#[derive(Debug, Clone, Parser)]
#[command(name = "display-cli")]
#[command(about = "Saorsa Display diagnostics")]
#[command(version)]
pub struct CliArgs {
    /// What to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Diagnostic commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Classify a host environment
    Classify(SignalArgs),
    /// Compute the canvas size for a viewport
    Size(SizeArgs),
    /// Validate a JSON configuration file
    Config {
        /// Path to the configuration file
        path: PathBuf,
    },
    /// Simulate one fullscreen session against a scripted host
    Simulate(SimulateArgs),
}

/// A fullscreen request variant the host exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FullscreenVariant {
    /// `requestFullscreen`
    Standard,
    /// `webkitRequestFullscreen`
    Webkit,
    /// `mozRequestFullScreen`
    Moz,
    /// `msRequestFullscreen`
    Ms,
}

/// Environment signals, as the browser adapter would read them.
#[derive(Debug, Clone, Default, Args)]
pub struct SignalArgs {
    /// User agent string
    #[arg(long, env = "DISPLAY_USER_AGENT", default_value = "")]
    pub user_agent: String,

    /// The `(display-mode: standalone)` media query matches
    #[arg(long)]
    pub standalone_media: bool,

    /// Value of the legacy `navigator.standalone` flag
    #[arg(long)]
    pub navigator_standalone: Option<bool>,

    /// Fullscreen request variants present on the container (repeatable)
    #[arg(long = "fullscreen", value_enum)]
    pub fullscreen: Vec<FullscreenVariant>,

    /// `screen.orientation.lock` is present
    #[arg(long)]
    pub orientation_lock: bool,
}

impl SignalArgs {
    /// Build classifier input from the flags.
    #[must_use]
    pub fn to_signals(&self) -> EnvironmentSignals {
        let mut probe = FullscreenProbe::NONE;
        for variant in &self.fullscreen {
            match variant {
                FullscreenVariant::Standard => probe.standard = true,
                FullscreenVariant::Webkit => probe.webkit = true,
                FullscreenVariant::Moz => probe.moz = true,
                FullscreenVariant::Ms => probe.ms = true,
            }
        }

        let mut signals = EnvironmentSignals::new(self.user_agent.clone())
            .with_standalone_media(self.standalone_media)
            .with_fullscreen(probe)
            .with_orientation_lock(self.orientation_lock);
        if let Some(standalone) = self.navigator_standalone {
            signals = signals.with_navigator_standalone(standalone);
        }
        signals
    }
}

/// Arguments for `size`.
#[derive(Debug, Clone, Args)]
pub struct SizeArgs {
    /// Viewport width in CSS pixels
    pub width: u32,

    /// Viewport height in CSS pixels
    pub height: u32,

    /// Maximum width-to-height ratio
    #[arg(long, env = "DISPLAY_MAX_ASPECT", default_value_t = MaxAspect::DEFAULT.get())]
    pub max_aspect: f64,

    /// Device pixel ratio for the backing store
    #[arg(long, default_value_t = 1.0)]
    pub dpr: f64,
}

/// Arguments for `simulate`.
#[derive(Debug, Clone, Args)]
pub struct SimulateArgs {
    /// Environment the session runs in.
    #[command(flatten)]
    pub signals: SignalArgs,

    /// Event that starts the session
    #[arg(long, value_enum, default_value_t = Trigger::Pointer)]
    pub trigger: Trigger,

    /// How the fullscreen request is answered
    #[arg(long, value_enum, default_value_t = FullscreenResponse::Grant)]
    pub fullscreen_response: FullscreenResponse,

    /// How the orientation lock is answered
    #[arg(long, value_enum, default_value_t = LockResponse::Lock)]
    pub lock_response: LockResponse,

    /// Leave fullscreen at this point
    #[arg(long, value_enum)]
    pub exit_during: Option<ExitPoint>,
}

/// Output of `classify`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyReport {
    /// The classification.
    pub classification: EnvironmentClassification,
    /// Whether the "Add to Home Screen" hint shows.
    pub show_add_to_home_screen_hint: bool,
    /// Whether the standalone hint shows.
    pub show_standalone_hint: bool,
    /// Classes the browser adapter would put on `<html>`.
    pub classes: Vec<&'static str>,
}

impl ClassifyReport {
    /// Build the report for a classification.
    #[must_use]
    pub fn new(classification: EnvironmentClassification) -> Self {
        Self {
            classification,
            show_add_to_home_screen_hint: classification.show_add_to_home_screen_hint(),
            show_standalone_hint: classification.show_standalone_hint(),
            classes: PresentationHooks::from_classification(&classification).classes(),
        }
    }
}

/// Output of `size`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeReport {
    /// Input viewport.
    pub viewport: ViewportSize,
    /// Ceiling applied.
    pub max_aspect: MaxAspect,
    /// Canvas size in CSS pixels.
    pub canvas: CanvasTargetSize,
    /// Backing store size in device pixels.
    pub backing: CanvasTargetSize,
}

/// Compute a size report.
///
/// # Errors
///
/// Returns an error if `max_aspect` is not a finite positive number.
pub fn size_report(args: &SizeArgs) -> anyhow::Result<SizeReport> {
    let max_aspect = MaxAspect::new(args.max_aspect)?;
    let viewport = ViewportSize::new(args.width, args.height);
    let canvas = compute_canvas_size(viewport, max_aspect);
    Ok(SizeReport {
        viewport,
        max_aspect,
        canvas,
        backing: canvas.scaled(args.dpr),
    })
}

/// Load and validate a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the configuration is invalid.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<DisplayConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = DisplayConfig::from_json(&json)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}

/// Run a command and render its output as pretty JSON.
///
/// # Errors
///
/// Returns an error if the command fails.
pub fn run(args: &CliArgs) -> anyhow::Result<String> {
    let output = match &args.command {
        Command::Classify(signals) => {
            let classification = classify(&signals.to_signals());
            tracing::info!(family = %classification.platform_family(), "Classified");
            serde_json::to_string_pretty(&ClassifyReport::new(classification))?
        }
        Command::Size(size) => serde_json::to_string_pretty(&size_report(size)?)?,
        Command::Config { path } => serde_json::to_string_pretty(&load_config(path)?)?,
        Command::Simulate(sim) => {
            let classification = classify(&sim.signals.to_signals());
            let script = Script {
                trigger: sim.trigger,
                fullscreen: sim.fullscreen_response,
                lock: sim.lock_response,
                exit: sim.exit_during,
            };
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .context("Failed to build runtime")?;
            let report = runtime.block_on(simulate(classification, script));
            serde_json::to_string_pretty(&report)?
        }
    };
    Ok(output)
}
