//! Command line parsing and validation.
//!
//! `Cli` is the raw clap surface; [`ControllerConfig`] is what the rest of the
//! program consumes once the values have been checked.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};

use crate::gesture::GestureTiming;
use crate::landmarks::Handedness;

/// Landmark model used to find hands in a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Python `mediapipe` hands solution, embedded in-process.
    Mediapipe,
    /// TorchScript landmark model loaded through libtorch.
    Torchscript,
}

#[derive(Debug, Parser)]
#[command(name = "handroller", version, about = "Hand gesture mouse control")]
pub struct Cli {
    /// Display the webcam feed with hand landmarks.
    #[arg(long)]
    pub display: bool,
    /// Hand that drives the pointer when more than one is visible.
    #[arg(long, value_enum, default_value_t = Handedness::Right)]
    pub hand: Handedness,
    /// Capture device index.
    #[arg(long, default_value_t = 0)]
    pub camera: u32,
    /// Requested capture width in pixels.
    #[arg(long, default_value_t = 640)]
    pub width: u32,
    /// Requested capture height in pixels.
    #[arg(long, default_value_t = 480)]
    pub height: u32,
    /// Landmark backend.
    #[arg(long, value_enum, default_value_t = Backend::Mediapipe)]
    pub backend: Backend,
    /// TorchScript model path (torchscript backend only).
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,
    #[arg(long, default_value_t = 0.7)]
    pub min_detection_confidence: f32,
    #[arg(long, default_value_t = 0.7)]
    pub min_tracking_confidence: f32,
    #[arg(long, default_value_t = 2)]
    pub max_hands: u32,
    /// Normalized fingertip distance below which a pinch is detected.
    #[arg(long, default_value_t = 0.05)]
    pub pinch_threshold: f32,
    /// Seconds within which a second tap becomes a double click.
    #[arg(long, default_value_t = 0.5)]
    pub double_click_window: f64,
    /// Minimum seconds between single clicks.
    #[arg(long, default_value_t = 0.7)]
    pub cooldown: f64,
    /// Seconds a pinch must be held to start a drag.
    #[arg(long, default_value_t = 0.6)]
    pub hold: f64,
    /// Seconds a pinch may drop out before it counts as released.
    #[arg(long, default_value_t = 0.1)]
    pub release_grace: f64,
    /// Camera border in pixels excluded from the screen mapping.
    #[arg(long, default_value_t = 150)]
    pub margin: i32,
    /// Pointer smoothing factor in [0, 1); 0 disables smoothing.
    #[arg(long, default_value_t = 0.0)]
    pub smoothing: f32,
    /// Scale applied to the preview window.
    #[arg(long, default_value_t = 0.5)]
    pub display_scale: f64,
    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Debug)]
pub struct DetectorConfig {
    pub backend: Backend,
    pub model_path: Option<PathBuf>,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    pub max_hands: u32,
}

#[derive(Clone, Debug)]
pub struct ControllerConfig {
    pub camera_index: u32,
    pub resolution: (u32, u32),
    pub display: bool,
    pub display_scale: f64,
    pub preferred_hand: Handedness,
    pub pinch_threshold: f32,
    pub timing: GestureTiming,
    pub margin: i32,
    pub smoothing: f32,
    pub detector: DetectorConfig,
}

impl TryFrom<Cli> for ControllerConfig {
    type Error = anyhow::Error;

    fn try_from(cli: Cli) -> Result<Self> {
        if cli.width == 0 || cli.height == 0 {
            bail!("--width and --height must be positive");
        }
        for (flag, value) in [
            ("--min-detection-confidence", cli.min_detection_confidence),
            ("--min-tracking-confidence", cli.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{flag} must be between 0 and 1");
            }
        }
        if cli.max_hands == 0 {
            bail!("--max-hands must be at least 1");
        }
        if !cli.pinch_threshold.is_finite() || cli.pinch_threshold <= 0.0 {
            bail!("--pinch-threshold must be positive");
        }
        for (flag, value) in [
            ("--double-click-window", cli.double_click_window),
            ("--cooldown", cli.cooldown),
            ("--hold", cli.hold),
            ("--display-scale", cli.display_scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                bail!("{flag} must be positive");
            }
        }
        if !cli.release_grace.is_finite() || cli.release_grace < 0.0 {
            bail!("--release-grace must be a non-negative number");
        }
        if cli.margin < 0 {
            bail!("--margin must not be negative");
        }
        if !(0.0..1.0).contains(&cli.smoothing) {
            bail!("--smoothing must be in [0, 1)");
        }
        if cli.backend == Backend::Torchscript && cli.model.is_none() {
            bail!("--backend torchscript requires --model <PATH>");
        }

        Ok(Self {
            camera_index: cli.camera,
            resolution: (cli.width, cli.height),
            display: cli.display,
            display_scale: cli.display_scale,
            preferred_hand: cli.hand,
            pinch_threshold: cli.pinch_threshold,
            timing: GestureTiming {
                double_click_window: cli.double_click_window,
                cooldown: cli.cooldown,
                hold: cli.hold,
                release_grace: cli.release_grace,
            },
            margin: cli.margin,
            smoothing: cli.smoothing,
            detector: DetectorConfig {
                backend: cli.backend,
                model_path: cli.model,
                min_detection_confidence: cli.min_detection_confidence,
                min_tracking_confidence: cli.min_tracking_confidence,
                max_hands: cli.max_hands,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ControllerConfig> {
        let cli = Cli::try_parse_from(std::iter::once("handroller").chain(args.iter().copied()))?;
        ControllerConfig::try_from(cli)
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).unwrap();
        assert!(!config.display);
        assert_eq!(config.preferred_hand, Handedness::Right);
        assert_eq!(config.resolution, (640, 480));
        assert_eq!(config.margin, 150);
        assert_eq!(config.timing, GestureTiming::default());
        assert_eq!(config.detector.backend, Backend::Mediapipe);
        assert_eq!(config.display_scale, 0.5);
    }

    #[test]
    fn display_and_hand_flags() {
        let config = parse(&["--display", "--hand", "left"]).unwrap();
        assert!(config.display);
        assert_eq!(config.preferred_hand, Handedness::Left);
    }

    #[test]
    fn torchscript_requires_model() {
        let err = parse(&["--backend", "torchscript"]).unwrap_err();
        assert!(err.to_string().contains("--model"));

        let config = parse(&["--backend", "torchscript", "--model", "hand.pt"]).unwrap();
        assert_eq!(config.detector.model_path, Some(PathBuf::from("hand.pt")));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(parse(&["--smoothing", "1.0"]).is_err());
        assert!(parse(&["--min-detection-confidence", "1.5"]).is_err());
        assert!(parse(&["--cooldown", "0"]).is_err());
        assert!(parse(&["--max-hands", "0"]).is_err());
        assert!(parse(&["--hand", "both"]).is_err());
    }

    #[test]
    fn rejects_non_finite_values() {
        for args in [
            ["--pinch-threshold", "NaN"],
            ["--cooldown", "NaN"],
            ["--hold", "NaN"],
            ["--double-click-window", "inf"],
            ["--release-grace", "NaN"],
            ["--display-scale", "NaN"],
            ["--smoothing", "NaN"],
            ["--min-detection-confidence", "NaN"],
        ] {
            assert!(parse(&args).is_err(), "{args:?} accepted");
        }
    }
}
