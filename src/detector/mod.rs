//! Hand landmark backends.
//!
//! Pose estimation is delegated entirely to an external model; the backends
//! only move pixels in and landmarks out.

use anyhow::{Result, bail};
use image::RgbImage;
use thiserror::Error;
use tracing::info;

use crate::config::{Backend, DetectorConfig};
use crate::landmarks::DetectedHand;

#[cfg(any(feature = "mediapipe", feature = "torch", test))]
mod decode;
#[cfg(feature = "mediapipe")]
mod mediapipe;
#[cfg(feature = "torch")]
mod torchscript;

#[derive(Debug, Error)]
pub enum DetectorError {
    /// Failure raised inside the model runtime (Python or libtorch).
    #[error("model runtime: {0}")]
    Runtime(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("unexpected model output: {0}")]
    Output(String),
    #[error("invalid frame: {0}")]
    Frame(String),
}

pub trait HandDetector {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<DetectedHand>, DetectorError>;
}

/// Construct the backend selected on the command line.
pub fn build(config: &DetectorConfig) -> Result<Box<dyn HandDetector>> {
    info!(backend = ?config.backend, "loading hand landmark model");
    match config.backend {
        Backend::Mediapipe => build_mediapipe(config),
        Backend::Torchscript => build_torchscript(config),
    }
}

#[cfg(feature = "mediapipe")]
fn build_mediapipe(config: &DetectorConfig) -> Result<Box<dyn HandDetector>> {
    Ok(Box::new(mediapipe::MediapipeHands::new(config)?))
}

#[cfg(not(feature = "mediapipe"))]
fn build_mediapipe(_config: &DetectorConfig) -> Result<Box<dyn HandDetector>> {
    bail!("mediapipe backend not compiled in; rebuild with --features mediapipe")
}

#[cfg(feature = "torch")]
fn build_torchscript(config: &DetectorConfig) -> Result<Box<dyn HandDetector>> {
    let Some(path) = config.model_path.as_ref() else {
        bail!("torchscript backend requires a model path");
    };
    Ok(Box::new(torchscript::TorchScriptHands::new(
        path,
        config.min_detection_confidence,
    )?))
}

#[cfg(not(feature = "torch"))]
fn build_torchscript(_config: &DetectorConfig) -> Result<Box<dyn HandDetector>> {
    bail!("torchscript backend not compiled in; rebuild with --features torch")
}
