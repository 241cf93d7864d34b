use std::{convert::TryFrom, path::Path};

use image::{RgbImage, imageops};
use tch::{Device, Kind, Tensor};
use tracing::debug;

use super::{DetectorError, HandDetector, decode::decode_single_hand};
use crate::landmarks::DetectedHand;

const INPUT_SIZE: u32 = 224;

impl From<tch::TchError> for DetectorError {
    fn from(err: tch::TchError) -> Self {
        DetectorError::Runtime(Box::new(err))
    }
}

/// Single-hand TorchScript landmark model.
///
/// Expects a `[1, 3, 224, 224]` float RGB input in `[0, 1]` and returns at least
/// 64 values: 63 normalized landmark coordinates, a presence score and,
/// optionally, a right-hand probability.
pub(super) struct TorchScriptHands {
    module: tch::CModule,
    device: Device,
    min_presence: f32,
}

impl TorchScriptHands {
    pub(super) fn new<P: AsRef<Path>>(model_path: P, min_presence: f32) -> Result<Self, DetectorError> {
        let device = Device::cuda_if_available();
        let module = tch::CModule::load_on_device(model_path, device)?;
        Ok(Self {
            module,
            device,
            min_presence,
        })
    }

    fn to_tensor(&self, frame: &RgbImage) -> Tensor {
        let resized = imageops::resize(
            frame,
            INPUT_SIZE,
            INPUT_SIZE,
            imageops::FilterType::Triangle,
        );
        let side = INPUT_SIZE as i64;
        Tensor::from_slice(resized.as_raw())
            .to_device(self.device)
            .to_kind(Kind::Float)
            .view([1, side, side, 3])
            .permute([0, 3, 1, 2])
            / 255.0
    }
}

impl HandDetector for TorchScriptHands {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<DetectedHand>, DetectorError> {
        let input = self.to_tensor(frame);
        let output = tch::no_grad(|| self.module.forward_ts(&[input]))?;
        let flat = output
            .to_device(Device::Cpu)
            .to_kind(Kind::Float)
            .flatten(0, -1);
        let values = Vec::<f32>::try_from(&flat)?;

        debug!(values = values.len(), "torchscript detection");
        decode_single_hand(&values, self.min_presence)
    }
}
