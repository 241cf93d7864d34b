//! MediaPipe Hands through an embedded Python interpreter.
//!
//! Requires the `mediapipe` Python package to be importable by the interpreter
//! pyo3 links against.

use image::RgbImage;
use numpy::{PyArray3, ndarray::Array3};
use pyo3::{prelude::*, types::PyDict};
use tracing::debug;

use super::{DetectorError, HandDetector, decode::landmark_array};
use crate::config::DetectorConfig;
use crate::landmarks::{DetectedHand, Handedness, Landmark};

impl From<PyErr> for DetectorError {
    fn from(err: PyErr) -> Self {
        DetectorError::Runtime(Box::new(err))
    }
}

pub(super) struct MediapipeHands {
    hands: Py<PyAny>,
}

impl MediapipeHands {
    pub(super) fn new(config: &DetectorConfig) -> Result<Self, DetectorError> {
        Python::with_gil(|py| {
            let solution = py
                .import("mediapipe")?
                .getattr("solutions")?
                .getattr("hands")?;

            let kwargs = PyDict::new(py);
            kwargs.set_item("static_image_mode", false)?;
            kwargs.set_item("max_num_hands", config.max_hands)?;
            kwargs.set_item("min_detection_confidence", config.min_detection_confidence)?;
            kwargs.set_item("min_tracking_confidence", config.min_tracking_confidence)?;

            let hands = solution.call_method("Hands", (), Some(&kwargs))?;
            Ok(Self {
                hands: hands.unbind(),
            })
        })
    }
}

impl HandDetector for MediapipeHands {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<DetectedHand>, DetectorError> {
        let (width, height) = frame.dimensions();
        let pixels = Array3::from_shape_vec(
            (height as usize, width as usize, 3),
            frame.as_raw().clone(),
        )
        .map_err(|err| DetectorError::Frame(err.to_string()))?;

        Python::with_gil(|py| {
            let image = PyArray3::from_owned_array(py, pixels);
            let results = self.hands.bind(py).call_method1("process", (image,))?;

            let landmarks = results.getattr("multi_hand_landmarks")?;
            let handedness = results.getattr("multi_handedness")?;
            if landmarks.is_none() || handedness.is_none() {
                return Ok(Vec::new());
            }

            let mut hands = Vec::new();
            for (hand, label) in landmarks.try_iter()?.zip(handedness.try_iter()?) {
                let classification = label?.getattr("classification")?.get_item(0)?;
                let side: String = classification.getattr("label")?.extract()?;
                let score: f32 = classification.getattr("score")?.extract()?;

                let points = hand?
                    .getattr("landmark")?
                    .try_iter()?
                    .map(|point| {
                        let point = point?;
                        Ok(Landmark::new(
                            point.getattr("x")?.extract()?,
                            point.getattr("y")?.extract()?,
                            point.getattr("z")?.extract()?,
                        ))
                    })
                    .collect::<PyResult<Vec<_>>>()?;

                hands.push(DetectedHand {
                    landmarks: landmark_array(&points)?,
                    handedness: Handedness::from_label(&side),
                    score,
                });
            }

            debug!(hands = hands.len(), "mediapipe detection");
            Ok(hands)
        })
    }
}
