//! Webcam capture through `nokhwa`.

use image::{RgbImage, imageops};
use nokhwa::{
    Camera, NokhwaError,
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to open camera #{index}: {source}")]
    Open {
        index: u32,
        #[source]
        source: NokhwaError,
    },
    #[error("failed to read frame: {0}")]
    Read(#[from] NokhwaError),
}

/// Anything the controller can pull frames from.
pub trait FrameSource {
    /// Grab and decode the next frame, mirrored so the preview behaves like a mirror.
    fn frame(&mut self) -> Result<RgbImage, CaptureError>;
}

/// Mirrored RGB frames from a local camera.
pub struct Webcam {
    camera: Camera,
}

impl Webcam {
    pub fn open(index: u32, resolution: (u32, u32)) -> Result<Self, CaptureError> {
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(resolution.0, resolution.1),
                FrameFormat::MJPEG,
                30,
            ),
        ));
        let open = || -> Result<Camera, NokhwaError> {
            let mut camera = Camera::new(CameraIndex::Index(index), requested)?;
            camera.open_stream()?;
            Ok(camera)
        };
        let camera = open().map_err(|source| CaptureError::Open { index, source })?;

        let format = camera.camera_format();
        info!(
            index,
            width = format.resolution().width(),
            height = format.resolution().height(),
            fps = format.frame_rate(),
            "camera opened"
        );
        Ok(Self { camera })
    }
}

impl FrameSource for Webcam {
    fn frame(&mut self) -> Result<RgbImage, CaptureError> {
        let buffer = self.camera.frame()?;
        let mut image = buffer.decode_image::<RgbFormat>()?;
        imageops::flip_horizontal_in_place(&mut image);
        Ok(image)
    }
}

impl Drop for Webcam {
    fn drop(&mut self) {
        let _ = self.camera.stop_stream();
    }
}
