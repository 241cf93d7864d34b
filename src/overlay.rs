//! Annotated preview window.

use image::RgbImage;
use opencv::{
    core::{self, Mat, Point, Scalar, Size},
    highgui, imgproc,
    prelude::*,
};
use thiserror::Error;

use crate::landmarks::{DetectedHand, HAND_CONNECTIONS};

const WINDOW: &str = "Handroller";

#[derive(Debug, Error)]
#[error("preview window: {0}")]
pub struct OverlayError(#[from] opencv::Error);

/// What to draw on top of the current frame.
#[derive(Debug, Default)]
pub struct Annotations<'a> {
    pub hand: Option<&'a DetectedHand>,
    /// Anchor position in frame pixels.
    pub anchor: Option<(i32, i32)>,
    pub label: Option<&'a str>,
}

pub struct Overlay {
    scale: f64,
}

impl Overlay {
    pub fn new(scale: f64) -> Result<Self, OverlayError> {
        highgui::named_window(WINDOW, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self { scale })
    }

    /// Draw and show one frame. Returns `false` once `q` has been pressed.
    pub fn show(&mut self, frame: &RgbImage, annotations: &Annotations) -> Result<bool, OverlayError> {
        let (width, height) = frame.dimensions();
        let mut rgb = Mat::new_rows_cols_with_default(
            height as i32,
            width as i32,
            core::CV_8UC3,
            Scalar::all(0.0),
        )?;
        rgb.data_bytes_mut()?.copy_from_slice(frame.as_raw());
        let mut canvas = Mat::default();
        imgproc::cvt_color_def(&rgb, &mut canvas, imgproc::COLOR_RGB2BGR)?;

        let green = Scalar::new(0.0, 255.0, 0.0, 0.0);

        if let Some(hand) = annotations.hand {
            draw_hand(&mut canvas, hand, width, height)?;
        }
        if let Some(label) = annotations.label {
            put_text(&mut canvas, label, Point::new(10, 40), 1.0, 2, green)?;
        }
        if let Some((x, y)) = annotations.anchor {
            let column = width as i32 - 100;
            put_text(&mut canvas, &format!("x:{x}"), Point::new(column, 30), 0.5, 1, green)?;
            put_text(&mut canvas, &format!("y:{y}"), Point::new(column, 50), 0.5, 1, green)?;
        }

        let mut scaled = Mat::default();
        imgproc::resize(
            &canvas,
            &mut scaled,
            Size::new(0, 0),
            self.scale,
            self.scale,
            imgproc::INTER_AREA,
        )?;
        highgui::imshow(WINDOW, &scaled)?;

        let key = highgui::wait_key(1)?;
        Ok(key & 0xFF != 'q' as i32)
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        let _ = highgui::destroy_all_windows();
    }
}

fn draw_hand(canvas: &mut Mat, hand: &DetectedHand, width: u32, height: u32) -> opencv::Result<()> {
    let points: Vec<Point> = hand
        .landmarks
        .iter()
        .map(|lm| {
            let (x, y) = lm.to_pixel(width, height);
            Point::new(x, y)
        })
        .collect();

    for &(from, to) in HAND_CONNECTIONS.iter() {
        imgproc::line(
            canvas,
            points[from],
            points[to],
            Scalar::new(224.0, 224.0, 224.0, 0.0),
            2,
            imgproc::LINE_AA,
            0,
        )?;
    }
    for &point in &points {
        imgproc::circle(
            canvas,
            point,
            4,
            Scalar::new(0.0, 0.0, 255.0, 0.0),
            imgproc::FILLED,
            imgproc::LINE_AA,
            0,
        )?;
    }
    Ok(())
}

fn put_text(
    canvas: &mut Mat,
    text: &str,
    origin: Point,
    scale: f64,
    thickness: i32,
    color: Scalar,
) -> opencv::Result<()> {
    imgproc::put_text(
        canvas,
        text,
        origin,
        imgproc::FONT_HERSHEY_SIMPLEX,
        scale,
        color,
        thickness,
        imgproc::LINE_AA,
        false,
    )
}
