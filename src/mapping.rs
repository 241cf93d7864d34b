//! Camera-space to screen-space remapping.
//!
//! A `margin` wide border of the camera frame is cut off so the whole screen can
//! be reached without the hand leaving the camera's field of view.

#[derive(Debug)]
pub struct ScreenMapper {
    margin: i32,
    smoothing: f32,
    last: Option<(f32, f32)>,
}

impl ScreenMapper {
    pub fn new(margin: i32, smoothing: f32) -> Self {
        Self {
            margin: margin.max(0),
            smoothing: smoothing.clamp(0.0, 0.99),
            last: None,
        }
    }

    /// Map a frame pixel to a screen pixel, smoothing against the previous output.
    pub fn map(&mut self, point: (i32, i32), frame: (u32, u32), screen: (i32, i32)) -> (i32, i32) {
        let target = (
            map_axis(point.0, frame.0 as i32, self.margin, screen.0),
            map_axis(point.1, frame.1 as i32, self.margin, screen.1),
        );
        let target = (target.0 as f32, target.1 as f32);

        let next = match self.last {
            Some(prev) if self.smoothing > 0.0 => {
                let s = self.smoothing;
                (
                    prev.0 * s + target.0 * (1.0 - s),
                    prev.1 * s + target.1 * (1.0 - s),
                )
            }
            _ => target,
        };
        self.last = Some(next);
        (next.0.round() as i32, next.1.round() as i32)
    }

    /// Forget the smoothing history, e.g. when the hand leaves the frame.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

fn map_axis(value: i32, frame_dim: i32, margin: i32, screen_dim: i32) -> i32 {
    let margin = margin.min((frame_dim - 1).max(0) / 2);
    let span = (frame_dim - 2 * margin).max(1);
    let mapped = (value - margin) as f32 * screen_dim as f32 / span as f32;
    (mapped as i32).clamp(0, (screen_dim - 1).max(0))
}
