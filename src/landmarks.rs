//! Hand landmark model shared by the detector backends, the gesture logic and the overlay.

use clap::ValueEnum;

/// Number of landmarks produced per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices, hand landmark model convention.
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_MCP: usize = 5;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_DIP: usize = 7;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP: usize = 13;
    pub const RING_FINGER_PIP: usize = 14;
    pub const RING_FINGER_DIP: usize = 15;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// Bone pairs of the hand skeleton, used for drawing.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = {
    use index::*;
    [
        (WRIST, THUMB_CMC),
        (THUMB_CMC, THUMB_MCP),
        (THUMB_MCP, THUMB_IP),
        (THUMB_IP, THUMB_TIP),
        (WRIST, INDEX_FINGER_MCP),
        (INDEX_FINGER_MCP, INDEX_FINGER_PIP),
        (INDEX_FINGER_PIP, INDEX_FINGER_DIP),
        (INDEX_FINGER_DIP, INDEX_FINGER_TIP),
        (INDEX_FINGER_MCP, MIDDLE_FINGER_MCP),
        (MIDDLE_FINGER_MCP, MIDDLE_FINGER_PIP),
        (MIDDLE_FINGER_PIP, MIDDLE_FINGER_DIP),
        (MIDDLE_FINGER_DIP, MIDDLE_FINGER_TIP),
        (MIDDLE_FINGER_MCP, RING_FINGER_MCP),
        (RING_FINGER_MCP, RING_FINGER_PIP),
        (RING_FINGER_PIP, RING_FINGER_DIP),
        (RING_FINGER_DIP, RING_FINGER_TIP),
        (RING_FINGER_MCP, PINKY_MCP),
        (WRIST, PINKY_MCP),
        (PINKY_MCP, PINKY_PIP),
        (PINKY_PIP, PINKY_DIP),
        (PINKY_DIP, PINKY_TIP),
    ]
};

/// Which hand the model believes it is looking at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Parse the classification label emitted by the model ("Left" / "Right").
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            l if l.eq_ignore_ascii_case("left") => Some(Handedness::Left),
            l if l.eq_ignore_ascii_case("right") => Some(Handedness::Right),
            _ => None,
        }
    }
}

/// A single landmark. `x` and `y` are normalized to the frame width and height.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Pixel position inside a `width` x `height` frame, truncated toward zero.
    pub fn to_pixel(&self, width: u32, height: u32) -> (i32, i32) {
        (
            (self.x * width as f32) as i32,
            (self.y * height as f32) as i32,
        )
    }

    /// Manhattan distance in normalized coordinates.
    pub fn manhattan(&self, other: &Landmark) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// One hand returned by a detector backend.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedHand {
    pub landmarks: [Landmark; LANDMARK_COUNT],
    pub handedness: Option<Handedness>,
    pub score: f32,
}

impl DetectedHand {
    pub fn landmark(&self, idx: usize) -> &Landmark {
        &self.landmarks[idx]
    }

    /// Point that drives the cursor.
    pub fn anchor(&self) -> &Landmark {
        self.landmark(index::INDEX_FINGER_MCP)
    }

    /// Thumb–index and thumb–middle fingertip distances.
    pub fn pinch_distances(&self) -> (f32, f32) {
        let thumb = self.landmark(index::THUMB_TIP);
        (
            thumb.manhattan(self.landmark(index::INDEX_FINGER_TIP)),
            thumb.manhattan(self.landmark(index::MIDDLE_FINGER_TIP)),
        )
    }
}

/// Pick the first hand labelled `preferred`, falling back to the first hand seen.
pub fn select_hand(hands: &[DetectedHand], preferred: Handedness) -> Option<&DetectedHand> {
    hands
        .iter()
        .find(|hand| hand.handedness == Some(preferred))
        .or_else(|| hands.first())
}

#[cfg(test)]
pub(crate) fn hand_with(
    handedness: Option<Handedness>,
    points: &[(usize, f32, f32)],
) -> DetectedHand {
    // Fingertips spread apart so no pinch is detected unless overridden.
    let mut landmarks = [Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
    landmarks[index::THUMB_TIP] = Landmark::new(0.2, 0.2, 0.0);
    landmarks[index::INDEX_FINGER_TIP] = Landmark::new(0.6, 0.2, 0.0);
    landmarks[index::MIDDLE_FINGER_TIP] = Landmark::new(0.6, 0.6, 0.0);
    for &(idx, x, y) in points {
        landmarks[idx] = Landmark::new(x, y, 0.0);
    }
    DetectedHand {
        landmarks,
        handedness,
        score: 0.9,
    }
}
