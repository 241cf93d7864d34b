//! Pinch gestures and the click / double-click / drag timing around them.
//!
//! Timestamps are seconds on a monotonic clock supplied by the caller, which
//! keeps the engine free of wall-clock reads.

use tracing::debug;

use crate::pointer::MouseButton;

/// The two recognised pinches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinchKind {
    /// Thumb tip on index tip ("okay" sign).
    Primary,
    /// Thumb tip on middle tip ("yoga" sign).
    Secondary,
}

impl PinchKind {
    pub fn button(self) -> MouseButton {
        match self {
            PinchKind::Primary => MouseButton::Left,
            PinchKind::Secondary => MouseButton::Right,
        }
    }

    fn slot(self) -> usize {
        match self {
            PinchKind::Primary => 0,
            PinchKind::Secondary => 1,
        }
    }

    fn can_drag(self) -> bool {
        matches!(self, PinchKind::Primary)
    }
}

/// Primary pinch wins when both fingertips are close to the thumb.
pub fn classify(primary: f32, secondary: f32, threshold: f32) -> Option<PinchKind> {
    if primary < threshold {
        Some(PinchKind::Primary)
    } else if secondary < threshold {
        Some(PinchKind::Secondary)
    } else {
        None
    }
}

/// Pointer-level outcome of a gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureEvent {
    Click(MouseButton),
    DoubleClick(MouseButton),
    DragStart,
    DragEnd,
}

impl GestureEvent {
    pub fn label(&self) -> &'static str {
        match self {
            GestureEvent::Click(MouseButton::Left) => "Left Click",
            GestureEvent::Click(MouseButton::Right) => "Right Click",
            GestureEvent::DoubleClick(MouseButton::Left) => "Double Left Click",
            GestureEvent::DoubleClick(MouseButton::Right) => "Double Right Click",
            GestureEvent::DragStart => "Drag",
            GestureEvent::DragEnd => "Drop",
        }
    }
}

/// Timing windows, all in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureTiming {
    /// A second tap of the same pinch inside this window is a double click.
    pub double_click_window: f64,
    /// Minimum gap between single clicks, shared by both pinches.
    pub cooldown: f64,
    /// A pinch held at least this long is a hold rather than a tap.
    pub hold: f64,
    /// A pinch must be missing for longer than this before it counts as released.
    pub release_grace: f64,
}

impl Default for GestureTiming {
    fn default() -> Self {
        Self {
            double_click_window: 0.5,
            cooldown: 0.7,
            hold: 0.6,
            release_grace: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct HeldPinch {
    kind: PinchKind,
    since: f64,
    last_seen: f64,
    dragging: bool,
}

/// Turns the per-frame pinch reading into click, double-click and drag events.
#[derive(Debug)]
pub struct GestureEngine {
    timing: GestureTiming,
    held: Option<HeldPinch>,
    last_tap: [Option<f64>; 2],
    last_click: Option<f64>,
}

impl GestureEngine {
    pub fn new(timing: GestureTiming) -> Self {
        Self {
            timing,
            held: None,
            last_tap: [None; 2],
            last_click: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.held.is_some_and(|held| held.dragging)
    }

    /// Feed the pinch seen in the current frame (if any).
    pub fn update(&mut self, pinch: Option<PinchKind>, now: f64) -> Vec<GestureEvent> {
        let mut events = Vec::new();

        match (self.held, pinch) {
            (None, None) => {}
            (None, Some(kind)) => self.latch(kind, now),
            (Some(mut held), Some(kind)) if held.kind == kind => {
                held.last_seen = now;
                if !held.dragging && kind.can_drag() && now - held.since >= self.timing.hold {
                    held.dragging = true;
                    events.push(GestureEvent::DragStart);
                }
                self.held = Some(held);
            }
            (Some(held), Some(kind)) => {
                events.extend(self.release(held, now));
                self.latch(kind, now);
            }
            (Some(held), None) => {
                if now - held.last_seen > self.timing.release_grace {
                    events.extend(self.release(held, now));
                    self.held = None;
                }
            }
        }

        events
    }

    /// Release whatever is held, for shutdown. Only a drag produces an event.
    pub fn finish(&mut self) -> Option<GestureEvent> {
        let held = self.held.take()?;
        held.dragging.then_some(GestureEvent::DragEnd)
    }

    fn latch(&mut self, kind: PinchKind, now: f64) {
        debug!(?kind, "pinch latched");
        self.held = Some(HeldPinch {
            kind,
            since: now,
            last_seen: now,
            dragging: false,
        });
    }

    fn release(&mut self, held: HeldPinch, now: f64) -> Option<GestureEvent> {
        if held.dragging {
            return Some(GestureEvent::DragEnd);
        }
        if held.last_seen - held.since >= self.timing.hold {
            debug!(kind = ?held.kind, "long pinch cancelled");
            return None;
        }
        self.tap(held.kind, now)
    }

    fn tap(&mut self, kind: PinchKind, now: f64) -> Option<GestureEvent> {
        let slot = kind.slot();

        if let Some(previous) = self.last_tap[slot] {
            if now - previous < self.timing.double_click_window {
                self.last_tap[slot] = None;
                self.last_click = Some(now);
                return Some(GestureEvent::DoubleClick(kind.button()));
            }
        }

        let cooled = self
            .last_click
            .map_or(true, |clicked| now - clicked > self.timing.cooldown);
        if cooled {
            self.last_tap[slot] = Some(now);
            self.last_click = Some(now);
            return Some(GestureEvent::Click(kind.button()));
        }

        debug!(?kind, "tap ignored during cooldown");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 0.03;

    fn engine() -> GestureEngine {
        GestureEngine::new(GestureTiming::default())
    }

    /// Hold `pinch` from `start` for `frames` frames, then report empty frames
    /// until it is released. Returns every event and the time after release.
    fn tap_at(engine: &mut GestureEngine, kind: PinchKind, start: f64) -> (Vec<GestureEvent>, f64) {
        let mut events = Vec::new();
        let mut now = start;
        for _ in 0..3 {
            events.extend(engine.update(Some(kind), now));
            now += FRAME;
        }
        for _ in 0..6 {
            events.extend(engine.update(None, now));
            now += FRAME;
        }
        (events, now)
    }

    #[test]
    fn classify_prefers_primary() {
        assert_eq!(classify(0.01, 0.01, 0.05), Some(PinchKind::Primary));
        assert_eq!(classify(0.2, 0.01, 0.05), Some(PinchKind::Secondary));
        assert_eq!(classify(0.05, 0.05, 0.05), None);
    }

    #[test]
    fn short_pinch_clicks_on_release() {
        let mut engine = engine();
        assert!(engine.update(Some(PinchKind::Primary), 1.0).is_empty());
        assert!(engine.update(Some(PinchKind::Primary), 1.03).is_empty());
        // Still inside the release grace.
        assert!(engine.update(None, 1.06).is_empty());
        assert_eq!(
            engine.update(None, 1.2),
            vec![GestureEvent::Click(MouseButton::Left)]
        );
    }

    #[test]
    fn second_tap_inside_window_double_clicks() {
        let mut engine = engine();
        let (first, _) = tap_at(&mut engine, PinchKind::Primary, 1.0);
        assert_eq!(first, vec![GestureEvent::Click(MouseButton::Left)]);

        let (second, _) = tap_at(&mut engine, PinchKind::Primary, 1.3);
        assert_eq!(second, vec![GestureEvent::DoubleClick(MouseButton::Left)]);
    }

    #[test]
    fn tap_inside_cooldown_is_ignored() {
        let timing = GestureTiming {
            double_click_window: 0.2,
            ..GestureTiming::default()
        };
        let mut engine = GestureEngine::new(timing);
        let (first, _) = tap_at(&mut engine, PinchKind::Primary, 1.0);
        assert_eq!(first.len(), 1);

        // Past the double-click window but inside the cooldown.
        let (second, _) = tap_at(&mut engine, PinchKind::Primary, 1.3);
        assert!(second.is_empty());

        let (third, _) = tap_at(&mut engine, PinchKind::Primary, 2.5);
        assert_eq!(third, vec![GestureEvent::Click(MouseButton::Left)]);
    }

    #[test]
    fn cooldown_is_shared_between_pinches() {
        let mut engine = engine();
        tap_at(&mut engine, PinchKind::Primary, 1.0);
        let (right, _) = tap_at(&mut engine, PinchKind::Secondary, 1.3);
        assert!(right.is_empty());

        let (right, _) = tap_at(&mut engine, PinchKind::Secondary, 3.0);
        assert_eq!(right, vec![GestureEvent::Click(MouseButton::Right)]);
        let (right, _) = tap_at(&mut engine, PinchKind::Secondary, 3.3);
        assert_eq!(right, vec![GestureEvent::DoubleClick(MouseButton::Right)]);
    }

    #[test]
    fn held_primary_drags_until_released() {
        let mut engine = engine();
        let mut events = Vec::new();
        let mut now = 0.0;
        while now < 1.0 {
            events.extend(engine.update(Some(PinchKind::Primary), now));
            now += FRAME;
        }
        assert_eq!(events, vec![GestureEvent::DragStart]);
        assert!(engine.is_dragging());

        // A single missed frame keeps the drag alive.
        assert!(engine.update(None, now).is_empty());
        assert!(engine.update(Some(PinchKind::Primary), now + FRAME).is_empty());
        assert!(engine.is_dragging());

        assert_eq!(engine.update(None, now + 0.5), vec![GestureEvent::DragEnd]);
        assert!(!engine.is_dragging());
    }

    #[test]
    fn long_secondary_pinch_is_cancelled() {
        let mut engine = engine();
        let mut now = 0.0;
        while now < 1.0 {
            assert!(engine.update(Some(PinchKind::Secondary), now).is_empty());
            now += FRAME;
        }
        assert!(engine.update(None, now + 0.5).is_empty());
    }

    #[test]
    fn switching_pinch_releases_the_previous_one() {
        let mut engine = engine();
        engine.update(Some(PinchKind::Primary), 1.0);
        let events = engine.update(Some(PinchKind::Secondary), 1.03);
        assert_eq!(events, vec![GestureEvent::Click(MouseButton::Left)]);
        // Secondary is latched now; it is inside the shared cooldown on release.
        assert!(engine.update(None, 1.5).is_empty());
    }

    #[test]
    fn finish_releases_an_active_drag() {
        let mut engine = engine();
        engine.update(Some(PinchKind::Primary), 0.0);
        engine.update(Some(PinchKind::Primary), 0.7);
        assert!(engine.is_dragging());
        assert_eq!(engine.finish(), Some(GestureEvent::DragEnd));
        assert_eq!(engine.finish(), None);

        engine.update(Some(PinchKind::Primary), 2.0);
        assert_eq!(engine.finish(), None);
    }

    #[test]
    fn labels() {
        assert_eq!(GestureEvent::Click(MouseButton::Left).label(), "Left Click");
        assert_eq!(
            GestureEvent::DoubleClick(MouseButton::Right).label(),
            "Double Right Click"
        );
    }
}
