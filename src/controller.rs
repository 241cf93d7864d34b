//! The capture → detect → gesture → pointer → display loop.

use std::{
    sync::{
        Arc, Once,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use anyhow::{Context, Result};
use tracing::{debug, info, trace, warn};

use crate::capture::{FrameSource, Webcam};
use crate::config::ControllerConfig;
use crate::detector::{self, HandDetector};
use crate::gesture::{self, GestureEngine, GestureEvent};
use crate::landmarks::{DetectedHand, Handedness, select_hand};
use crate::mapping::ScreenMapper;
use crate::overlay::{Annotations, Overlay};
use crate::pointer::{self, EnigoPointer, PointerDriver, PointerError};

/// How long a gesture label stays on the preview, in seconds.
const LABEL_SECONDS: f64 = 1.0;

/// Outcome of a single frame.
#[derive(Debug, Default)]
pub struct FrameReport<'a> {
    pub hand: Option<&'a DetectedHand>,
    /// Anchor landmark in frame pixels.
    pub anchor: Option<(i32, i32)>,
    /// Where the pointer was moved to, in screen pixels.
    pub cursor: Option<(i32, i32)>,
    pub events: Vec<GestureEvent>,
    pub dragging: bool,
}

/// Per-frame decisions, kept apart from the devices so they can be exercised
/// against any [`PointerDriver`].
pub struct FrameProcessor {
    preferred_hand: Handedness,
    pinch_threshold: f32,
    gestures: GestureEngine,
    mapper: ScreenMapper,
    screen: (i32, i32),
}

impl FrameProcessor {
    pub fn new(config: &ControllerConfig, screen: (i32, i32)) -> Self {
        Self {
            preferred_hand: config.preferred_hand,
            pinch_threshold: config.pinch_threshold,
            gestures: GestureEngine::new(config.timing),
            mapper: ScreenMapper::new(config.margin, config.smoothing),
            screen,
        }
    }

    pub fn process<'a>(
        &mut self,
        hands: &'a [DetectedHand],
        frame: (u32, u32),
        now: f64,
        pointer: &mut dyn PointerDriver,
    ) -> Result<FrameReport<'a>, PointerError> {
        let mut report = FrameReport::default();

        let pinch = match select_hand(hands, self.preferred_hand) {
            Some(hand) => {
                let (primary, secondary) = hand.pinch_distances();
                trace!(score = hand.score, primary, secondary, "pinch distances");

                let anchor = hand.anchor().to_pixel(frame.0, frame.1);
                let cursor = self.mapper.map(anchor, frame, self.screen);
                pointer.move_to(cursor.0, cursor.1)?;

                report.hand = Some(hand);
                report.anchor = Some(anchor);
                report.cursor = Some(cursor);
                gesture::classify(primary, secondary, self.pinch_threshold)
            }
            None => {
                self.mapper.reset();
                None
            }
        };

        for event in self.gestures.update(pinch, now) {
            info!(gesture = event.label(), "gesture");
            pointer::apply(pointer, event)?;
            report.events.push(event);
        }
        report.dragging = self.gestures.is_dragging();

        Ok(report)
    }

    /// Release a drag that is still in progress.
    pub fn finish(&mut self, pointer: &mut dyn PointerDriver) -> Result<(), PointerError> {
        if let Some(event) = self.gestures.finish() {
            info!(gesture = event.label(), "releasing on shutdown");
            pointer::apply(pointer, event)?;
        }
        Ok(())
    }
}

pub struct HandGestureController<P: PointerDriver = EnigoPointer> {
    camera: Box<dyn FrameSource>,
    hand_landmarker: Box<dyn HandDetector>,
    pointer: P,
    processor: FrameProcessor,
    overlay: Option<Overlay>,
    shutdown: Arc<AtomicBool>,
    clock: Instant,
    last_gesture: Option<(&'static str, f64)>,
    failed_reads: u64,
}

impl HandGestureController<EnigoPointer> {
    pub fn new(config: &ControllerConfig) -> Result<Self> {
        let pointer = EnigoPointer::new().context("failed to initialise pointer control")?;
        let screen = pointer
            .screen_size()
            .context("failed to query the main display size")?;
        info!(width = screen.0, height = screen.1, "screen");

        let hand_landmarker = detector::build(&config.detector)?;
        let camera = Webcam::open(config.camera_index, config.resolution)?;
        let overlay = if config.display {
            Some(Overlay::new(config.display_scale)?)
        } else {
            None
        };

        let controller = Self::from_parts(
            Box::new(camera),
            hand_landmarker,
            pointer,
            FrameProcessor::new(config, screen),
            overlay,
        );
        install_interrupt_handler(controller.shutdown.clone());
        Ok(controller)
    }
}

impl<P: PointerDriver> HandGestureController<P> {
    pub fn from_parts(
        camera: Box<dyn FrameSource>,
        hand_landmarker: Box<dyn HandDetector>,
        pointer: P,
        processor: FrameProcessor,
        overlay: Option<Overlay>,
    ) -> Self {
        Self {
            camera,
            hand_landmarker,
            pointer,
            processor,
            overlay,
            shutdown: Arc::new(AtomicBool::new(false)),
            clock: Instant::now(),
            last_gesture: None,
            failed_reads: 0,
        }
    }

    /// Run one iteration. Returns `false` when the user asked to quit.
    pub fn process_frame(&mut self) -> Result<bool> {
        let frame = match self.camera.frame() {
            Ok(frame) => {
                if self.failed_reads > 0 {
                    debug!(failed = self.failed_reads, "camera recovered");
                    self.failed_reads = 0;
                }
                frame
            }
            Err(err) => {
                if self.failed_reads == 0 {
                    warn!("camera read failed: {err}");
                } else {
                    trace!("camera read failed: {err}");
                }
                self.failed_reads += 1;
                return Ok(true);
            }
        };

        let now = self.clock.elapsed().as_secs_f64();
        let hands = self
            .hand_landmarker
            .detect(&frame)
            .context("hand landmark detection failed")?;
        let report = self
            .processor
            .process(&hands, frame.dimensions(), now, &mut self.pointer)
            .context("failed to drive the pointer")?;

        if let Some(event) = report.events.last() {
            self.last_gesture = Some((event.label(), now));
        }

        let Some(overlay) = self.overlay.as_mut() else {
            return Ok(true);
        };
        let label = if report.dragging {
            Some(GestureEvent::DragStart.label())
        } else {
            self.last_gesture
                .filter(|(_, at)| now - at < LABEL_SECONDS)
                .map(|(label, _)| label)
        };
        let annotations = Annotations {
            hand: report.hand,
            anchor: report.anchor,
            label,
        };
        Ok(overlay.show(&frame, &annotations)?)
    }

    /// Loop until `q`, Ctrl+C or a fatal error, then release any drag in progress.
    pub fn run(&mut self) -> Result<()> {
        info!("tracking started");
        let outcome = self.run_loop();
        self.processor
            .finish(&mut self.pointer)
            .context("failed to release the pointer")?;
        info!("tracking stopped");
        outcome
    }

    fn run_loop(&mut self) -> Result<()> {
        while !self.shutdown.load(Ordering::SeqCst) && self.process_frame()? {}
        Ok(())
    }
}

fn install_interrupt_handler(shutdown: Arc<AtomicBool>) {
    static CTRL_HANDLER: Once = Once::new();
    CTRL_HANDLER.call_once(move || {
        if let Err(err) = ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::SeqCst);
        }) {
            warn!("failed to install Ctrl+C handler: {err}");
        }
    });
}
