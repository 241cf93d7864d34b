//! OS pointer injection.

use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use thiserror::Error;

use crate::gesture::GestureEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

impl From<MouseButton> for Button {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => Button::Left,
            MouseButton::Right => Button::Right,
        }
    }
}

#[derive(Debug, Error)]
pub enum PointerError {
    #[error("failed to connect to the input backend: {0}")]
    Connect(#[from] enigo::NewConError),
    #[error("pointer input rejected: {0}")]
    Input(#[from] enigo::InputError),
}

/// Anything that can move and click the system pointer.
pub trait PointerDriver {
    /// Main display size in pixels.
    fn screen_size(&self) -> Result<(i32, i32), PointerError>;
    fn move_to(&mut self, x: i32, y: i32) -> Result<(), PointerError>;
    fn click(&mut self, button: MouseButton, count: u32) -> Result<(), PointerError>;
    fn press(&mut self, button: MouseButton) -> Result<(), PointerError>;
    fn release(&mut self, button: MouseButton) -> Result<(), PointerError>;
}

/// Translate a gesture into pointer calls.
pub fn apply(driver: &mut dyn PointerDriver, event: GestureEvent) -> Result<(), PointerError> {
    match event {
        GestureEvent::Click(button) => driver.click(button, 1),
        GestureEvent::DoubleClick(button) => driver.click(button, 2),
        GestureEvent::DragStart => driver.press(MouseButton::Left),
        GestureEvent::DragEnd => driver.release(MouseButton::Left),
    }
}

/// [`PointerDriver`] backed by `enigo`.
pub struct EnigoPointer {
    enigo: Enigo,
}

impl EnigoPointer {
    pub fn new() -> Result<Self, PointerError> {
        let enigo = Enigo::new(&Settings::default())?;
        Ok(Self { enigo })
    }
}

impl PointerDriver for EnigoPointer {
    fn screen_size(&self) -> Result<(i32, i32), PointerError> {
        Ok(self.enigo.main_display()?)
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<(), PointerError> {
        self.enigo.move_mouse(x, y, Coordinate::Abs)?;
        Ok(())
    }

    fn click(&mut self, button: MouseButton, count: u32) -> Result<(), PointerError> {
        for _ in 0..count {
            self.enigo.button(button.into(), Direction::Click)?;
        }
        Ok(())
    }

    fn press(&mut self, button: MouseButton) -> Result<(), PointerError> {
        self.enigo.button(button.into(), Direction::Press)?;
        Ok(())
    }

    fn release(&mut self, button: MouseButton) -> Result<(), PointerError> {
        self.enigo.button(button.into(), Direction::Release)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub(crate) enum Call {
        Move(i32, i32),
        Click(MouseButton, u32),
        Press(MouseButton),
        Release(MouseButton),
    }

    /// Records every call instead of touching the OS.
    pub(crate) struct RecordingPointer {
        pub screen: (i32, i32),
        pub calls: Vec<Call>,
    }

    impl RecordingPointer {
        pub(crate) fn new(width: i32, height: i32) -> Self {
            Self {
                screen: (width, height),
                calls: Vec::new(),
            }
        }
    }

    impl PointerDriver for RecordingPointer {
        fn screen_size(&self) -> Result<(i32, i32), PointerError> {
            Ok(self.screen)
        }

        fn move_to(&mut self, x: i32, y: i32) -> Result<(), PointerError> {
            self.calls.push(Call::Move(x, y));
            Ok(())
        }

        fn click(&mut self, button: MouseButton, count: u32) -> Result<(), PointerError> {
            self.calls.push(Call::Click(button, count));
            Ok(())
        }

        fn press(&mut self, button: MouseButton) -> Result<(), PointerError> {
            self.calls.push(Call::Press(button));
            Ok(())
        }

        fn release(&mut self, button: MouseButton) -> Result<(), PointerError> {
            self.calls.push(Call::Release(button));
            Ok(())
        }
    }
}
