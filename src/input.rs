//! Per-tick input sample
//!
//! The device is polled once per tick; the core only ever reads the sample.

use bitflags::bitflags;

bitflags! {
    /// Digital pad directions, one bit per direction
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PadButtons: u32 {
        const DOWN = 0x0001;
        const LEFT = 0x0002;
        const RIGHT = 0x0004;
        const UP = 0x0008;
    }
}

/// One polled input sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    /// Pressed digital directions
    pub buttons: PadButtons,
    /// Analog stick X (-1000..=1000, right is positive)
    pub stick_x: i32,
    /// Analog stick Y (-1000..=1000, down is positive)
    pub stick_y: i32,
}

impl InputState {
    /// Sample with only digital buttons held
    pub fn pad(buttons: PadButtons) -> Self {
        Self {
            buttons,
            ..Default::default()
        }
    }

    /// Sample with only the analog stick deflected
    pub fn stick(stick_x: i32, stick_y: i32) -> Self {
        Self {
            buttons: PadButtons::empty(),
            stick_x,
            stick_y,
        }
    }

    pub fn right(&self) -> bool {
        self.stick_x > 0 || self.buttons.contains(PadButtons::RIGHT)
    }

    pub fn left(&self) -> bool {
        self.stick_x < 0 || self.buttons.contains(PadButtons::LEFT)
    }

    pub fn down(&self) -> bool {
        self.stick_y > 0 || self.buttons.contains(PadButtons::DOWN)
    }

    pub fn up(&self) -> bool {
        self.stick_y < 0 || self.buttons.contains(PadButtons::UP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stick_and_pad_merge_per_axis() {
        let input = InputState {
            buttons: PadButtons::UP,
            stick_x: 300,
            stick_y: 0,
        };
        assert!(input.right());
        assert!(input.up());
        assert!(!input.left());
        assert!(!input.down());
    }

    #[test]
    fn test_stick_y_is_screen_down() {
        assert!(InputState::stick(0, 500).down());
        assert!(InputState::stick(0, -500).up());
    }
}
