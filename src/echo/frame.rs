use crate::controls::Buttons;
use bevy::math::{Quat, Vec3};

/// One sample of the player's pose and buttons
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedFrame {
    pub position: Vec3,
    pub rotation: Quat,
    pub held: Buttons,
    /// Rising edges since the previous sample
    pub pressed: Buttons,
    /// Falling edges since the previous sample
    pub released: Buttons,
}

impl RecordedFrame {
    pub fn at(position: Vec3, rotation: Quat) -> Self {
        RecordedFrame {
            position,
            rotation,
            held: Buttons::NONE,
            pressed: Buttons::NONE,
            released: Buttons::NONE,
        }
    }

    pub fn with_pressed(mut self, pressed: Buttons) -> Self {
        self.pressed = pressed;
        self.held = Buttons {
            scan: self.held.scan || pressed.scan,
            interact: self.held.interact || pressed.interact,
            confirm: self.held.confirm || pressed.confirm,
        };
        self
    }
}

/// Buttons accumulated between two samples, so a tap shorter than the
/// sampling interval still lands in the next frame
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct EdgeAccumulator {
    pressed: Buttons,
    released: Buttons,
}

impl EdgeAccumulator {
    pub fn add(&mut self, pressed: Buttons, released: Buttons) {
        self.pressed = or(self.pressed, pressed);
        self.released = or(self.released, released);
    }

    /// Drain into a frame, together with edges derived from the held states
    pub fn take(&mut self, held: Buttons, previous: Buttons) -> (Buttons, Buttons) {
        let pressed = or(self.pressed, held.rising_from(previous));
        let released = or(self.released, held.falling_from(previous));
        *self = EdgeAccumulator::default();
        (pressed, released)
    }
}

fn or(a: Buttons, b: Buttons) -> Buttons {
    Buttons {
        scan: a.scan || b.scan,
        interact: a.interact || b.interact,
        confirm: a.confirm || b.confirm,
    }
}
