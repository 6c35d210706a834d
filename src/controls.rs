use bevy::math::Vec2;

/// The three gameplay buttons that the echo recorder captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons {
    pub scan: bool,
    pub interact: bool,
    pub confirm: bool,
}

impl Buttons {
    pub const NONE: Buttons = Buttons {
        scan: false,
        interact: false,
        confirm: false,
    };

    /// Buttons down now but not in `previous`
    pub fn rising_from(self, previous: Buttons) -> Buttons {
        Buttons {
            scan: self.scan && !previous.scan,
            interact: self.interact && !previous.interact,
            confirm: self.confirm && !previous.confirm,
        }
    }

    /// Buttons down in `previous` but not now
    pub fn falling_from(self, previous: Buttons) -> Buttons {
        previous.rising_from(self)
    }

    pub fn any(self) -> bool {
        self.scan || self.interact || self.confirm
    }
}

/// One frame of player intent, independent of the input device
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Controls {
    pub held: Buttons,
    pub pressed: Buttons,
    pub released: Buttons,
    pub echo_pressed: bool,
    /// Pointer motion this frame, +y is up
    pub pointer_delta: Vec2,
    /// Movement stick, +y is forward
    pub movement: Vec2,
}

impl Controls {
    /// Derive edges from this frame's and last frame's held state
    pub fn from_held(held: Buttons, previous: Buttons) -> Self {
        Controls {
            held,
            pressed: held.rising_from(previous),
            released: held.falling_from(previous),
            ..Default::default()
        }
    }

    pub fn with_pointer(mut self, delta: Vec2) -> Self {
        self.pointer_delta = delta;
        self
    }

    pub fn with_echo(mut self) -> Self {
        self.echo_pressed = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_from_held_state() {
        let previous = Buttons {
            scan: true,
            interact: false,
            confirm: true,
        };
        let held = Buttons {
            scan: true,
            interact: true,
            confirm: false,
        };
        let controls = Controls::from_held(held, previous);

        assert_eq!(
            controls.pressed,
            Buttons {
                interact: true,
                ..Buttons::NONE
            }
        );
        assert_eq!(
            controls.released,
            Buttons {
                confirm: true,
                ..Buttons::NONE
            }
        );
        assert!(!Buttons::NONE.any());
    }
}
