//! Input intents consumed by the tick engine
//!
//! Raw keyboard, pointer and touch state is folded into a `TickInput`.
//! The host keeps one latest `TickInput`; each tick reads whatever is current.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{JOYSTICK_RADIUS, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Keyboard direction, each axis in {-1, 0, 1}
    pub keys: Vec2,
    /// Analog stick vector, magnitude <= 1
    pub analog: Vec2,
    pub sprint: bool,
    /// Aim angle in radians (world space, y down)
    pub aim: f32,
    /// Chop trees (held)
    pub attack: bool,
    /// Fire one bullet (one-shot)
    pub shoot: bool,
    /// Place a campfire (one-shot)
    pub campfire: bool,
    /// Toggle pause (one-shot, handled by the state machine)
    pub pause: bool,
    /// Toggle minimap (one-shot, handled by the state machine)
    pub toggle_map: bool,
}

impl TickInput {
    pub fn is_moving(&self) -> bool {
        self.keys != Vec2::ZERO || self.analog != Vec2::ZERO
    }

    /// Clear one-shot triggers after they have been consumed
    pub fn clear_triggers(&mut self) {
        self.shoot = false;
        self.campfire = false;
        self.pause = false;
        self.toggle_map = false;
    }
}

/// Held keyboard keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
    pub attack: bool,
}

impl KeyState {
    /// Update from a DOM `KeyboardEvent.key` value. Returns false for keys
    /// that are not movement/action keys.
    pub fn set_key(&mut self, key: &str, pressed: bool) -> bool {
        match key.to_lowercase().as_str() {
            "w" | "arrowup" => self.up = pressed,
            "s" | "arrowdown" => self.down = pressed,
            "a" | "arrowleft" => self.left = pressed,
            "d" | "arrowright" => self.right = pressed,
            "shift" => self.sprint = pressed,
            " " => self.attack = pressed,
            _ => return false,
        }
        true
    }

    /// Direction from held keys; opposite keys cancel
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| f32::from(u8::from(pos)) - f32::from(u8::from(neg));
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Touch joystick: vector from the touch start to the current touch point,
/// scaled so a drag of `JOYSTICK_RADIUS` or more is full deflection.
pub fn analog_from_drag(start: Vec2, current: Vec2) -> Vec2 {
    let drag = current - start;
    let length = drag.length().max(1.0);
    let deflection = (length / JOYSTICK_RADIUS).min(1.0);
    drag / length * deflection
}

/// Map a client-space pointer into the virtual viewport
pub fn to_viewport(client: Vec2, rect_origin: Vec2, rect_size: Vec2) -> Vec2 {
    if rect_size.x <= 0.0 || rect_size.y <= 0.0 {
        return Vec2::new(VIEWPORT_WIDTH / 2.0, VIEWPORT_HEIGHT / 2.0);
    }
    (client - rect_origin) / rect_size * Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
}

/// Aim angle from a viewport pointer position relative to `origin`
/// (the viewport centre in the browser shell)
pub fn aim_from_pointer(pointer: Vec2, origin: Vec2) -> f32 {
    let d = pointer - origin;
    d.y.atan2(d.x)
}
