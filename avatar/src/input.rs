//! Per-frame keyboard snapshot consumed by the controller.

use serde::{Deserialize, Serialize};

/// Keys currently held down. Pure level state, no edge history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub space: bool,
    pub shift: bool,
}

impl InputSnapshot {
    /// No keys held.
    pub const IDLE: Self = Self {
        forward: false,
        backward: false,
        left: false,
        right: false,
        space: false,
        shift: false,
    };

    /// Either movement key along the forward axis is held.
    #[must_use]
    pub const fn moving(&self) -> bool {
        self.forward || self.backward
    }

    #[must_use]
    pub const fn with_forward(mut self, held: bool) -> Self {
        self.forward = held;
        self
    }

    #[must_use]
    pub const fn with_backward(mut self, held: bool) -> Self {
        self.backward = held;
        self
    }

    #[must_use]
    pub const fn with_left(mut self, held: bool) -> Self {
        self.left = held;
        self
    }

    #[must_use]
    pub const fn with_right(mut self, held: bool) -> Self {
        self.right = held;
        self
    }

    #[must_use]
    pub const fn with_space(mut self, held: bool) -> Self {
        self.space = held;
        self
    }

    #[must_use]
    pub const fn with_shift(mut self, held: bool) -> Self {
        self.shift = held;
        self
    }
}
