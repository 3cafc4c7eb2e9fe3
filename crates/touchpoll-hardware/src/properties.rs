//! Touchscreen orientation policy.
//!
//! Raw controller coordinates are first clamped to the configured range, then
//! mirrored on each inverted axis, then swapped if the panel is rotated.

use crate::config::TouchscreenConfig;
use crate::traits::CoordinateTransform;
use serde::{Deserialize, Serialize};

/// Resolved orientation and range of a touchscreen.
///
/// # Examples
///
/// ```
/// use touchpoll_hardware::properties::TouchscreenProperties;
/// use touchpoll_hardware::traits::CoordinateTransform;
///
/// let props = TouchscreenProperties::new(800, 480).with_inverted_x(true);
/// assert_eq!(props.transform(300, 150), (500, 150));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchscreenProperties {
    /// Largest X value reported by the controller.
    pub max_x: u16,

    /// Largest Y value reported by the controller.
    pub max_y: u16,

    pub invert_x: bool,
    pub invert_y: bool,
    pub swap_x_y: bool,
}

impl TouchscreenProperties {
    /// Create properties with the given ranges and no inversion or swap.
    pub fn new(max_x: u16, max_y: u16) -> Self {
        Self {
            max_x,
            max_y,
            invert_x: false,
            invert_y: false,
            swap_x_y: false,
        }
    }

    /// Resolve the configured overrides against the default size.
    ///
    /// A configured panel size `n` gives a maximum of `n - 1`; otherwise the
    /// default width and height are used as maxima directly.
    pub fn from_config(config: &TouchscreenConfig) -> Self {
        let overrides = &config.properties;
        Self {
            max_x: overrides
                .size_x
                .map_or(config.default_width, |size| size.saturating_sub(1)),
            max_y: overrides
                .size_y
                .map_or(config.default_height, |size| size.saturating_sub(1)),
            invert_x: overrides.inverted_x,
            invert_y: overrides.inverted_y,
            swap_x_y: overrides.swapped_x_y,
        }
    }

    pub fn with_inverted_x(mut self, invert: bool) -> Self {
        self.invert_x = invert;
        self
    }

    pub fn with_inverted_y(mut self, invert: bool) -> Self {
        self.invert_y = invert;
        self
    }

    pub fn with_swapped_x_y(mut self, swap: bool) -> Self {
        self.swap_x_y = swap;
        self
    }

    /// Maxima of the reported X and Y axes, after any swap.
    pub fn reported_max(&self) -> (u16, u16) {
        if self.swap_x_y {
            (self.max_y, self.max_x)
        } else {
            (self.max_x, self.max_y)
        }
    }
}

impl Default for TouchscreenProperties {
    fn default() -> Self {
        Self::from_config(&TouchscreenConfig::default())
    }
}

impl CoordinateTransform for TouchscreenProperties {
    fn transform(&self, x: u16, y: u16) -> (u16, u16) {
        let mut x = x.min(self.max_x);
        let mut y = y.min(self.max_y);

        if self.invert_x {
            x = self.max_x - x;
        }
        if self.invert_y {
            y = self.max_y - y;
        }
        if self.swap_x_y {
            std::mem::swap(&mut x, &mut y);
        }

        (x, y)
    }
}
