//! Viewport and coordinate transformation for the circuit canvas.
//!
//! Converts between screen pixels and world coordinates. Both spaces have y
//! growing downward, so the mapping is a plain scale and offset:
//!
//! ```text
//! world = (screen - pan) / zoom
//! screen = world * zoom + pan
//! ```

use std::fmt;

use circuitlab_core::Point;
use circuitlab_settings::ViewSettings;

use crate::geometry::Bounds;

/// Zoom and pan state of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    canvas_width: f64,
    canvas_height: f64,
    min_zoom: f64,
    max_zoom: f64,
}

impl Viewport {
    /// Creates a viewport at 100% zoom with the world origin at the top-left
    /// corner of the canvas.
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        let defaults = ViewSettings::default();
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            canvas_width,
            canvas_height,
            min_zoom: defaults.min_zoom,
            max_zoom: defaults.max_zoom,
        }
    }

    /// Creates a viewport sized and limited by the view settings.
    pub fn from_settings(settings: &ViewSettings) -> Self {
        Self {
            min_zoom: settings.min_zoom,
            max_zoom: settings.max_zoom,
            ..Self::new(settings.canvas_width, settings.canvas_height)
        }
    }

    pub fn canvas_width(&self) -> f64 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    /// Sets the canvas dimensions (typically called when the host resizes).
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_width = width;
        self.canvas_height = height;
    }

    /// Gets the current zoom level (1.0 = 100%).
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets the zoom level, clamped to the configured limits.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
    }

    pub fn zoom_limits(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    /// Pan offset in screen pixels.
    pub fn pan(&self) -> (f64, f64) {
        (self.pan_x, self.pan_y)
    }

    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan_x = x;
        self.pan_y = y;
    }

    /// Pans by a delta in screen pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan_x) / self.zoom,
            (screen.y - self.pan_y) / self.zoom,
        )
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.zoom + self.pan_x,
            world.y * self.zoom + self.pan_y,
        )
    }

    /// Zooms while keeping the world point under `screen` fixed on screen.
    pub fn zoom_at(&mut self, screen: Point, new_zoom: f64) {
        let anchor = self.screen_to_world(screen);
        self.set_zoom(new_zoom);
        self.pan_x = screen.x - anchor.x * self.zoom;
        self.pan_y = screen.y - anchor.y * self.zoom;
    }

    /// Applies a mouse-wheel step at `screen`. Scrolling up (negative
    /// `delta_y`) zooms in.
    pub fn apply_wheel(&mut self, delta_y: f64, screen: Point, factor: f64) {
        self.zoom_at(screen, self.zoom - delta_y * factor);
    }

    /// Centers the viewport on a world coordinate.
    pub fn center_on(&mut self, world: Point) {
        self.pan_x = self.canvas_width / 2.0 - world.x * self.zoom;
        self.pan_y = self.canvas_height / 2.0 - world.y * self.zoom;
    }

    /// Fits `bounds` into the canvas, leaving `padding` (fraction of the
    /// canvas, 0.0 - 0.5) free on every side.
    pub fn fit_to_bounds(&mut self, bounds: &Bounds, padding: f64) {
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return;
        }
        let usable = 1.0 - padding.clamp(0.0, 0.45) * 2.0;
        let zoom_x = self.canvas_width * usable / bounds.width();
        let zoom_y = self.canvas_height * usable / bounds.height();
        self.set_zoom(zoom_x.min(zoom_y));
        self.center_on(Point::new(
            (bounds.min_x + bounds.max_x) / 2.0,
            (bounds.min_y + bounds.max_y) / 2.0,
        ));
    }

    /// Resets to 100% zoom with no pan.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.2}x | Pan: ({:.1}, {:.1})",
            self.zoom, self.pan_x, self.pan_y
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_settings(&ViewSettings::default())
    }
}
