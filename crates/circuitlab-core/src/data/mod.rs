//! Data models for CircuitLab.
//!
//! Provides the value types exchanged between the editor, the history stack,
//! the simulation bridge, and the project serializer:
//! - Geometry primitives (`Point`, `Size`, `Rotation`)
//! - Typed identifiers for components, terminals, and wires
//! - The circuit graph values (`ComponentInstance`, `Wire`, `CircuitSnapshot`)
//! - Simulation readings and diagnostic messages
//!
//! Every type here is a plain value: cloning one produces a fully independent
//! copy, which is what the history stack and the simulation bridge rely on.

mod circuit;
mod feedback;

pub use circuit::{
    CircuitSnapshot, ComponentInstance, ComponentKind, Polarity, Terminal, TerminalRef, Wire,
};
pub use feedback::{DiagnosticMessage, Severity, SimulationReading};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A 2D point in world or screen coordinates (y grows downward in both).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The origin.
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Width and height of a component body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Quarter-turn rotation of a placed component.
///
/// Serialized as the number of degrees (`0`, `90`, `180`, `270`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Rotation in degrees.
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Returns the rotation turned by one quarter step in `direction`
    /// (positive is clockwise on screen).
    pub fn turned(self, direction: i32) -> Rotation {
        let step = if direction >= 0 { 90 } else { -90 };
        Rotation::from_degrees(self.degrees() + step).unwrap_or(self)
    }

    /// Builds a rotation from any multiple of 90 degrees, wrapping modulo 360.
    pub fn from_degrees(degrees: i32) -> Option<Rotation> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// Rotates an offset about the origin. With y pointing down, a positive
    /// quarter turn is clockwise on screen.
    pub fn apply(self, offset: Point) -> Point {
        match self {
            Rotation::Deg0 => offset,
            Rotation::Deg90 => Point::new(-offset.y, offset.x),
            Rotation::Deg180 => Point::new(-offset.x, -offset.y),
            Rotation::Deg270 => Point::new(offset.y, -offset.x),
        }
    }

    /// True for the two rotations that swap a body's width and height.
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl TryFrom<i32> for Rotation {
    type Error = String;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees)
            .ok_or_else(|| format!("rotation must be a multiple of 90 degrees, got {}", degrees))
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> i32 {
        rotation.degrees()
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Unique identifier of a placed component.
    ComponentId
);
string_id!(
    /// Identifier of a terminal, unique within the whole graph.
    TerminalId
);
string_id!(
    /// Unique identifier of a wire.
    WireId
);

impl ComponentId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl WireId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl TerminalId {
    /// Derives a per-instance terminal id from a catalog template id, e.g.
    /// `anode` becomes `anode-3f9c21ab`.
    pub fn instance_of(template_id: &str) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", template_id, &suffix[..8]))
    }
}
