//! Coordinate space markers.
//!
//! Uninhabited types used only as type parameters, so a pixel box can never
//! be written out where a normalized one is expected.

/// Absolute pixel coordinates, origin at the top-left corner of the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Coordinates divided by the image width/height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Normalized {}
