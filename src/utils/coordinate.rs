use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate2D {
    pub x: f32,
    pub y: f32,
}

impl Coordinate2D {
    pub fn new(x: f32, y: f32) -> Self {
        Coordinate2D { x, y }
    }

    pub fn to_vector(self) -> Vector2<f32> {
        Vector2::new(self.x, self.y)
    }

    /// midpoint returns the pairwise average of two points.
    pub fn midpoint(a: Coordinate2D, b: Coordinate2D) -> Coordinate2D {
        Coordinate2D {
            x: (a.x + b.x) / 2.0,
            y: (a.y + b.y) / 2.0,
        }
    }
}

/// The seven body landmarks the posture metrics are derived from, each in
/// normalized [0,1] image coordinates. Produced once per request by the pose
/// detector and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostureLandmarks {
    pub left_shoulder: Coordinate2D,
    pub right_shoulder: Coordinate2D,
    pub left_ear: Coordinate2D,
    pub right_ear: Coordinate2D,
    pub left_hip: Coordinate2D,
    pub right_hip: Coordinate2D,
    pub nose: Coordinate2D,
}

impl PostureLandmarks {
    pub fn mid_shoulder(&self) -> Coordinate2D {
        Coordinate2D::midpoint(self.left_shoulder, self.right_shoulder)
    }

    pub fn mid_ear(&self) -> Coordinate2D {
        Coordinate2D::midpoint(self.left_ear, self.right_ear)
    }

    pub fn mid_hip(&self) -> Coordinate2D {
        Coordinate2D::midpoint(self.left_hip, self.right_hip)
    }
}
