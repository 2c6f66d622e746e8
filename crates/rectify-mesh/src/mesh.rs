use serde::{Deserialize, Serialize};

/// A 2D point, either in source raster space or in the target projection.
///
/// Serialized as a `[x, y]` array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2D {
    /// The x coordinate.
    pub x: f64,
    /// The y coordinate.
    pub y: f64,
}

impl Point2D {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

/// A mesh triangle pairing three source points with three target points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// Vertices in the source coordinate system.
    pub source: [Point2D; 3],
    /// Vertices in the target projection.
    pub target: [Point2D; 3],
}

impl Triangle {
    /// Create a triangle from source and target vertices.
    pub fn new(source: [[f64; 2]; 3], target: [[f64; 2]; 3]) -> Self {
        Self {
            source: source.map(Point2D::from),
            target: target.map(Point2D::from),
        }
    }
}

/// An ordered list of triangles.
///
/// Triangles are drawn in order; where clips of neighbouring triangles overlap the last
/// one drawn wins.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    /// The mesh triangles.
    #[serde(alias = "triangles_")]
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Create a mesh from its triangles.
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

/// Placement of the source raster: `[min_x, min_y, max_x, max_y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Extent {
    /// Minimum x.
    pub min_x: f64,
    /// Minimum y.
    pub min_y: f64,
    /// Maximum x.
    pub max_x: f64,
    /// Maximum y.
    pub max_y: f64,
}

impl From<[f64; 4]> for Extent {
    fn from([min_x, min_y, max_x, max_y]: [f64; 4]) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl From<Extent> for [f64; 4] {
    fn from(e: Extent) -> Self {
        [e.min_x, e.min_y, e.max_x, e.max_y]
    }
}
