//! Core value types for blocked TSDF meshing.
//!
//! Provides world-space points, block and voxel indices, vertex colors, and the
//! vertex id type shared by the triangulator and the mesh layer.

use core::hash::{Hash, Hasher};
use core::ops::{Add, Div, Mul, Neg, Sub};

/// Index of a vertex inside one block's vertex sequence.
pub type VertexId = u32;

/// Sentinel for "no vertex cached".
pub const NO_VERTEX: VertexId = VertexId::MAX;

/// A 3D point with named fields for clarity.
///
/// Provides arithmetic operations and conversions to/from arrays.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Point3 {
    /// Create a new Point3.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Create a Point3 with all components set to the same value.
    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    /// Convert to an array.
    #[inline]
    pub const fn as_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Component along `axis` (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn axis(&self, axis: usize) -> f32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Linear interpolation between two points.
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Dot product with another point (treating both as vectors).
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product with another point (treating both as vectors).
    #[inline]
    pub fn cross(self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Length (magnitude) of the vector.
    #[inline]
    pub fn length(self) -> f32 {
        libm::sqrtf(self.dot(self))
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self {
            x: if self.x < other.x { self.x } else { other.x },
            y: if self.y < other.y { self.y } else { other.y },
            z: if self.z < other.z { self.z } else { other.z },
        }
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self {
            x: if self.x > other.x { self.x } else { other.x },
            y: if self.y > other.y { self.y } else { other.y },
            z: if self.z > other.z { self.z } else { other.z },
        }
    }
}

impl From<[f32; 3]> for Point3 {
    #[inline]
    fn from(arr: [f32; 3]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
            z: arr[2],
        }
    }
}

impl From<Point3> for [f32; 3] {
    #[inline]
    fn from(p: Point3) -> Self {
        p.as_array()
    }
}

impl Add for Point3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Point3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Point3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl Div<f32> for Point3 {
    type Output = Self;

    #[inline]
    fn div(self, scalar: f32) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl Neg for Point3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// Index of a cubic block of voxels in the sparse grid (signed for negative regions).
///
/// Grids map block indices to blocks; keys are unique with no implied order.
/// The `Ord` impl (lexicographic x, y, z) exists only to give callers a
/// deterministic iteration order when they want one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct BlockIndex {
    /// X coordinate in block space.
    pub x: i32,
    /// Y coordinate in block space.
    pub y: i32,
    /// Z coordinate in block space.
    pub z: i32,
}

impl BlockIndex {
    /// Create a new BlockIndex.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Convert to an array.
    #[inline]
    pub const fn as_array(&self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[i32; 3]> for BlockIndex {
    #[inline]
    fn from(arr: [i32; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

impl Add for BlockIndex {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Hash for BlockIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
        self.z.hash(state);
    }
}

impl core::fmt::Display for BlockIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

/// Voxel index local to a block.
///
/// Valid indices lie in `[0, voxels_per_side)` on every axis. The type is
/// signed so that cube corners stepping past a block face can be expressed
/// before they are remapped into the neighboring block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoxelIndex {
    /// X coordinate within the block.
    pub x: i32,
    /// Y coordinate within the block.
    pub y: i32,
    /// Z coordinate within the block.
    pub z: i32,
}

impl VoxelIndex {
    /// Create a new VoxelIndex.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Convert to an array.
    #[inline]
    pub const fn as_array(&self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    /// Whether every component lies in `[0, voxels_per_side)`.
    #[inline]
    pub const fn is_within(&self, voxels_per_side: u32) -> bool {
        let vps = voxels_per_side as i32;
        self.x >= 0 && self.x < vps && self.y >= 0 && self.y < vps && self.z >= 0 && self.z < vps
    }

    /// Row-major linear index: `x + y * vps + z * vps * vps`.
    ///
    /// Only meaningful when [`is_within`](Self::is_within) holds.
    #[inline]
    pub const fn linear_index(&self, voxels_per_side: u32) -> usize {
        let vps = voxels_per_side as usize;
        self.x as usize + self.y as usize * vps + self.z as usize * vps * vps
    }

    /// Inverse of [`linear_index`](Self::linear_index).
    #[inline]
    pub const fn from_linear_index(index: usize, voxels_per_side: u32) -> Self {
        let vps = voxels_per_side as usize;
        Self {
            x: (index % vps) as i32,
            y: ((index / vps) % vps) as i32,
            z: (index / (vps * vps)) as i32,
        }
    }
}

impl Add for VoxelIndex {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl From<[i32; 3]> for VoxelIndex {
    #[inline]
    fn from(arr: [i32; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

/// RGBA vertex color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Create a new color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}
