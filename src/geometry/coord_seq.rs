//! Fixed-size coordinate storage
//!
//! A `CoordinateSequence` holds `size` coordinates of 2 or 3 ordinates each.
//! Both the size and the dimension are fixed when the sequence is created;
//! only the ordinate values can change afterwards.

use serde::Serialize;

use crate::error::{GeometryError, Result};

/// A single coordinate; `z` is `None` for 2D data
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Coord {
    pub fn xy(x: f64, y: f64) -> Self {
        Coord { x, y, z: None }
    }

    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Coord { x, y, z: Some(z) }
    }
}

/// Ordered, fixed-size store of 2D or 3D coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateSequence {
    dimension: usize,
    /// Flat ordinate storage (x, y[, z], x, y[, z], ...)
    ordinates: Vec<f64>,
}

const X: usize = 0;
const Y: usize = 1;
const Z: usize = 2;

impl CoordinateSequence {
    /// Create a sequence of `size` coordinates with `dimension` ordinates each,
    /// all initialised to `0.0`
    ///
    /// # Arguments
    /// * `size` - Number of coordinates
    /// * `dimension` - Ordinates per coordinate, 2 or 3
    pub fn new(size: usize, dimension: usize) -> Result<Self> {
        check_dimension(dimension)?;
        let too_large = || {
            GeometryError::InvalidGeometry(format!(
                "sequence of {} coordinates with dimension {} is too large",
                size, dimension
            ))
        };
        let len = size.checked_mul(dimension).ok_or_else(too_large)?;
        let mut ordinates = Vec::new();
        ordinates.try_reserve_exact(len).map_err(|_| too_large())?;
        ordinates.resize(len, 0.0);
        Ok(Self {
            dimension,
            ordinates,
        })
    }

    /// Build a sequence from coordinates that all share the same dimension
    ///
    /// An empty slice produces an empty 2D sequence.
    pub fn from_coords(coords: &[Coord]) -> Result<Self> {
        let has_z = coords.first().is_some_and(|c| c.z.is_some());
        let dimension = if has_z { 3 } else { 2 };

        let mut ordinates = Vec::with_capacity(coords.len() * dimension);
        for (i, c) in coords.iter().enumerate() {
            if c.z.is_some() != has_z {
                return Err(GeometryError::Dimension(format!(
                    "coordinate {} has dimension {}, expected {}",
                    i,
                    if c.z.is_some() { 3 } else { 2 },
                    dimension
                )));
            }
            ordinates.push(c.x);
            ordinates.push(c.y);
            if let Some(z) = c.z {
                ordinates.push(z);
            }
        }

        Ok(Self {
            dimension,
            ordinates,
        })
    }

    /// A sequence holding one coordinate
    pub fn single(coord: Coord) -> Self {
        let mut ordinates = vec![coord.x, coord.y];
        ordinates.extend(coord.z);
        Self {
            dimension: ordinates.len(),
            ordinates,
        }
    }

    /// Number of coordinates
    pub fn size(&self) -> usize {
        self.ordinates.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.ordinates.is_empty()
    }

    /// Ordinates per coordinate (2 or 3)
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn has_z(&self) -> bool {
        self.dimension == 3
    }

    pub fn get_x(&self, index: usize) -> Result<f64> {
        Ok(self.ordinates[self.offset(index, X)?])
    }

    pub fn get_y(&self, index: usize) -> Result<f64> {
        Ok(self.ordinates[self.offset(index, Y)?])
    }

    pub fn get_z(&self, index: usize) -> Result<f64> {
        Ok(self.ordinates[self.offset(index, Z)?])
    }

    pub fn set_x(&mut self, index: usize, value: f64) -> Result<()> {
        let offset = self.offset(index, X)?;
        self.ordinates[offset] = value;
        Ok(())
    }

    pub fn set_y(&mut self, index: usize, value: f64) -> Result<()> {
        let offset = self.offset(index, Y)?;
        self.ordinates[offset] = value;
        Ok(())
    }

    pub fn set_z(&mut self, index: usize, value: f64) -> Result<()> {
        let offset = self.offset(index, Z)?;
        self.ordinates[offset] = value;
        Ok(())
    }

    /// Read the full coordinate at `index`
    pub fn get(&self, index: usize) -> Result<Coord> {
        let base = self.offset(index, X)?;
        Ok(self.coord_at(base))
    }

    /// Iterate over all coordinates in order
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.ordinates.len())
            .step_by(self.dimension)
            .map(move |base| self.coord_at(base))
    }

    fn coord_at(&self, base: usize) -> Coord {
        Coord {
            x: self.ordinates[base + X],
            y: self.ordinates[base + Y],
            z: self.has_z().then(|| self.ordinates[base + Z]),
        }
    }

    /// Flat position of `ordinate` for coordinate `index`
    fn offset(&self, index: usize, ordinate: usize) -> Result<usize> {
        if ordinate >= self.dimension {
            return Err(GeometryError::Dimension(format!(
                "sequence has dimension {}, no Z ordinate",
                self.dimension
            )));
        }
        let size = self.size();
        if index >= size {
            return Err(GeometryError::Index { index, size });
        }
        Ok(index * self.dimension + ordinate)
    }
}

fn check_dimension(dimension: usize) -> Result<()> {
    match dimension {
        2 | 3 => Ok(()),
        _ => Err(GeometryError::Dimension(format!(
            "unsupported coordinate dimension {} (expected 2 or 3)",
            dimension
        ))),
    }
}
