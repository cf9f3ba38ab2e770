//! The [`Cube`] container.

use std::collections::BTreeMap;

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use crate::coord::{CubeKind, DimCoord, LeadingAxis, ThresholdAxis};
use crate::error::CubeError;

/// A labelled N-dimensional forecast array.
///
/// Axis 0 of `data` is the leading probabilistic axis when one is present;
/// the remaining axes follow `dims` in order. A cube with no trailing
/// dimensions holds a single point.
///
/// Cubes are validated on construction and on deserialization, so every
/// `Cube` value satisfies the shape and coordinate invariants.
///
/// # Example
///
/// ```
/// use ndarray::{ArrayD, IxDyn};
/// use nimbus_cube::{Cube, CubeKind, DimCoord, LeadingAxis};
///
/// let data = ArrayD::from_shape_vec(IxDyn(&[3, 2]), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// let cube = Cube::new(
///     "air_temperature",
///     "K",
///     Some(LeadingAxis::Realization { points: vec![0, 1, 2] }),
///     vec![DimCoord::new("longitude", "degrees", vec![0.0, 1.0])],
///     data,
/// )
/// .unwrap();
///
/// assert_eq!(cube.kind(), Some(CubeKind::Realization));
/// assert_eq!(cube.n_points(), 2);
/// assert_eq!(cube.columns().unwrap()[1], vec![2.0, 4.0, 6.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CubeRepr", into = "CubeRepr")]
pub struct Cube {
    name: String,
    units: String,
    leading: Option<LeadingAxis>,
    dims: Vec<DimCoord>,
    data: ArrayD<f64>,
    attributes: BTreeMap<String, String>,
}

impl Cube {
    /// Creates a cube, checking the data shape against the coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError`] if the leading axis is invalid or the data shape
    /// differs from `[leading.len(), dims[0].len(), ...]`.
    pub fn new(
        name: impl Into<String>,
        units: impl Into<String>,
        leading: Option<LeadingAxis>,
        dims: Vec<DimCoord>,
        data: ArrayD<f64>,
    ) -> Result<Self, CubeError> {
        let cube = Self {
            name: name.into(),
            units: units.into(),
            leading,
            dims,
            data,
            attributes: BTreeMap::new(),
        };
        cube.validate()?;
        Ok(cube)
    }

    /// Builds a cube from per-point columns along the leading axis.
    ///
    /// `columns[p][k]` becomes the value at leading index `k` and trailing
    /// point `p` (row-major over the trailing dimensions). This is the
    /// inverse of [`columns`](Self::columns).
    pub fn from_columns(
        name: impl Into<String>,
        units: impl Into<String>,
        leading: LeadingAxis,
        dims: Vec<DimCoord>,
        columns: &[Vec<f64>],
    ) -> Result<Self, CubeError> {
        let m = leading.len();
        let mut shape = Vec::with_capacity(dims.len() + 1);
        shape.push(m);
        shape.extend(dims.iter().map(DimCoord::len));

        let n_points: usize = shape[1..].iter().product();
        if columns.len() != n_points || columns.iter().any(|c| c.len() != m) {
            let got_m = columns.first().map_or(0, Vec::len);
            return Err(CubeError::ShapeMismatch {
                expected: vec![m, n_points],
                got: vec![got_m, columns.len()],
            });
        }

        let mut flat = vec![0.0; m * n_points];
        for (p, column) in columns.iter().enumerate() {
            for (k, &value) in column.iter().enumerate() {
                flat[k * n_points + p] = value;
            }
        }

        let data =
            ArrayD::from_shape_vec(IxDyn(&shape), flat).map_err(|_| CubeError::ShapeMismatch {
                expected: shape.clone(),
                got: vec![m * n_points],
            })?;
        Self::new(name, units, Some(leading), dims, data)
    }

    /// Adds or replaces an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Replaces all attributes.
    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Checks the shape and coordinate invariants.
    pub fn validate(&self) -> Result<(), CubeError> {
        if let Some(axis) = &self.leading {
            axis.validate()?;
        }
        let expected = self.expected_shape();
        if self.data.shape() != expected.as_slice() {
            return Err(CubeError::ShapeMismatch {
                expected,
                got: self.data.shape().to_vec(),
            });
        }
        Ok(())
    }

    fn expected_shape(&self) -> Vec<usize> {
        self.leading
            .iter()
            .map(LeadingAxis::len)
            .chain(self.dims.iter().map(DimCoord::len))
            .collect()
    }

    // --- Accessors ---

    /// Returns the diagnostic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the data units.
    pub fn units(&self) -> &str {
        &self.units
    }

    /// Returns the leading axis, if any.
    pub fn leading_axis(&self) -> Option<&LeadingAxis> {
        self.leading.as_ref()
    }

    /// Returns the trailing dimension coordinates.
    pub fn dims(&self) -> &[DimCoord] {
        &self.dims
    }

    /// Returns the data array.
    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    /// Returns the attribute map.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Returns the probabilistic kind, or `None` for a cube without a
    /// leading axis.
    pub fn kind(&self) -> Option<CubeKind> {
        self.leading.as_ref().map(LeadingAxis::kind)
    }

    /// Returns the realization labels of a realization cube.
    pub fn realization_points(&self) -> Option<&[i32]> {
        match &self.leading {
            Some(LeadingAxis::Realization { points }) => Some(points),
            _ => None,
        }
    }

    /// Returns the percentile points of a percentile cube.
    pub fn percentile_points(&self) -> Option<&[f64]> {
        match &self.leading {
            Some(LeadingAxis::Percentile { points }) => Some(points),
            _ => None,
        }
    }

    /// Returns the threshold axis of a probability cube.
    pub fn threshold_axis(&self) -> Option<&ThresholdAxis> {
        match &self.leading {
            Some(LeadingAxis::Threshold(t)) => Some(t),
            _ => None,
        }
    }

    /// Returns the length of the leading axis (0 when absent).
    pub fn leading_len(&self) -> usize {
        self.leading.as_ref().map_or(0, LeadingAxis::len)
    }

    /// Returns the number of trailing points (product of trailing lengths).
    pub fn n_points(&self) -> usize {
        self.dims.iter().map(DimCoord::len).product()
    }

    /// Returns the values along the leading axis at every trailing point.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::MissingLeadingAxis`] if the cube has no leading
    /// axis.
    pub fn columns(&self) -> Result<Vec<Vec<f64>>, CubeError> {
        if self.leading.is_none() {
            return Err(CubeError::MissingLeadingAxis {
                name: self.name.clone(),
            });
        }
        let m = self.leading_len();
        let n = self.n_points();
        // Logical (row-major) order regardless of memory layout.
        let flat: Vec<f64> = self.data.iter().copied().collect();
        Ok((0..n)
            .map(|p| (0..m).map(|k| flat[k * n + p]).collect())
            .collect())
    }

    /// Checks that `other` has identical trailing coordinates.
    pub fn check_spatial_match(&self, other: &Cube) -> Result<(), CubeError> {
        if self.dims.len() != other.dims.len() {
            return Err(CubeError::SpatialMismatch {
                reason: format!(
                    "{} trailing dimensions vs {}",
                    self.dims.len(),
                    other.dims.len()
                ),
            });
        }
        for (i, (a, b)) in self.dims.iter().zip(other.dims.iter()).enumerate() {
            if a.name != b.name {
                return Err(CubeError::SpatialMismatch {
                    reason: format!("dimension {i} is '{}' vs '{}'", a.name, b.name),
                });
            }
            if a.units != b.units {
                return Err(CubeError::SpatialMismatch {
                    reason: format!("'{}' units are '{}' vs '{}'", a.name, a.units, b.units),
                });
            }
            if a.points != b.points {
                return Err(CubeError::SpatialMismatch {
                    reason: format!("'{}' points differ", a.name),
                });
            }
        }
        Ok(())
    }
}

/// Unchecked serde mirror of [`Cube`].
#[derive(Serialize, Deserialize)]
struct CubeRepr {
    name: String,
    units: String,
    #[serde(default)]
    leading: Option<LeadingAxis>,
    #[serde(default)]
    dims: Vec<DimCoord>,
    data: ArrayD<f64>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
}

impl TryFrom<CubeRepr> for Cube {
    type Error = CubeError;

    fn try_from(repr: CubeRepr) -> Result<Self, Self::Error> {
        Ok(Cube::new(repr.name, repr.units, repr.leading, repr.dims, repr.data)?
            .with_attributes(repr.attributes))
    }
}

impl From<Cube> for CubeRepr {
    fn from(cube: Cube) -> Self {
        Self {
            name: cube.name,
            units: cube.units,
            leading: cube.leading,
            dims: cube.dims,
            data: cube.data,
            attributes: cube.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::ThresholdSense;

    fn grid() -> Vec<DimCoord> {
        vec![
            DimCoord::new("latitude", "degrees", vec![50.0, 51.0]),
            DimCoord::new("longitude", "degrees", vec![0.0, 1.0, 2.0]),
        ]
    }

    fn percentile_cube() -> Cube {
        let data: Vec<f64> = (0..12).map(f64::from).collect();
        Cube::new(
            "air_temperature",
            "K",
            Some(LeadingAxis::Percentile {
                points: vec![25.0, 75.0],
            }),
            grid(),
            ArrayD::from_shape_vec(IxDyn(&[2, 2, 3]), data).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn shape_mismatch_rejected() {
        let result = Cube::new(
            "air_temperature",
            "K",
            Some(LeadingAxis::Realization { points: vec![0] }),
            grid(),
            ArrayD::zeros(IxDyn(&[1, 3, 2])),
        );
        assert_eq!(
            result,
            Err(CubeError::ShapeMismatch {
                expected: vec![1, 2, 3],
                got: vec![1, 3, 2],
            })
        );
    }

    #[test]
    fn cube_without_leading_axis() {
        let cube = Cube::new(
            "orography",
            "m",
            None,
            grid(),
            ArrayD::zeros(IxDyn(&[2, 3])),
        )
        .unwrap();
        assert_eq!(cube.kind(), None);
        assert_eq!(cube.leading_len(), 0);
        assert!(matches!(
            cube.columns(),
            Err(CubeError::MissingLeadingAxis { .. })
        ));
    }

    #[test]
    fn columns_follow_leading_axis() {
        let cube = percentile_cube();
        let columns = cube.columns().unwrap();
        assert_eq!(columns.len(), 6);
        assert_eq!(columns[0], vec![0.0, 6.0]);
        assert_eq!(columns[5], vec![5.0, 11.0]);
    }

    #[test]
    fn from_columns_inverts_columns() {
        let cube = percentile_cube();
        let columns = cube.columns().unwrap();
        let rebuilt = Cube::from_columns(
            cube.name(),
            cube.units(),
            cube.leading_axis().unwrap().clone(),
            cube.dims().to_vec(),
            &columns,
        )
        .unwrap();
        assert_eq!(rebuilt, cube);
    }

    #[test]
    fn from_columns_rejects_ragged_input() {
        let result = Cube::from_columns(
            "air_temperature",
            "K",
            LeadingAxis::Realization { points: vec![0, 1] },
            vec![DimCoord::new("x", "m", vec![0.0, 1.0])],
            &[vec![1.0, 2.0], vec![3.0]],
        );
        assert!(matches!(result, Err(CubeError::ShapeMismatch { .. })));
    }

    #[test]
    fn scalar_point_cube() {
        let cube = Cube::new(
            "air_temperature",
            "K",
            Some(LeadingAxis::Realization {
                points: vec![0, 1, 2],
            }),
            vec![],
            ArrayD::from_shape_vec(IxDyn(&[3]), vec![1.0, 2.0, 3.0]).unwrap(),
        )
        .unwrap();
        assert_eq!(cube.n_points(), 1);
        assert_eq!(cube.columns().unwrap(), vec![vec![1.0, 2.0, 3.0]]);
    }

    #[test]
    fn spatial_match_detects_differences() {
        let a = percentile_cube();
        let mut dims = grid();
        dims[1].points[2] = 2.5;
        let b = Cube::new(
            "air_temperature",
            "K",
            Some(LeadingAxis::Realization { points: vec![0, 1] }),
            dims,
            ArrayD::zeros(IxDyn(&[2, 2, 3])),
        )
        .unwrap();

        assert!(a.check_spatial_match(&a).is_ok());
        assert_eq!(
            a.check_spatial_match(&b),
            Err(CubeError::SpatialMismatch {
                reason: "'longitude' points differ".to_string()
            })
        );
    }

    #[test]
    fn typed_axis_accessors() {
        let cube = percentile_cube();
        assert_eq!(cube.percentile_points(), Some(&[25.0, 75.0][..]));
        assert_eq!(cube.realization_points(), None);
        assert!(cube.threshold_axis().is_none());
    }

    #[test]
    fn serde_round_trip_validates() {
        let cube = Cube::new(
            "probability_of_air_temperature_above_threshold",
            "1",
            Some(LeadingAxis::Threshold(ThresholdAxis::new(
                "air_temperature",
                "K",
                vec![275.0, 276.0],
                ThresholdSense::GreaterThan,
            ))),
            vec![],
            ArrayD::from_shape_vec(IxDyn(&[2]), vec![0.8, 0.2]).unwrap(),
        )
        .unwrap()
        .with_attribute("source", "test");

        let json = serde_json::to_string(&cube).unwrap();
        let back: Cube = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cube);

        // Corrupt the threshold ordering: deserialization must fail.
        let bad = json.replace("[275.0,276.0]", "[276.0,275.0]");
        assert!(serde_json::from_str::<Cube>(&bad).is_err());
    }
}
