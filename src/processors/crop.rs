//! Crop-expression parsing and application.
//!
//! The `crop_volume` key holds a slice expression in the array notation the
//! pipeline has always used, e.g. `[:, 0:620, 420:1750]`: one entry per
//! axis (z, y, x), each either a full slice `:`, a `start:stop` range with
//! optional endpoints, or a single index. This module parses that string
//! into a [`CropSpec`] and applies it to a volume.

use crate::core::errors::{ProcessingStage, SegError, SegResult};
use ndarray::{s, Array3};
use std::ops::Range;

/// Selection applied to a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSpec {
    /// Keep the whole axis (`:`).
    Full,
    /// Keep a `start:stop` range; open endpoints mean the axis bound.
    Slice {
        start: Option<usize>,
        stop: Option<usize>,
    },
    /// Keep a single index. The axis is kept with length 1 so the result
    /// stays three-dimensional.
    Index(usize),
}

/// A parsed crop expression, one [`AxisSpec`] per axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropSpec {
    axes: Vec<AxisSpec>,
}

impl CropSpec {
    /// Parses a crop expression.
    ///
    /// Surrounding brackets are optional. Slice steps are not supported:
    /// `a:b:c` is rejected unless the step is omitted or `1`.
    ///
    /// # Errors
    ///
    /// Returns `SegError::InvalidInput` on empty expressions, non-integer
    /// entries, reversed ranges, or unsupported steps.
    pub fn parse(expr: &str) -> SegResult<Self> {
        let trimmed = expr.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(trimmed)
            .trim();

        if inner.is_empty() {
            return Err(SegError::invalid_input("empty crop expression"));
        }

        let axes = inner
            .split(',')
            .map(|part| Self::parse_axis(part.trim()))
            .collect::<SegResult<Vec<_>>>()?;

        Ok(Self { axes })
    }

    fn parse_axis(part: &str) -> SegResult<AxisSpec> {
        if part.is_empty() {
            return Err(SegError::invalid_input("empty axis entry in crop expression"));
        }

        if !part.contains(':') {
            let index = part.parse::<usize>().map_err(|_| {
                SegError::invalid_input(format!("invalid index '{part}' in crop expression"))
            })?;
            return Ok(AxisSpec::Index(index));
        }

        let pieces: Vec<&str> = part.split(':').map(str::trim).collect();
        if pieces.len() > 3 || (pieces.len() == 3 && !pieces[2].is_empty() && pieces[2] != "1") {
            return Err(SegError::invalid_input(format!(
                "slice step is not supported in crop expression: '{part}'"
            )));
        }

        let parse_endpoint = |piece: &str| -> SegResult<Option<usize>> {
            if piece.is_empty() {
                Ok(None)
            } else {
                piece.parse::<usize>().map(Some).map_err(|_| {
                    SegError::invalid_input(format!(
                        "invalid slice endpoint '{piece}' in crop expression"
                    ))
                })
            }
        };

        let start = parse_endpoint(pieces[0])?;
        let stop = parse_endpoint(pieces.get(1).copied().unwrap_or(""))?;

        if let (Some(a), Some(b)) = (start, stop) {
            if a >= b {
                return Err(SegError::invalid_input(format!(
                    "reversed or empty slice {a}:{b} in crop expression"
                )));
            }
        }

        match (start, stop) {
            (None, None) => Ok(AxisSpec::Full),
            (start, stop) => Ok(AxisSpec::Slice { start, stop }),
        }
    }

    /// Number of axis entries in the expression.
    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    /// Axis entries.
    pub fn axes(&self) -> &[AxisSpec] {
        &self.axes
    }

    /// Resolves the expression against a concrete (z, y, x) shape.
    ///
    /// Open slice endpoints become the axis bounds and a `stop` beyond the
    /// axis is clamped to it; a `start` at or past the axis bound and
    /// out-of-range indices are errors, as is an expression whose number of
    /// entries does not match the volume.
    pub fn resolve(&self, shape: (usize, usize, usize)) -> SegResult<[Range<usize>; 3]> {
        let dims = [shape.0, shape.1, shape.2];
        if self.axes.len() != 3 {
            return Err(SegError::invalid_input(format!(
                "crop expression has {} axes, expected 3",
                self.axes.len()
            )));
        }

        let mut ranges = [0..0, 0..0, 0..0];
        for (axis, (spec, &dim)) in self.axes.iter().zip(dims.iter()).enumerate() {
            ranges[axis] = match *spec {
                AxisSpec::Full => 0..dim,
                AxisSpec::Index(i) => {
                    if i >= dim {
                        return Err(SegError::invalid_input(format!(
                            "crop index {i} out of bounds for axis {axis} of size {dim}"
                        )));
                    }
                    i..i + 1
                }
                AxisSpec::Slice { start, stop } => {
                    let start = start.unwrap_or(0);
                    let stop = stop.unwrap_or(dim).min(dim);
                    if start >= dim || start >= stop {
                        return Err(SegError::invalid_input(format!(
                            "crop range {start}:{stop} out of bounds for axis {axis} of size {dim}"
                        )));
                    }
                    start..stop
                }
            };
        }
        Ok(ranges)
    }

    /// Applies the crop to a volume, returning the selected sub-volume.
    pub fn apply<T: Clone>(&self, volume: &Array3<T>) -> SegResult<Array3<T>> {
        let ranges = self.resolve(volume.dim()).map_err(|e| {
            SegError::processing(ProcessingStage::Crop, "crop expression does not fit volume", e)
        })?;
        let [z, y, x] = ranges;
        Ok(volume.slice(s![z, y, x]).to_owned())
    }
}

impl std::fmt::Display for CropSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, spec) in self.axes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match spec {
                AxisSpec::Full => write!(f, ":")?,
                AxisSpec::Index(idx) => write!(f, "{idx}")?,
                AxisSpec::Slice { start, stop } => {
                    if let Some(s) = start {
                        write!(f, "{s}")?;
                    }
                    write!(f, ":")?;
                    if let Some(s) = stop {
                        write!(f, "{s}")?;
                    }
                }
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_parse_reference_expression() {
        let spec = CropSpec::parse("[:, 0:620, 420:1750]").unwrap();
        assert_eq!(
            spec.axes(),
            &[
                AxisSpec::Full,
                AxisSpec::Slice {
                    start: Some(0),
                    stop: Some(620)
                },
                AxisSpec::Slice {
                    start: Some(420),
                    stop: Some(1750)
                },
            ]
        );
    }

    #[test]
    fn test_parse_without_brackets_and_open_ends() {
        let spec = CropSpec::parse("5:, :100, 3").unwrap();
        assert_eq!(
            spec.axes(),
            &[
                AxisSpec::Slice {
                    start: Some(5),
                    stop: None
                },
                AxisSpec::Slice {
                    start: None,
                    stop: Some(100)
                },
                AxisSpec::Index(3),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(CropSpec::parse("").is_err());
        assert!(CropSpec::parse("[]").is_err());
        assert!(CropSpec::parse("[:, a:b, :]").is_err());
        assert!(CropSpec::parse("[:, 10:5, :]").is_err());
        assert!(CropSpec::parse("[:, 0:10:2, :]").is_err());
        assert!(CropSpec::parse("[:, , :]").is_err());
        assert!(CropSpec::parse("[:, -5:10, :]").is_err());
    }

    #[test]
    fn test_parse_accepts_unit_step() {
        assert!(CropSpec::parse("[::, 0:10:1, :]").is_ok());
    }

    #[test]
    fn test_resolve_clamps_stop() {
        let spec = CropSpec::parse("[:, 0:620, 420:1750]").unwrap();
        let ranges = spec.resolve((100, 500, 1000)).unwrap();
        assert_eq!(ranges, [0..100, 0..500, 420..1000]);
    }

    #[test]
    fn test_resolve_rejects_out_of_bounds_start() {
        let spec = CropSpec::parse("[:, 600:620, :]").unwrap();
        assert!(spec.resolve((10, 500, 500)).is_err());

        let spec = CropSpec::parse("[12, :, :]").unwrap();
        assert!(spec.resolve((10, 500, 500)).is_err());
    }

    #[test]
    fn test_resolve_requires_three_axes() {
        let spec = CropSpec::parse("[:, :]").unwrap();
        assert!(spec.resolve((10, 10, 10)).is_err());
    }

    #[test]
    fn test_apply() {
        let volume = Array3::from_shape_fn((4, 6, 8), |(z, y, x)| (z * 100 + y * 10 + x) as f32);
        let spec = CropSpec::parse("[1:3, :, 2:5]").unwrap();
        let cropped = spec.apply(&volume).unwrap();
        assert_eq!(cropped.dim(), (2, 6, 3));
        assert_eq!(cropped[[0, 0, 0]], volume[[1, 0, 2]]);
        assert_eq!(cropped[[1, 5, 2]], volume[[2, 5, 4]]);
    }

    #[test]
    fn test_apply_index_keeps_axis() {
        let volume = Array3::<f32>::zeros((4, 6, 8));
        let spec = CropSpec::parse("[2, :, :]").unwrap();
        let cropped = spec.apply(&volume).unwrap();
        assert_eq!(cropped.dim(), (1, 6, 8));
    }

    #[test]
    fn test_display_roundtrip() {
        let spec = CropSpec::parse("[:, 0:620, 420:1750]").unwrap();
        assert_eq!(spec.to_string(), "[:, 0:620, 420:1750]");
        assert_eq!(CropSpec::parse(&spec.to_string()).unwrap(), spec);
    }
}
