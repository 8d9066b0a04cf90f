use crate::{
    reparam::Reparam,
    utils::{closest_point_on_line_segment, factor_iter},
    vector::Vector,
    Scalar,
};
use serde::{Deserialize, Serialize};

const DEFAULT_SAMPLE_COUNT: usize = 10;

fn default_sample_count() -> usize {
    DEFAULT_SAMPLE_COUNT
}

/// Degree of a Bezier segment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Degree {
    Linear,
    Quadratic,
    Cubic,
}

/// Segment operations errors.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub enum SegmentError {
    /// Handle at given slot holds a non-finite component.
    InvalidHandleValue(usize),
    /// Handle slot is not meaningful for the segment degree.
    InvalidHandleIndex(usize),
    InvalidSampleCount,
}

impl std::fmt::Display for SegmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for SegmentError {}

/// Control points of a Bezier segment, tagged by degree.
///
/// Slot semantics are uniform across degrees: slot 0 is the start anchor,
/// slot 3 the end anchor, slots 1 and 2 the start and end tangent points.
/// Linear segments use slots {0, 3}, quadratic {0, 1, 3}, cubic all four.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Handles<T> {
    Linear { from: T, to: T },
    Quadratic { from: T, param: T, to: T },
    Cubic { from: T, from_param: T, to_param: T, to: T },
}

impl<T> Handles<T>
where
    T: Vector,
{
    pub fn degree(&self) -> Degree {
        match self {
            Self::Linear { .. } => Degree::Linear,
            Self::Quadratic { .. } => Degree::Quadratic,
            Self::Cubic { .. } => Degree::Cubic,
        }
    }

    /// Gets start anchor.
    pub fn start(&self) -> &T {
        match self {
            Self::Linear { from, .. } | Self::Quadratic { from, .. } | Self::Cubic { from, .. } => {
                from
            }
        }
    }

    /// Gets end anchor.
    pub fn end(&self) -> &T {
        match self {
            Self::Linear { to, .. } | Self::Quadratic { to, .. } | Self::Cubic { to, .. } => to,
        }
    }

    fn validate(&self) -> Result<(), SegmentError> {
        match self {
            Self::Linear { from, to } => {
                if !from.is_valid() {
                    return Err(SegmentError::InvalidHandleValue(0));
                }
                if !to.is_valid() {
                    return Err(SegmentError::InvalidHandleValue(3));
                }
            }
            Self::Quadratic { from, param, to } => {
                if !from.is_valid() {
                    return Err(SegmentError::InvalidHandleValue(0));
                }
                if !param.is_valid() {
                    return Err(SegmentError::InvalidHandleValue(1));
                }
                if !to.is_valid() {
                    return Err(SegmentError::InvalidHandleValue(3));
                }
            }
            Self::Cubic {
                from,
                from_param,
                to_param,
                to,
            } => {
                if !from.is_valid() {
                    return Err(SegmentError::InvalidHandleValue(0));
                }
                if !from_param.is_valid() {
                    return Err(SegmentError::InvalidHandleValue(1));
                }
                if !to_param.is_valid() {
                    return Err(SegmentError::InvalidHandleValue(2));
                }
                if !to.is_valid() {
                    return Err(SegmentError::InvalidHandleValue(3));
                }
            }
        }
        Ok(())
    }
}

/// Serializable definition of a Bezier segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentDef<T> {
    pub handles: Handles<T>,
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    #[serde(default)]
    pub smooth: bool,
    #[serde(default)]
    pub reparam: Reparam,
}

impl<T> TryFrom<SegmentDef<T>> for Segment<T>
where
    T: Clone + Vector,
{
    type Error = SegmentError;

    fn try_from(value: SegmentDef<T>) -> Result<Self, Self::Error> {
        if value.sample_count == 0 {
            return Err(SegmentError::InvalidSampleCount);
        }
        let mut result = Self::new_uninitialized(value.handles)?;
        result.sample_count = value.sample_count;
        result.smooth = value.smooth;
        result.reparam = value.reparam;
        result.recalculate_length();
        Ok(result)
    }
}

impl<T> From<Segment<T>> for SegmentDef<T>
where
    T: Clone + Vector,
{
    fn from(v: Segment<T>) -> Self {
        Self {
            handles: v.handles,
            sample_count: v.sample_count,
            smooth: v.smooth,
            reparam: v.reparam,
        }
    }
}

/// Single Bezier segment of a path.
///
/// It's solved by interpolating each layer of its control points instead of
/// expanding the Bernstein polynomial, so for a cubic:
/// - A := lerp(from, from param, factor)
/// - B := lerp(from param, to param, factor)
/// - C := lerp(to param, to, factor)
/// - D := lerp(A, B, factor)
/// - E := lerp(B, C, factor)
/// - Result: lerp(D, E, factor)
///
/// Length, sampling and closest-point search approximate the curve with the
/// polyline of `sample_count` uniform parameter steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SegmentDef<T>")]
#[serde(into = "SegmentDef<T>")]
pub struct Segment<T>
where
    T: Clone + Vector,
{
    handles: Handles<T>,
    sample_count: usize,
    smooth: bool,
    reparam: Reparam,
    start_length: Scalar,
    end_length: Scalar,
    length: Scalar,
}

impl<T> Segment<T>
where
    T: Clone + Vector,
{
    fn new_uninitialized(handles: Handles<T>) -> Result<Self, SegmentError> {
        handles.validate()?;
        Ok(Self {
            handles,
            sample_count: DEFAULT_SAMPLE_COUNT,
            smooth: false,
            reparam: Reparam::default(),
            start_length: 0.0,
            end_length: 0.0,
            length: 0.0,
        })
    }

    /// Builds linear segment between two anchors.
    pub fn linear(from: T, to: T) -> Result<Self, SegmentError> {
        let mut result = Self::new_uninitialized(Handles::Linear { from, to })?;
        result.recalculate_length();
        Ok(result)
    }

    /// Builds quadratic segment with single tangent point.
    pub fn quadratic(from: T, param: T, to: T) -> Result<Self, SegmentError> {
        let mut result = Self::new_uninitialized(Handles::Quadratic { from, param, to })?;
        result.recalculate_length();
        Ok(result)
    }

    /// Builds cubic segment from all four control points.
    pub fn cubic(from: T, from_param: T, to_param: T, to: T) -> Result<Self, SegmentError> {
        let mut result = Self::new_uninitialized(Handles::Cubic {
            from,
            from_param,
            to_param,
            to,
        })?;
        result.recalculate_length();
        Ok(result)
    }

    /// Builds segment of given degree from a uniform 4-slot handle view.
    ///
    /// Slots not meaningful for the degree are dropped.
    pub fn from_view(degree: Degree, view: [T; 4]) -> Result<Self, SegmentError> {
        let [p0, p1, p2, p3] = view;
        match degree {
            Degree::Linear => Self::linear(p0, p3),
            Degree::Quadratic => Self::quadratic(p0, p1, p3),
            Degree::Cubic => Self::cubic(p0, p1, p2, p3),
        }
    }

    pub fn degree(&self) -> Degree {
        self.handles.degree()
    }

    /// Switches segment degree, converting control points.
    ///
    /// Raising degree preserves the curve shape exactly; dropping a cubic to
    /// quadratic uses the least-deviation control point and dropping to linear
    /// keeps the anchors only.
    pub fn set_degree(&mut self, degree: Degree) {
        if self.degree() == degree {
            return;
        }
        self.handles = match (&self.handles, degree) {
            (handles, Degree::Linear) => Handles::Linear {
                from: handles.start().clone(),
                to: handles.end().clone(),
            },
            (Handles::Linear { from, to }, Degree::Quadratic) => Handles::Quadratic {
                from: from.clone(),
                param: from.lerp(to, 0.5),
                to: to.clone(),
            },
            (Handles::Linear { from, to }, Degree::Cubic) => Handles::Cubic {
                from: from.clone(),
                from_param: from.lerp(to, 1.0 / 3.0),
                to_param: from.lerp(to, 2.0 / 3.0),
                to: to.clone(),
            },
            (Handles::Quadratic { from, param, to }, Degree::Cubic) => Handles::Cubic {
                from: from.clone(),
                from_param: from.lerp(param, 2.0 / 3.0),
                to_param: to.lerp(param, 2.0 / 3.0),
                to: to.clone(),
            },
            (
                Handles::Cubic {
                    from,
                    from_param,
                    to_param,
                    to,
                },
                Degree::Quadratic,
            ) => Handles::Quadratic {
                from: from.clone(),
                param: from_param
                    .offset(to_param)
                    .scale(3.0)
                    .offset(&from.negate())
                    .offset(&to.negate())
                    .scale(0.25),
                to: to.clone(),
            },
            _ => return,
        };
        self.recalculate_length();
    }

    /// Gets start anchor.
    pub fn start(&self) -> &T {
        self.handles.start()
    }

    /// Gets end anchor.
    pub fn end(&self) -> &T {
        self.handles.end()
    }

    /// Gets handle at given slot, if meaningful for the segment degree.
    pub fn handle(&self, index: usize) -> Option<&T> {
        match (&self.handles, index) {
            (Handles::Linear { from, .. }, 0) => Some(from),
            (Handles::Linear { to, .. }, 3) => Some(to),
            (Handles::Quadratic { from, .. }, 0) => Some(from),
            (Handles::Quadratic { param, .. }, 1) => Some(param),
            (Handles::Quadratic { to, .. }, 3) => Some(to),
            (Handles::Cubic { from, .. }, 0) => Some(from),
            (Handles::Cubic { from_param, .. }, 1) => Some(from_param),
            (Handles::Cubic { to_param, .. }, 2) => Some(to_param),
            (Handles::Cubic { to, .. }, 3) => Some(to),
            _ => None,
        }
    }

    /// Gets uniform 4-slot handle view.
    ///
    /// Slots not meaningful for the segment degree are synthesized: linear
    /// tangent slots sit at 1/3 and 2/3 along the chord, the quadratic end
    /// tangent slot mirrors the single tangent point.
    pub fn handles(&self) -> [T; 4] {
        match &self.handles {
            Handles::Linear { from, to } => [
                from.clone(),
                from.lerp(to, 1.0 / 3.0),
                from.lerp(to, 2.0 / 3.0),
                to.clone(),
            ],
            Handles::Quadratic { from, param, to } => {
                [from.clone(), param.clone(), param.clone(), to.clone()]
            }
            Handles::Cubic {
                from,
                from_param,
                to_param,
                to,
            } => [
                from.clone(),
                from_param.clone(),
                to_param.clone(),
                to.clone(),
            ],
        }
    }

    /// Sets handle at given slot.
    ///
    /// Fails on slots not meaningful for the segment degree and on non-finite
    /// values.
    pub fn set_handle(&mut self, index: usize, value: T) -> Result<(), SegmentError> {
        if !value.is_valid() {
            return Err(SegmentError::InvalidHandleValue(index));
        }
        let slot = match (&mut self.handles, index) {
            (Handles::Linear { from, .. }, 0) => from,
            (Handles::Linear { to, .. }, 3) => to,
            (Handles::Quadratic { from, .. }, 0) => from,
            (Handles::Quadratic { param, .. }, 1) => param,
            (Handles::Quadratic { to, .. }, 3) => to,
            (Handles::Cubic { from, .. }, 0) => from,
            (Handles::Cubic { from_param, .. }, 1) => from_param,
            (Handles::Cubic { to_param, .. }, 2) => to_param,
            (Handles::Cubic { to, .. }, 3) => to,
            _ => return Err(SegmentError::InvalidHandleIndex(index)),
        };
        *slot = value;
        self.recalculate_length();
        Ok(())
    }

    /// Sets all handles from a uniform 4-slot view.
    ///
    /// Slots not meaningful for the segment degree are dropped.
    pub fn set_handles(&mut self, view: [T; 4]) -> Result<(), SegmentError> {
        let [p0, p1, p2, p3] = view;
        let handles = match self.degree() {
            Degree::Linear => Handles::Linear { from: p0, to: p3 },
            Degree::Quadratic => Handles::Quadratic {
                from: p0,
                param: p1,
                to: p3,
            },
            Degree::Cubic => Handles::Cubic {
                from: p0,
                from_param: p1,
                to_param: p2,
                to: p3,
            },
        };
        handles.validate()?;
        self.handles = handles;
        self.recalculate_length();
        Ok(())
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Sets sampling resolution, clamped to at least one step.
    pub fn set_sample_count(&mut self, sample_count: usize) {
        self.sample_count = sample_count.max(1);
        self.recalculate_length();
    }

    pub fn smooth(&self) -> bool {
        self.smooth
    }

    /// Sets whether the incoming tangent mirrors across the previous joint.
    pub fn set_smooth(&mut self, smooth: bool) {
        self.smooth = smooth;
    }

    pub fn reparam(&self) -> Reparam {
        self.reparam
    }

    pub fn set_reparam(&mut self, reparam: Reparam) {
        self.reparam = reparam;
        self.recalculate_length();
    }

    /// Gets polyline arc length of this segment.
    pub fn length(&self) -> Scalar {
        self.length
    }

    /// Gets cumulative length at segment start within the owning chain.
    pub fn start_length(&self) -> Scalar {
        self.start_length
    }

    /// Gets cumulative length at segment end within the owning chain.
    pub fn end_length(&self) -> Scalar {
        self.end_length
    }

    pub(crate) fn set_length_bounds(&mut self, start: Scalar, end: Scalar) {
        self.start_length = start;
        self.end_length = end;
    }

    /// Samples segment at given factor.
    ///
    /// The factor goes through `reparam` first; values outside `<0; 1>`
    /// extrapolate along the same polynomial.
    pub fn evaluate(&self, factor: Scalar) -> T {
        let factor = self.reparam.apply(factor);
        match &self.handles {
            Handles::Linear { from, to } => from.lerp(to, factor),
            Handles::Quadratic { from, param, to } => {
                let a = from.lerp(param, factor);
                let b = param.lerp(to, factor);
                a.lerp(&b, factor)
            }
            Handles::Cubic {
                from,
                from_param,
                to_param,
                to,
            } => {
                let a = from.lerp(from_param, factor);
                let b = from_param.lerp(to_param, factor);
                let c = to_param.lerp(to, factor);
                let d = a.lerp(&b, factor);
                let e = b.lerp(&c, factor);
                d.lerp(&e, factor)
            }
        }
    }

    /// Gets iterator over polyline points of this segment.
    ///
    /// Linear segments yield exactly their two anchors. Curved segments yield
    /// `sample_count` leading samples without the terminal point; consumers
    /// that need it evaluate at factor 1 explicitly.
    pub fn points(&self) -> impl Iterator<Item = T> + '_ {
        let endpoints = match &self.handles {
            Handles::Linear { from, to } => Some([from.clone(), to.clone()]),
            _ => None,
        };
        let steps = if endpoints.is_some() {
            0
        } else {
            self.sample_count
        };
        endpoints
            .into_iter()
            .flatten()
            .chain((0..steps).map(move |index| self.evaluate(index as Scalar / steps as Scalar)))
    }

    /// Finds closest point to `point` on this segment.
    ///
    /// Linear segments project exactly; curved segments walk consecutive
    /// polyline spans and keep the first smallest squared distance, so
    /// accuracy scales with `sample_count`.
    pub fn closest_point(&self, point: &T) -> T {
        if let Handles::Linear { from, to } = &self.handles {
            return closest_point_on_line_segment(from, to, point);
        }
        let mut closest = T::zero();
        let mut closest_distance = Scalar::INFINITY;
        let mut previous: Option<T> = None;
        for factor in factor_iter(self.sample_count) {
            let current = self.evaluate(factor);
            if let Some(previous) = &previous {
                let candidate = closest_point_on_line_segment(previous, &current, point);
                let distance = candidate.delta(point).length_squared();
                if distance < closest_distance {
                    closest_distance = distance;
                    closest = candidate;
                }
            }
            previous = Some(current);
        }
        closest
    }

    fn recalculate_length(&mut self) {
        let mut result = 0.0;
        let mut previous: Option<T> = None;
        for factor in factor_iter(self.sample_count) {
            let current = self.evaluate(factor);
            if let Some(previous) = &previous {
                result += previous.delta(&current).length();
            }
            previous = Some(current);
        }
        self.length = result;
    }
}
