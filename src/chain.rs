use crate::{
    reparam::Reparam,
    segment::{Degree, Segment, SegmentDef, SegmentError},
    utils::remap,
    vector::Vector,
    Scalar,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

fn default_include_terminal() -> bool {
    true
}

/// Errors happening within chain operations.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub enum ChainError {
    SegmentIndexOutOfRange(usize),
    Segment(
        /// Segment index.
        usize,
        /// Segment error.
        SegmentError,
    ),
}

impl std::fmt::Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for ChainError {}

/// Serializable definition of a segment chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainDef<T> {
    pub segments: Vec<SegmentDef<T>>,
    #[serde(default = "default_include_terminal")]
    pub include_terminal: bool,
}

impl<T> TryFrom<ChainDef<T>> for Chain<T>
where
    T: Clone + Vector,
{
    type Error = ChainError;

    fn try_from(value: ChainDef<T>) -> Result<Self, Self::Error> {
        let segments = value
            .segments
            .into_iter()
            .enumerate()
            .map(|(index, def)| {
                Segment::try_from(def).map_err(|error| ChainError::Segment(index, error))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut result = Self::new(segments);
        result.include_terminal = value.include_terminal;
        Ok(result)
    }
}

impl<T> From<Chain<T>> for ChainDef<T>
where
    T: Clone + Vector,
{
    fn from(v: Chain<T>) -> Self {
        Self {
            segments: v.segments.into_iter().map(SegmentDef::from).collect(),
            include_terminal: v.include_terminal,
        }
    }
}

/// Ordered chain of Bezier segments representing an editable path.
///
/// Insertion order is path order. Adjacent segments share a joint: the end
/// anchor of one coincides with the start anchor of the next. Topology edits
/// and handle drags keep that invariant by copying the joint value across,
/// and finish by rebuilding the cumulative arc-length table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ChainDef<T>")]
#[serde(into = "ChainDef<T>")]
#[serde(bound = "T: Serialize + DeserializeOwned")]
pub struct Chain<T>
where
    T: Clone + Vector,
{
    pub(crate) segments: Vec<Segment<T>>,
    total_length: Scalar,
    include_terminal: bool,
}

impl<T> Default for Chain<T>
where
    T: Clone + Vector,
{
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            total_length: 0.0,
            include_terminal: true,
        }
    }
}

impl<T> Chain<T>
where
    T: Clone + Vector,
{
    /// Builds chain out of segments, in path order.
    ///
    /// Joint coincidence of the input is the caller's responsibility; the
    /// chain only maintains it across its own edit operations.
    pub fn new(segments: Vec<Segment<T>>) -> Self {
        let mut result = Self {
            segments,
            total_length: 0.0,
            include_terminal: true,
        };
        result.recompute();
        result
    }

    /// Gets slice of chain segments.
    pub fn segments(&self) -> &[Segment<T>] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&Segment<T>> {
        self.segments.get(index)
    }

    /// Gets cached total arc length of this chain.
    pub fn total_length(&self) -> Scalar {
        self.total_length
    }

    pub fn include_terminal(&self) -> bool {
        self.include_terminal
    }

    /// Sets whether chain sampling appends the final boundary point.
    pub fn set_include_terminal(&mut self, include_terminal: bool) {
        self.include_terminal = include_terminal;
    }

    /// Rebuilds the cumulative arc-length table.
    ///
    /// Walks segments in order accumulating their lengths into per-segment
    /// bounds and the chain total. Idempotent; every structural or handle
    /// edit ends with it.
    pub fn recompute(&mut self) {
        let mut running = 0.0;
        for segment in &mut self.segments {
            let length = segment.length();
            segment.set_length_bounds(running, running + length);
            running += length;
        }
        self.total_length = running;
        log::trace!(
            "recomputed arc-length table: {} segments, total length {}",
            self.segments.len(),
            self.total_length,
        );
    }

    /// Samples chain at given factor in `<0; 1>` range, length-weighted over
    /// all segments.
    ///
    /// The factor is matched against each segment's normalized length range
    /// in path order, both bounds inclusive, so a factor landing exactly on a
    /// joint resolves to the earlier segment. Empty and zero-length chains
    /// yield the zero point.
    pub fn evaluate(&self, factor: Scalar) -> T {
        if self.total_length <= 0.0 {
            return T::zero();
        }
        for segment in &self.segments {
            let start = segment.start_length() / self.total_length;
            let end = segment.end_length() / self.total_length;
            if factor >= start && factor <= end {
                let local = if end > start {
                    remap(factor, start, end, 0.0, 1.0)
                } else {
                    0.0
                };
                return segment.evaluate(local);
            }
        }
        T::zero()
    }

    /// Gets iterator over polyline points of the whole chain.
    ///
    /// Concatenates per-segment points in path order and appends the final
    /// boundary point when `include_terminal` is set.
    pub fn points(&self) -> impl Iterator<Item = T> + '_ {
        let terminal = if self.include_terminal {
            self.segments.last().map(|segment| segment.evaluate(1.0))
        } else {
            None
        };
        self.segments
            .iter()
            .flat_map(|segment| segment.points())
            .chain(terminal)
    }

    /// Finds closest point to `point` across all segments.
    ///
    /// Returns the owning segment index with the point, so callers can feed
    /// the index back into `split_insert`. First smallest distance wins.
    pub fn closest_point(&self, point: &T) -> Option<(usize, T)> {
        let mut closest = None;
        let mut closest_distance = Scalar::INFINITY;
        for (index, segment) in self.segments.iter().enumerate() {
            let candidate = segment.closest_point(point);
            let distance = candidate.delta(point).length_squared();
            if distance < closest_distance {
                closest_distance = distance;
                closest = Some((index, candidate));
            }
        }
        closest
    }

    /// Attaches a new segment at whichever chain end is closer to `point`.
    ///
    /// On an empty chain creates a default cubic segment anchored at `point`.
    /// Otherwise the new segment joins the nearer end, inherits the neighbor
    /// degree and synthesizes its tangents from the neighbor's own tangent
    /// reflected about the shared joint.
    pub fn append_or_prepend(&mut self, point: T) -> Result<(), ChainError> {
        if self.segments.is_empty() {
            let from_param = offset_axes(&point, 0.0, 0.5);
            let to_param = offset_axes(&point, 0.5, 0.5);
            let to = offset_axes(&point, 0.5, 0.0);
            let segment = Segment::cubic(point, from_param, to_param, to)
                .map_err(|error| ChainError::Segment(0, error))?;
            self.segments.push(segment);
            log::debug!("created first segment");
        } else {
            let first = self.segments[0].handles();
            let last = self.segments[self.segments.len() - 1].handles();
            let to_first = point.delta(&first[0]).length();
            let to_last = point.delta(&last[3]).length();
            if to_first < to_last {
                let reflected = first[0].offset(&first[1].delta(&first[0]));
                let view = [
                    point.clone(),
                    point.lerp(&reflected, 0.5),
                    reflected,
                    first[0].clone(),
                ];
                let degree = self.segments[0].degree();
                let segment = Segment::from_view(degree, view)
                    .map_err(|error| ChainError::Segment(0, error))?;
                self.segments.insert(0, segment);
                log::debug!("prepended segment, {} segments now", self.segments.len());
            } else {
                let reflected = last[3].offset(&last[2].delta(&last[3]));
                let view = [
                    last[3].clone(),
                    reflected.clone(),
                    point.lerp(&reflected, 0.5),
                    point,
                ];
                let degree = self.segments[self.segments.len() - 1].degree();
                let segment = Segment::from_view(degree, view)
                    .map_err(|error| ChainError::Segment(self.segments.len(), error))?;
                self.segments.push(segment);
                log::debug!("appended segment, {} segments now", self.segments.len());
            }
        }
        self.recompute();
        Ok(())
    }

    /// Splits segment at `index` at interior point `point`.
    ///
    /// The segment keeps its head half up to `point`; a new segment of the
    /// same degree takes over the tail and is inserted right after it. The
    /// replacement tangents interpolate the original ones so the visual shape
    /// is approximately preserved, and the outer anchors stay untouched.
    pub fn split_insert(&mut self, index: usize, point: T) -> Result<(), ChainError> {
        if index >= self.segments.len() {
            return Err(ChainError::SegmentIndexOutOfRange(index));
        }
        let degree = self.segments[index].degree();
        let view = self.segments[index].handles();
        let outer = view[2].lerp(&view[3], 0.5);
        let inner = point.lerp(&outer, 0.25);
        let tail = Segment::from_view(degree, [point.clone(), inner, outer, view[3].clone()])
            .map_err(|error| ChainError::Segment(index + 1, error))?;
        let head = [
            view[0].clone(),
            view[1].clone(),
            view[2].lerp(&point, 0.25),
            point,
        ];
        self.segments[index]
            .set_handles(head)
            .map_err(|error| ChainError::Segment(index, error))?;
        self.segments.insert(index + 1, tail);
        log::debug!(
            "split segment {}, {} segments now",
            index,
            self.segments.len(),
        );
        self.recompute();
        Ok(())
    }

    /// Removes segment at `index` and returns it.
    ///
    /// Neighbors are left untouched, so the path may stay disjoint across the
    /// gap until a compensating edit.
    pub fn remove(&mut self, index: usize) -> Result<Segment<T>, ChainError> {
        if index >= self.segments.len() {
            return Err(ChainError::SegmentIndexOutOfRange(index));
        }
        let removed = self.segments.remove(index);
        log::debug!(
            "removed segment {}, {} segments now",
            index,
            self.segments.len(),
        );
        self.recompute();
        Ok(removed)
    }

    /// Switches degree of segment at `index`.
    pub fn set_degree(&mut self, index: usize, degree: Degree) -> Result<(), ChainError> {
        self.segment_mut(index)?.set_degree(degree);
        self.recompute();
        Ok(())
    }

    /// Sets tangent smoothing flag of segment at `index`.
    pub fn set_smooth(&mut self, index: usize, smooth: bool) -> Result<(), ChainError> {
        self.segment_mut(index)?.set_smooth(smooth);
        Ok(())
    }

    /// Sets sampling resolution of segment at `index`.
    pub fn set_sample_count(&mut self, index: usize, sample_count: usize) -> Result<(), ChainError> {
        self.segment_mut(index)?.set_sample_count(sample_count);
        self.recompute();
        Ok(())
    }

    /// Sets evaluation parameter remapping of segment at `index`.
    pub fn set_reparam(&mut self, index: usize, reparam: Reparam) -> Result<(), ChainError> {
        self.segment_mut(index)?.set_reparam(reparam);
        self.recompute();
        Ok(())
    }

    fn segment_mut(&mut self, index: usize) -> Result<&mut Segment<T>, ChainError> {
        self.segments
            .get_mut(index)
            .ok_or(ChainError::SegmentIndexOutOfRange(index))
    }
}

fn offset_axes<T>(point: &T, x: Scalar, y: Scalar) -> T
where
    T: Clone + Vector,
{
    let mut result = point.clone();
    if let Some(value) = result.get_axis(0) {
        result.set_axis(0, value + x);
    }
    if let Some(value) = result.get_axis(1) {
        result.set_axis(1, value + y);
    }
    result
}
