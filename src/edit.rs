use crate::{
    chain::{Chain, ChainError},
    segment::{Degree, SegmentError},
    vector::Vector,
    Scalar,
};

impl<T> Chain<T>
where
    T: Clone + Vector,
{
    /// Moves a single handle and propagates the edit to neighbor segments so
    /// shared joints stay coincident and smooth tangents stay mirrored.
    ///
    /// The rules per handle slot:
    /// - slot 0 (start anchor): on a cubic segment the start tangent rides
    ///   along unless it sits within `2 * grab_radius` of the moved anchor.
    ///   The previous segment's end anchor is forced onto the new position,
    ///   and its end tangent rides along when both segments are cubic.
    /// - slot 1 (start tangent): with `smooth` set and both this and the
    ///   previous segment cubic, the previous end tangent mirrors about the
    ///   shared joint.
    /// - slot 2 (end tangent): forward mirror of slot 1, into the next
    ///   segment.
    /// - slot 3 (end anchor): forward mirror of slot 0.
    ///
    /// `grab_radius` is the caller's interaction scale; passing zero makes
    /// tangents always ride along with their anchor. Fails fast on a segment
    /// index out of range or a handle slot not meaningful for the segment
    /// degree, and ends by rebuilding the arc-length table.
    pub fn drag_handle(
        &mut self,
        segment_index: usize,
        handle_index: usize,
        new_position: T,
        grab_radius: Scalar,
    ) -> Result<(), ChainError> {
        if segment_index >= self.segments.len() {
            return Err(ChainError::SegmentIndexOutOfRange(segment_index));
        }
        let old_position = match self.segments[segment_index].handle(handle_index) {
            Some(handle) => handle.clone(),
            None => {
                return Err(ChainError::Segment(
                    segment_index,
                    SegmentError::InvalidHandleIndex(handle_index),
                ));
            }
        };
        let delta = old_position.delta(&new_position);
        self.set_handle_at(segment_index, handle_index, new_position.clone())?;
        let follow_distance = grab_radius * 2.0;
        match handle_index {
            0 => {
                if self.segments[segment_index].degree() == Degree::Cubic {
                    let [_, tangent, _, _] = self.segments[segment_index].handles();
                    if tangent.delta(&new_position).length() > follow_distance {
                        self.set_handle_at(segment_index, 1, tangent.offset(&delta))?;
                    }
                }
                if segment_index > 0 {
                    let previous = segment_index - 1;
                    self.set_handle_at(previous, 3, new_position)?;
                    if self.cubic_pair(previous, segment_index) {
                        let [_, _, tangent, _] = self.segments[previous].handles();
                        self.set_handle_at(previous, 2, tangent.offset(&delta))?;
                    }
                }
            }
            1 => {
                if segment_index > 0
                    && self.segments[segment_index].smooth()
                    && self.cubic_pair(segment_index - 1, segment_index)
                {
                    let previous = segment_index - 1;
                    let [start, tangent, _, _] = self.segments[segment_index].handles();
                    let diff = start.delta(&tangent);
                    let [_, _, _, joint] = self.segments[previous].handles();
                    self.set_handle_at(previous, 2, joint.offset(&diff.negate()))?;
                }
            }
            2 => {
                if segment_index < self.segments.len() - 1
                    && self.segments[segment_index].smooth()
                    && self.cubic_pair(segment_index, segment_index + 1)
                {
                    let next = segment_index + 1;
                    let [_, _, tangent, end] = self.segments[segment_index].handles();
                    let diff = tangent.delta(&end);
                    let [joint, _, _, _] = self.segments[next].handles();
                    self.set_handle_at(next, 1, joint.offset(&diff))?;
                }
            }
            3 => {
                if self.segments[segment_index].degree() == Degree::Cubic {
                    let [_, _, tangent, _] = self.segments[segment_index].handles();
                    if tangent.delta(&new_position).length() > follow_distance {
                        self.set_handle_at(segment_index, 2, tangent.offset(&delta))?;
                    }
                }
                if segment_index < self.segments.len() - 1 {
                    let next = segment_index + 1;
                    self.set_handle_at(next, 0, new_position)?;
                    if self.cubic_pair(segment_index, next) {
                        let [_, tangent, _, _] = self.segments[next].handles();
                        self.set_handle_at(next, 1, tangent.offset(&delta))?;
                    }
                }
            }
            _ => {}
        }
        self.recompute();
        Ok(())
    }

    fn cubic_pair(&self, a: usize, b: usize) -> bool {
        self.segments[a].degree() == Degree::Cubic && self.segments[b].degree() == Degree::Cubic
    }

    fn set_handle_at(
        &mut self,
        segment_index: usize,
        handle_index: usize,
        value: T,
    ) -> Result<(), ChainError> {
        self.segments[segment_index]
            .set_handle(handle_index, value)
            .map_err(|error| ChainError::Segment(segment_index, error))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        chain::{Chain, ChainError},
        segment::{Segment, SegmentError},
        Scalar,
    };
    use approx::assert_relative_eq;

    fn cubic_pair() -> Chain<(Scalar, Scalar)> {
        Chain::new(vec![
            Segment::cubic((0.0, 0.0), (1.0, 2.0), (3.0, 2.0), (4.0, 0.0)).unwrap(),
            Segment::cubic((4.0, 0.0), (5.0, -2.0), (7.0, -2.0), (8.0, 0.0)).unwrap(),
        ])
    }

    #[test]
    fn test_drag_start_anchor_propagates_backward() {
        let mut chain = cubic_pair();
        chain.drag_handle(1, 0, (4.5, 0.5), 0.0).unwrap();
        // Dragged anchor and forced joint are bit-for-bit equal.
        assert_eq!(*chain.segments()[1].start(), (4.5, 0.5));
        assert_eq!(*chain.segments()[0].end(), (4.5, 0.5));
        // Own start tangent and the previous end tangent ride along.
        assert_eq!(*chain.segments()[1].handle(1).unwrap(), (5.5, -1.5));
        assert_eq!(*chain.segments()[0].handle(2).unwrap(), (3.5, 2.5));
    }

    #[test]
    fn test_drag_end_anchor_propagates_forward() {
        let mut chain = cubic_pair();
        chain.drag_handle(0, 3, (4.5, 0.5), 0.0).unwrap();
        assert_eq!(*chain.segments()[0].end(), (4.5, 0.5));
        assert_eq!(*chain.segments()[1].start(), (4.5, 0.5));
        assert_eq!(*chain.segments()[0].handle(2).unwrap(), (3.5, 2.5));
        assert_eq!(*chain.segments()[1].handle(1).unwrap(), (5.5, -1.5));
    }

    #[test]
    fn test_smooth_mirror_backward() {
        let mut chain = cubic_pair();
        chain.set_smooth(1, true).unwrap();
        chain.drag_handle(1, 1, (5.5, -1.0), 0.0).unwrap();
        // diff = handles[1] - handles[0]; previous handles[2] = joint - diff.
        let diff = (5.5 - 4.0, -1.0 - 0.0);
        assert_eq!(
            *chain.segments()[0].handle(2).unwrap(),
            (4.0 - diff.0, 0.0 - diff.1)
        );
    }

    #[test]
    fn test_smooth_mirror_forward() {
        let mut chain = cubic_pair();
        chain.set_smooth(0, true).unwrap();
        chain.drag_handle(0, 2, (3.0, 1.0), 0.0).unwrap();
        // diff = handles[3] - handles[2]; next handles[1] = joint + diff.
        let diff = (4.0 - 3.0, 0.0 - 1.0);
        assert_eq!(
            *chain.segments()[1].handle(1).unwrap(),
            (4.0 + diff.0, 0.0 + diff.1)
        );
    }

    #[test]
    fn test_no_mirror_without_smooth() {
        let mut chain = cubic_pair();
        chain.drag_handle(1, 1, (5.5, -1.0), 0.0).unwrap();
        assert_eq!(*chain.segments()[0].handle(2).unwrap(), (3.0, 2.0));
        chain.drag_handle(0, 2, (3.0, 1.0), 0.0).unwrap();
        assert_eq!(*chain.segments()[1].handle(1).unwrap(), (5.0, -2.0));
    }

    #[test]
    fn test_mixed_degree_joint() {
        let mut chain = Chain::new(vec![
            Segment::linear((0.0, 0.0), (4.0, 0.0)).unwrap(),
            Segment::cubic((4.0, 0.0), (5.0, 2.0), (7.0, 2.0), (8.0, 0.0)).unwrap(),
        ]);
        chain.drag_handle(1, 0, (4.5, 0.5), 0.0).unwrap();
        // The linear neighbor only has its end anchor forced.
        assert_eq!(*chain.segments()[0].end(), (4.5, 0.5));
        assert_eq!(*chain.segments()[0].start(), (0.0, 0.0));
        // Own tangent still rides along.
        assert_eq!(*chain.segments()[1].handle(1).unwrap(), (5.5, 2.5));
    }

    #[test]
    fn test_grab_radius_gates_tangent_follow() {
        let mut chain = cubic_pair();
        chain.drag_handle(1, 0, (4.5, 0.5), 100.0).unwrap();
        // Own tangent sits well within 2 * grab_radius of the anchor, so it
        // stays put; the joint is still forced and the neighbor tangent shift
        // is not gated.
        assert_eq!(*chain.segments()[1].handle(1).unwrap(), (5.0, -2.0));
        assert_eq!(*chain.segments()[0].handle(2).unwrap(), (3.5, 2.5));
        assert_eq!(*chain.segments()[0].end(), (4.5, 0.5));
    }

    #[test]
    fn test_invalid_indices_fail_fast() {
        let mut chain = cubic_pair();
        assert!(matches!(
            chain.drag_handle(5, 0, (0.0, 0.0), 0.0),
            Err(ChainError::SegmentIndexOutOfRange(5))
        ));
        assert!(matches!(
            chain.drag_handle(0, 7, (0.0, 0.0), 0.0),
            Err(ChainError::Segment(0, SegmentError::InvalidHandleIndex(7)))
        ));

        let mut linear = Chain::new(vec![Segment::linear((0.0, 0.0), (1.0, 0.0)).unwrap()]);
        assert!(matches!(
            linear.drag_handle(0, 1, (0.5, 0.5), 0.0),
            Err(ChainError::Segment(0, SegmentError::InvalidHandleIndex(1)))
        ));
    }

    #[test]
    fn test_joint_coincidence_over_drag_sequence() {
        let mut chain = cubic_pair();
        chain.set_smooth(1, true).unwrap();
        chain.drag_handle(0, 0, (-0.5, 1.0), 0.0).unwrap();
        chain.drag_handle(0, 3, (4.25, -0.75), 0.0).unwrap();
        chain.drag_handle(1, 1, (5.0, -1.0), 0.0).unwrap();
        chain.drag_handle(1, 3, (9.0, 0.5), 0.0).unwrap();
        chain.drag_handle(1, 0, (4.0, -1.0), 0.0).unwrap();
        assert_eq!(chain.segments()[0].end(), chain.segments()[1].start());
    }

    #[test]
    fn test_drag_recomputes_lengths() {
        let mut chain = cubic_pair();
        chain.drag_handle(1, 3, (12.0, 3.0), 0.0).unwrap();
        let sum = chain
            .segments()
            .iter()
            .map(|segment| segment.length())
            .sum::<Scalar>();
        assert_relative_eq!(chain.total_length(), sum);
        assert_relative_eq!(
            chain.segments()[1].end_length(),
            chain.total_length()
        );
    }
}
