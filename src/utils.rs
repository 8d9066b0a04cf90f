use crate::{vector::Vector, Scalar};

/// Return iterator over uniformly spread samples of `steps` in 0 to 1 range.
pub fn factor_iter(steps: usize) -> impl Iterator<Item = Scalar> {
    (0..=steps).map(move |index| index as Scalar / steps as Scalar)
}

/// Linearly remap `value` from `from` range into `to` range.
pub fn remap(
    value: Scalar,
    from_start: Scalar,
    from_end: Scalar,
    to_start: Scalar,
    to_end: Scalar,
) -> Scalar {
    (value - from_start) / (from_end - from_start) * (to_end - to_start) + to_start
}

/// Return closest point to `point` on line segment between `from` and `to`,
/// clamped to the segment ends.
pub fn closest_point_on_line_segment<T>(from: &T, to: &T, point: &T) -> T
where
    T: Clone + Vector,
{
    let direction = from.delta(to);
    let length_squared = direction.length_squared();
    if length_squared > 0.0 {
        let factor = (from.delta(point).dot(&direction) / length_squared).clamp(0.0, 1.0);
        from.lerp(to, factor)
    } else {
        from.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_iter() {
        let factors = factor_iter(4).collect::<Vec<_>>();
        assert_eq!(factors, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_remap() {
        assert_eq!(remap(0.25, 0.0, 0.5, 0.0, 1.0), 0.5);
        assert_eq!(remap(5.0, 0.0, 10.0, -1.0, 1.0), 0.0);
    }

    #[test]
    fn test_closest_point_on_line_segment() {
        let from = (0.0, 0.0);
        let to = (10.0, 0.0);
        assert_eq!(closest_point_on_line_segment(&from, &to, &(3.0, 5.0)), (3.0, 0.0));
        assert_eq!(closest_point_on_line_segment(&from, &to, &(-4.0, 2.0)), (0.0, 0.0));
        assert_eq!(closest_point_on_line_segment(&from, &to, &(12.0, -1.0)), (10.0, 0.0));
        assert_eq!(closest_point_on_line_segment(&from, &from, &(3.0, 5.0)), from);
    }
}
