use crate::{KMeansError, Primitive, Result};

/// Validate that a row-major buffer of **len** values describes **sample_cnt** samples of **sample_dims** each.
pub(crate) fn check_shape(len: usize, sample_cnt: usize, sample_dims: usize) -> Result<()> {
	if sample_cnt == 0 || sample_dims == 0 {
		return Err(KMeansError::EmptyDataset { sample_cnt, sample_dims });
	}
	let expected = sample_cnt.checked_mul(sample_dims)
		.ok_or(KMeansError::ShapeMismatch { expected: usize::MAX, actual: len })?;
	if len != expected {
		return Err(KMeansError::ShapeMismatch { expected, actual: len });
	}
	Ok(())
}

#[inline(always)]
pub(crate) fn squared_distance<T: Primitive>(a: &[T], b: &[T]) -> T {
	a.iter().zip(b.iter())
		.map(|(&av, &bv)| av - bv)      // <sample> - <centroid>
		.map(|v| v * v)                  // <vec_components> ^2
		.sum()
}

/// Nearest of the first **k** centroids to **sample**, as `(centroid_idx, squared_distance)`.
/// Centroids are scanned in index order and only a strictly smaller distance replaces the
/// current best, so ties resolve to the lowest index.
#[inline(always)]
pub(crate) fn nearest_centroid<T: Primitive>(sample: &[T], centroids: &[T], k: usize) -> (usize, T) {
	centroids.chunks_exact(sample.len()).take(k)
		.map(|c| squared_distance(sample, c))
		.enumerate()
		.fold((0, T::infinity()), |(best_idx, best_dist), (idx, dist)| {
			if dist < best_dist { (idx, dist) } else { (best_idx, best_dist) }
		})
}

#[cfg(test)]
macro_rules! assert_approx_eq {
	($left: expr, $right: expr, $tol: expr) => ({
		match ($left, $right, $tol) {
			(left_val , right_val, tol_val) => {
				let delta = (left_val - right_val).abs();
				if !(delta < tol_val) {
					panic!(
						"assertion failed: `(left ≈ right)` \
						(left: `{}`, right: `{}`) \
						with ∆={:1.1e} (allowed ∆={:e})",
						left_val , right_val, delta, tol_val
					)
				}
			}
		}
	});
	($left: expr, $right: expr) => (assert_approx_eq!(($left), ($right), 1e-15))
}
