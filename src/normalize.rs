//! Min-max normalization of sample buffers.
//!
//! Every dimension is rescaled independently, using the minimum and maximum observed in that
//! dimension, so that the observed range maps onto `[0, 1]`. The clustering itself then works on
//! these unit-less values, which keeps dimensions with large absolute ranges from dominating the
//! squared distances.

use crate::{helpers, KMeansError, Primitive, Result};

/// Per-dimension bounds of a fitted sample buffer.
///
/// ## Example
/// ```rust
/// use kcluster::MinMaxScaler;
///
/// let samples = vec![1.0f64, 100.0, 3.0, 300.0, 2.0, 200.0];
/// let scaler = MinMaxScaler::fit(&samples, 3, 2).unwrap();
/// assert_eq!(scaler.transform(&samples).unwrap(), vec![0.0, 0.0, 1.0, 1.0, 0.5, 0.5]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MinMaxScaler<T: Primitive> {
    mins: Vec<T>,
    maxs: Vec<T>,
}
impl<T: Primitive> MinMaxScaler<T> {
    /// Determine per-dimension minimum and maximum of the given samples.
    ///
    /// ## Arguments
    /// - **samples**: Vector of samples [row-major] = [<sample0>,<sample1>,<sample2>,...]
    /// - **sample_cnt**: Amount of samples, contained in the passed **samples** vector
    /// - **sample_dims**: Amount of dimensions each sample from the **sample** vector has
    ///
    /// ## Errors
    /// - [`KMeansError::EmptyDataset`] / [`KMeansError::ShapeMismatch`] for a malformed buffer
    /// - [`KMeansError::DegenerateDimension`] if some dimension has the same value in every sample
    pub fn fit(samples: &[T], sample_cnt: usize, sample_dims: usize) -> Result<Self> {
        helpers::check_shape(samples.len(), sample_cnt, sample_dims)?;

        let mut mins = samples[..sample_dims].to_vec();
        let mut maxs = mins.clone();
        samples.chunks_exact(sample_dims).skip(1).for_each(|s| {
            mins.iter_mut().zip(maxs.iter_mut()).zip(s.iter().cloned())
                .for_each(|((min, max), v)| {
                    if v < *min { *min = v; }
                    if v > *max { *max = v; }
                });
        });

        if let Some(dimension) = mins.iter().zip(maxs.iter()).position(|(min, max)| min == max) {
            return Err(KMeansError::DegenerateDimension {
                dimension,
                value: mins[dimension].to_f64_lossy(),
            });
        }
        Ok(Self { mins, maxs })
    }

    /// Amount of dimensions this scaler was fitted on.
    pub fn sample_dims(&self) -> usize { self.mins.len() }
    /// Observed minimum per dimension.
    pub fn mins(&self) -> &[T] { &self.mins }
    /// Observed maximum per dimension.
    pub fn maxs(&self) -> &[T] { &self.maxs }

    /// Rescale **samples** (row-major, [`Self::sample_dims`] values per sample) into a new buffer.
    /// The fitted samples land in `[0, 1]`, other samples may fall outside of it.
    pub fn transform(&self, samples: &[T]) -> Result<Vec<T>> {
        self.check_buffer(samples)?;
        Ok(samples.chunks_exact(self.sample_dims())
            .flat_map(|s| {
                s.iter().cloned()
                    .zip(self.mins.iter().cloned().zip(self.maxs.iter().cloned()))
                    .map(|(v, (min, max))| scale(v, min, max))
            })
            .collect())
    }

    /// Map normalized values (e.g. centroids) back into the units of the fitted samples.
    pub fn inverse_transform(&self, samples: &[T]) -> Result<Vec<T>> {
        self.check_buffer(samples)?;
        Ok(samples.chunks_exact(self.sample_dims())
            .flat_map(|s| {
                s.iter().cloned()
                    .zip(self.mins.iter().cloned().zip(self.maxs.iter().cloned()))
                    .map(|(v, (min, max))| unscale(v, min, max))
            })
            .collect())
    }

    fn check_buffer(&self, samples: &[T]) -> Result<()> {
        let sample_dims = self.sample_dims();
        if samples.len() % sample_dims != 0 {
            let expected = samples.len() + sample_dims - samples.len() % sample_dims;
            return Err(KMeansError::ShapeMismatch { expected, actual: samples.len() });
        }
        Ok(())
    }
}

/// `(v - min) / (max - min)`. A range too wide for `T` (e.g. `-1e308..1e308` in f64) is taken
/// through halves, which keeps `min -> 0` and `max -> 1` exact.
#[inline(always)]
fn scale<T: Primitive>(v: T, min: T, max: T) -> T {
    let range = max - min;
    if range.is_finite() {
        (v - min) / range
    } else {
        let two = T::one() + T::one();
        (v / two - min / two) / (max / two - min / two)
    }
}

#[inline(always)]
fn unscale<T: Primitive>(v: T, min: T, max: T) -> T {
    let range = max - min;
    if range.is_finite() {
        v * range + min
    } else {
        let two = T::one() + T::one();
        (v * (max / two - min / two) + min / two) * two
    }
}

/// Min-max normalize **samples** in one go. Shorthand for [`MinMaxScaler::fit`] followed by
/// [`MinMaxScaler::transform`] on the same buffer.
pub fn normalize<T: Primitive>(samples: &[T], sample_cnt: usize, sample_dims: usize) -> Result<Vec<T>> {
    MinMaxScaler::fit(samples, sample_cnt, sample_dims)?.transform(samples)
}
