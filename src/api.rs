use crate::{helpers, AbortStrategy, KMeansError, MinMaxScaler, Primitive, Result};
use std::cell::RefCell;
use rayon::prelude::*;
use rand::prelude::*;

pub type InitDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>);
pub type IterationDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>, usize, T);

/// This is a structure holding various configuration options for a k-means calculation, such as
/// the random number generator to use, or a couple of callbacks, that can be set to get status information from
/// a running k-means calculation.
///
/// For a more detailed information about all possible options, have a look at [`KMeansConfigBuilder`].
pub struct KMeansConfig<'a, T: Primitive> {
    /// Callback that is called, when the initialization phase finished
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the initialization
    pub(crate) init_done: InitDoneCallbackFn<'a, T>,
    /// Callback that is called after each assignment step
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the assignment step
    /// - **pass**: Number of the assignment step (starting at 1)
    /// - **distsum**: New distance sum (**state** contains the distsum from the previous assignment step)
    pub(crate) iteration_done: IterationDoneCallbackFn<'a, T>,
    /// Random number generator to use
    pub(crate) rnd: Box<RefCell<dyn RngCore>>,
    /// The abort-strategy to use for the running calculation
    pub(crate) abort_strategy: AbortStrategy
}
impl<'a, T: Primitive> Default for KMeansConfig<'a, T> {
    fn default() -> Self {
        Self {
            init_done: &|_| {},
            iteration_done: &|_,_,_| {},
            rnd: Box::new(RefCell::new(rand::thread_rng())),
            abort_strategy: AbortStrategy::default()
        }
    }
}
impl<'a, T: Primitive> KMeansConfig<'a, T> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<'a, T> {
        KMeansConfigBuilder { config: KMeansConfig::default() }
    }
}
impl<'a, T: Primitive> std::fmt::Debug for KMeansConfig<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KMeansConfig")
            .field("abort_strategy", &self.abort_strategy)
            .finish_non_exhaustive()
    }
}

pub struct KMeansConfigBuilder<'a, T: Primitive> {
    config: KMeansConfig<'a, T>
}
impl<'a, T: Primitive> KMeansConfigBuilder<'a, T> {
    /// Set the callback that should be called after the centroid initialization, before the iteration starts.
    pub fn init_done(mut self, init_done: InitDoneCallbackFn<'a, T>) -> Self {
        self.config.init_done = init_done; self
    }
    /// Set the callback that should be called after each assignment step during a running k-means calculation.
    pub fn iteration_done(mut self, iteration_done: IterationDoneCallbackFn<'a, T>) -> Self {
        self.config.iteration_done = iteration_done; self
    }
    /// Set the random number generator that should be used in the k-means calculation.
    /// Use a seeded generator for deterministically repeatable results.
    pub fn random_generator<R: RngCore + 'static>(mut self, rnd: R) -> Self {
        self.config.rnd = Box::new(RefCell::new(rnd)); self
    }
    /// Set the abort-strategy to use during a running k-means calculation. For more information,
    /// see documentation of [`AbortStrategy`].
    /// ## Default
    /// [`AbortStrategy::UntilStable`]
    pub fn abort_strategy(mut self, abort_strategy: AbortStrategy) -> Self {
        self.config.abort_strategy = abort_strategy; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<'a, T> { self.config }
}


/// This is the internally used data-structure, storing the current state during calculation, as
/// well as the final result, as returned by the API.
/// All mutations are done in this structure, making [`KMeans`] immutable, and therefore allowing
/// it to be used in parallel, without having to duplicate the input-data.
///
/// ## Generics
/// - **T**: Underlying primitive type that was used for the calculation
///
/// ## Fields
/// - **k**: The amount of clusters that were requested when calculating this k-means result
/// - **distsum**: The total sum of squared distances from all samples to their respective centroids (WCSS)
/// - **centroids**: Calculated cluster centers [row-major] = [<centroid0>,<centroid1>,<centroid2>,...]
/// - **centroid_frequency**: Amount of samples in each cluster (`0` for a cluster that ended up empty)
/// - **assignments**: Vector mapping each sample to its respective nearest cluster
/// - **centroid_distances**: Vector containing each sample's squared distance to its centroid
/// - **iterations**: Amount of centroid updates that were done. The assignment step that finds the assignments
///   unchanged does not count, so this is the amount of assignment steps minus one (`1` for a run that is
///   stable right after the first update)
/// - **converged**: Whether the assignments reached a fixed point (`false` if an iteration cap stopped the calculation)
#[derive(Clone, Debug)]
pub struct KMeansState<T: Primitive> {
    pub k: usize,
    pub distsum: T,
    pub centroids: Vec<T>,
    pub centroid_frequency: Vec<usize>,
    pub assignments: Vec<usize>,
    pub centroid_distances: Vec<T>,
    pub iterations: usize,
    pub converged: bool,

    pub(crate) sample_dims: usize
}
impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(sample_cnt: usize, sample_dims: usize, k: usize) -> Self {
        Self {
            k,
            distsum: T::zero(),
            centroids: vec![T::zero();sample_dims * k],
            centroid_frequency: vec![0usize;k],
            assignments: vec![0usize;sample_cnt],
            centroid_distances: vec![T::infinity();sample_cnt],
            iterations: 0,
            converged: false,
            sample_dims
        }
    }
    pub(crate) fn set_centroid_from_iter(&mut self, idx: usize, src: impl Iterator<Item = T>) {
        self.centroids.iter_mut().skip(self.sample_dims * idx).take(self.sample_dims)
                .zip(src)
                .for_each(|(c,s)| *c = s);
    }

    /// Coordinates of the centroid with the given cluster id.
    pub fn centroid(&self, idx: usize) -> &[T] {
        &self.centroids[(idx * self.sample_dims)..((idx + 1) * self.sample_dims)]
    }

    /// Amount of clusters that have at least one sample assigned. Can be lower than **k**, since
    /// a centroid that is never the nearest one to any sample stays in place, with no members.
    pub fn populated_clusters(&self) -> usize {
        self.centroid_frequency.iter().filter(|&&f| f > 0).count()
    }

    /// Turn an iteration-capped result into an error.
    /// ## Errors
    /// [`KMeansError::DidNotConverge`] if the calculation was stopped before reaching a fixed point.
    pub fn ensure_converged(&self) -> Result<()> {
        if self.converged {
            Ok(())
        } else {
            Err(KMeansError::DidNotConverge { iterations: self.iterations })
        }
    }
}




/// Entrypoint of this crate's API-Surface.
///
/// Create an instance of this struct, giving the samples you want to operate on. The primitive type
/// of the passed samples array will be the type used internaly for all calculations, as well as the result
/// as stored in the returned [`KMeansState`] structure.
///
/// ## Supported variants
/// - k-Means clustering (Lloyd) [`KMeans::kmeans_lloyd`]
/// - Best of multiple independently seeded Lloyd runs [`KMeans::kmeans_lloyd_multistart`]
///
/// ## Supported initialization methods
/// - Random-Sample [`KMeans::init_random_sample`]
/// - Precomputed centroids [`KMeans::init_precomputed`]
/// - K-Mean++ [`KMeans::init_kmeanplusplus`]
#[derive(Clone, Debug)]
pub struct KMeans<T: Primitive> {
    pub(crate) sample_cnt: usize,
    pub(crate) sample_dims: usize,
    pub(crate) samples: Vec<T>
}
impl<T: Primitive> KMeans<T> {
    /// Create a new instance of the [`KMeans`] structure.
    ///
    /// ## Arguments
    /// - **samples**: Vector of samples [row-major] = [<sample0>,<sample1>,<sample2>,...]
    /// - **sample_cnt**: Amount of samples, contained in the passed **samples** vector
    /// - **sample_dims**: Amount of dimensions each sample from the **sample** vector has
    ///
    /// ## Errors
    /// [`KMeansError::EmptyDataset`] or [`KMeansError::ShapeMismatch`] for a malformed buffer.
    pub fn new(samples: Vec<T>, sample_cnt: usize, sample_dims: usize) -> Result<Self> {
        helpers::check_shape(samples.len(), sample_cnt, sample_dims)?;
        Ok(Self { sample_cnt, sample_dims, samples })
    }

    /// Create a new instance from nested rows, one row per sample.
    ///
    /// ## Errors
    /// [`KMeansError::RaggedRow`] if a row's length differs from the first row's length,
    /// [`KMeansError::EmptyDataset`] if there are no rows, or the rows are empty.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        let sample_dims = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut samples = Vec::with_capacity(rows.len() * sample_dims);
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != sample_dims {
                return Err(KMeansError::RaggedRow { row, expected: sample_dims, actual: r.len() });
            }
            samples.extend_from_slice(r);
        }
        Self::new(samples, rows.len(), sample_dims)
    }

    /// Min-max normalize the given samples (see [`MinMaxScaler`]) and create a new instance of the
    /// [`KMeans`] structure operating on the normalized samples.
    /// The returned scaler can be used to map resulting centroids back into the original units.
    ///
    /// ## Errors
    /// See [`MinMaxScaler::fit`].
    pub fn new_normalized(samples: &[T], sample_cnt: usize, sample_dims: usize) -> Result<(Self, MinMaxScaler<T>)> {
        let scaler = MinMaxScaler::fit(samples, sample_cnt, sample_dims)?;
        let normalized = scaler.transform(samples)?;
        Ok((Self::new(normalized, sample_cnt, sample_dims)?, scaler))
    }

    /// Amount of samples
    pub fn sample_cnt(&self) -> usize { self.sample_cnt }
    /// Amount of dimensions per sample
    pub fn sample_dims(&self) -> usize { self.sample_dims }
    /// The sample with the given index
    pub fn sample(&self, idx: usize) -> &[T] {
        &self.samples[(idx * self.sample_dims)..((idx + 1) * self.sample_dims)]
    }


    /// Assign every sample to its nearest centroid (from the first **limit_k** centroids, or all of them),
    /// store the squared distances and return their sum.
    pub(crate) fn update_cluster_assignments(&self, state: &mut KMeansState<T>, limit_k: Option<usize>) -> T {
        let centroids = &state.centroids;
        let k = limit_k.unwrap_or(state.k);

        // manually calculate work-packet size, because rayon does not do static scheduling (which is more apropriate here)
        let work_packet_size = (self.sample_cnt / rayon::current_num_threads()).max(1);
        self.samples.par_chunks_exact(self.sample_dims)
            .with_min_len(work_packet_size)
            .zip(state.assignments.par_iter_mut())
            .zip(state.centroid_distances.par_iter_mut())
            .for_each(|((s, assignment), centroid_dist)| {
                let (best_idx, best_dist) = helpers::nearest_centroid(s, centroids, k);
                *assignment = best_idx;
                *centroid_dist = best_dist;
            });
        // sequential, so that the sum does not depend on the thread scheduling
        state.centroid_distances.iter().cloned().sum()
    }

    pub(crate) fn update_cluster_frequencies(&self, assignments: &[usize], centroid_frequency: &mut[usize]) -> usize {
        centroid_frequency.iter_mut().for_each(|v| *v = 0);
        let mut used_centroids_cnt = 0;
        assignments.iter().cloned()
            .for_each(|centroid_id| {
                if centroid_frequency[centroid_id] == 0 {
                    used_centroids_cnt += 1; // Count the amount of centroids with more than 0 samples
                }
                centroid_frequency[centroid_id] += 1;
            });
        used_centroids_cnt
    }



    /// Normal K-Means algorithm implementation (Lloyd's algorithm).
    ///
    /// Every iteration assigns each sample to its nearest centroid (squared euclidean distance, ties
    /// resolved to the lower cluster id), and then moves each centroid into the mean of its samples.
    /// Centroids without samples are left where they are. The calculation ends, when an assignment step
    /// reproduces the assignments of the previous one.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for (`1..=sample_cnt`)
    /// - **init**: Initialization-Method to use for the initialization of the **k** centroids
    /// - **config**: [`KMeansConfig`] instance, containing several configuration options for the calculation.
    ///
    /// ## Returns
    /// Instance of [`KMeansState`], containing the final state (result).
    ///
    /// ## Errors
    /// - [`KMeansError::InvalidClusterCount`] for `k == 0` or `k > sample_cnt` (before **init** is called)
    /// - Any error returned by **init**
    ///
    /// ## Example
    /// ```rust
    /// use kcluster::*;
    /// fn main() -> Result<()> {
    ///     let (sample_cnt, sample_dims, k) = (2000, 20, 4);
    ///
    ///     // Generate some random data
    ///     let mut samples = vec![0.0f64;sample_cnt * sample_dims];
    ///     samples.iter_mut().for_each(|v| *v = rand::random());
    ///
    ///     // Calculate kmeans, using random samples as initial centroids
    ///     let (kmean, _) = KMeans::new_normalized(&samples, sample_cnt, sample_dims)?;
    ///     let result = kmean.kmeans_lloyd(k, KMeans::init_random_sample, &KMeansConfig::default())?;
    ///
    ///     println!("Centroids: {:?}", result.centroids);
    ///     println!("Cluster-Assignments: {:?}", result.assignments);
    ///     println!("Iterations: {}", result.iterations);
    ///     println!("Error: {}", result.distsum);
    ///     Ok(())
    /// }
    /// ```
    pub fn kmeans_lloyd<'a, F>(&self, k: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        crate::variants::Lloyd::calculate(self, k, init, config)
    }

    /// Run [`KMeans::kmeans_lloyd`] **runs** times in parallel and return the result with the lowest
    /// distance sum. Run `i` uses a `StdRng` seeded with `seed + i`, so the overall outcome is
    /// reproducible. At least one run is always done. Ties are resolved to the lower run number.
    ///
    /// ## Errors
    /// An error produced by any of the runs, e.g. [`KMeansError::InvalidClusterCount`].
    pub fn kmeans_lloyd_multistart<F>(&self, k: usize, runs: usize, seed: u64, abort_strategy: AbortStrategy, init: F) -> Result<KMeansState<T>>
                where F: for<'c> Fn(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> + Sync {
        let single_run = |run: usize| {
            let conf = KMeansConfig::build()
                .random_generator(rand::rngs::StdRng::seed_from_u64(seed.wrapping_add(run as u64)))
                .abort_strategy(abort_strategy)
                .build();
            self.kmeans_lloyd(k, &init, &conf)
        };
        // Run 0 always happens, the remaining runs are compared against it
        let (first, rest) = rayon::join(
            || single_run(0),
            || (1..runs).into_par_iter().map(&single_run).collect::<Result<Vec<_>>>()
        );
        let (first, rest) = (first?, rest?);

        Ok(rest.into_iter()
            .fold(first, |best, state| if state.distsum < best.distsum { state } else { best }))
    }

    /// Random sample initialization method (a.k.a. Forgy)
    ///
    /// ## Description
    /// This initialization method selects k distinct samples uniformly at random (without replacement)
    /// as initial centroids.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_random_sample(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
        crate::inits::randomsample::calculate(kmean, state, config)
    }

    /// Precomputed initialization method
    ///
    /// ## Description
    /// Uses the given centroids [row-major] = [<centroid0>,<centroid1>,...] as initial centroids.
    /// This bypasses all randomness, making the whole calculation deterministic.
    ///
    /// ## Errors
    /// The returned initialization method fails with [`KMeansError::InvalidCentroids`], if the
    /// given centroids do not contain exactly `k * sample_dims` values.
    pub fn init_precomputed(centroids: Vec<T>) -> impl FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'_, T>) -> Result<()> {
        move |kmean, state, config| {
            crate::inits::precomputed::calculate(kmean, state, config, centroids)
        }
    }

    /// K-Mean++ initialization method
    ///
    /// ## Description
    /// This initialization method starts by selecting one sample as first centroid.
    /// Proceeding from there, the method iteratively selects one new centroid (per iteration) by calculating
    /// each sample's probability of "being a centroid". This probability is bigger, the farther away a sample
    /// is from its nearest centroid. Then, one sample is randomly selected, while taking their probability of being
    /// the next centroid into account.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_kmeanplusplus(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
        crate::inits::kmeanplusplus::calculate(kmean, state, config)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::testing::two_blobs;

    #[test]
    fn cluster_assignments() {
        calculate_cluster_assignments_multiplex(1);
        calculate_cluster_assignments_multiplex(2);
        calculate_cluster_assignments_multiplex(3);
        calculate_cluster_assignments_multiplex(17);
        calculate_cluster_assignments_multiplex(100);
    }

    fn calculate_cluster_assignments_multiplex(sample_dims: usize) {
        calculate_cluster_assignments::<f64>(sample_dims, 1e-10f64);
        calculate_cluster_assignments::<f32>(sample_dims, 1e-5f32);
    }

    fn calculate_cluster_assignments<T: Primitive>(sample_dims: usize, max_diff: T) {
        let sample_cnt = 1000;
        let k = 5;

        let mut rnd = rand::rngs::StdRng::seed_from_u64(1337);
        let mut samples = vec![T::zero();sample_cnt * sample_dims];
        samples.iter_mut().for_each(|i| *i = rnd.gen_range(T::zero()..T::one()));

        let kmean = KMeans::new(samples, sample_cnt, sample_dims).unwrap();

        let mut state = KMeansState::new(kmean.sample_cnt, kmean.sample_dims, k);
        state.centroids.iter_mut()
            .zip(kmean.samples.iter())
            .for_each(|(c,s)| *c = *s);

        // calculate distances using method that (hopefully) works.
        let mut should_assignments = state.assignments.clone();
        let mut should_centroid_distances = state.centroid_distances.clone();
        kmean.samples.chunks_exact(kmean.sample_dims)
            .zip(should_assignments.iter_mut())
            .zip(should_centroid_distances.iter_mut())
            .for_each(|((s, assignment), centroid_dist)| {
                let (best_idx, best_dist) = state.centroids
                    .chunks_exact(kmean.sample_dims)
                    .map(|c| {
                        s.iter().cloned().zip(c.iter().cloned())
                            .map(|(sv,cv)| sv - cv)
                            .map(|v| v * v)
                            .sum::<T>()
                    })
                    .enumerate()
                    .min_by(|(_,d0), (_,d1)| d0.partial_cmp(d1).unwrap())
                    .unwrap();
                *assignment = best_idx;
                *centroid_dist = best_dist;
            });
        let should_distsum: T = should_centroid_distances.iter().cloned().sum();

        // calculate distances using the parallel code
        let distsum = kmean.update_cluster_assignments(&mut state, None);

        for i in 0..should_assignments.len() {
            assert_approx_eq!(state.centroid_distances[i], should_centroid_distances[i], max_diff);
        }
        assert_eq!(state.assignments, should_assignments);
        assert_eq!(distsum, should_distsum);
    }

    #[test]
    fn ties_resolve_to_lowest_cluster() {
        let kmean = KMeans::new(vec![1.0f64, 0.0, 2.0, 3.0], 4, 1).unwrap();
        let mut state = KMeansState::new(4, 1, 3);
        state.centroids = vec![0.0, 2.0, 2.0];
        let distsum = kmean.update_cluster_assignments(&mut state, None);
        // 1.0 is equally far from 0.0 and 2.0, 2.0 and 3.0 sit on / nearest to both copies of 2.0
        assert_eq!(state.assignments, vec![0, 0, 1, 1]);
        assert_eq!(state.centroid_distances, vec![1.0, 0.0, 0.0, 1.0]);
        assert_eq!(distsum, 2.0);
    }

    #[test]
    fn cluster_frequencies() {
        let kmean = KMeans::new(two_blobs(), 4, 2).unwrap();
        let mut frequency = vec![7usize; 3];
        assert_eq!(kmean.update_cluster_frequencies(&[2, 0, 2, 2], &mut frequency), 2);
        assert_eq!(frequency, vec![1, 0, 3]);
    }

    #[test]
    fn construction() {
        let kmean = KMeans::new(two_blobs(), 4, 2).unwrap();
        assert_eq!((kmean.sample_cnt(), kmean.sample_dims()), (4, 2));
        assert_eq!(kmean.sample(3), &[10.0, 11.0]);

        assert_eq!(
            KMeans::new(two_blobs(), 3, 2).unwrap_err(),
            KMeansError::ShapeMismatch { expected: 6, actual: 8 }
        );
        assert_eq!(
            KMeans::<f64>::new(vec![], 0, 2).unwrap_err(),
            KMeansError::EmptyDataset { sample_cnt: 0, sample_dims: 2 }
        );

        let from_rows = KMeans::from_rows(&[vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 10.0], vec![10.0, 11.0]]).unwrap();
        assert_eq!(from_rows.samples, two_blobs());
        assert_eq!(
            KMeans::from_rows(&[vec![0.0f64, 0.0], vec![1.0]]).unwrap_err(),
            KMeansError::RaggedRow { row: 1, expected: 2, actual: 1 }
        );
        assert_eq!(
            KMeans::<f32>::from_rows::<Vec<f32>>(&[]).unwrap_err(),
            KMeansError::EmptyDataset { sample_cnt: 0, sample_dims: 0 }
        );
    }

    #[test]
    fn construction_normalized() {
        let (kmean, scaler) = KMeans::new_normalized(&two_blobs(), 4, 2).unwrap();
        assert_eq!(kmean.samples, vec![0.0, 0.0, 0.0, 1.0 / 11.0, 1.0, 10.0 / 11.0, 1.0, 1.0]);
        assert_eq!(scaler.maxs(), &[10.0, 11.0]);
        assert_eq!(
            KMeans::new_normalized(&[1.0f64, 2.0, 1.0, 3.0], 2, 2).unwrap_err(),
            KMeansError::DegenerateDimension { dimension: 0, value: 1.0 }
        );
    }

    #[test]
    fn state_helpers() {
        let mut state = KMeansState::<f64>::new(4, 2, 3);
        state.set_centroid_from_iter(1, [4.0, 5.0].iter().cloned());
        assert_eq!(state.centroid(1), &[4.0, 5.0]);
        assert_eq!(state.centroids, vec![0.0, 0.0, 4.0, 5.0, 0.0, 0.0]);

        state.centroid_frequency = vec![3, 0, 1];
        assert_eq!(state.populated_clusters(), 2);

        state.iterations = 7;
        assert_eq!(state.ensure_converged(), Err(KMeansError::DidNotConverge { iterations: 7 }));
        state.converged = true;
        assert_eq!(state.ensure_converged(), Ok(()));
    }
}
