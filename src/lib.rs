//! # kcluster - API documentation
//!
//! kcluster is a small rust library for min-max normalization and k-means-clustering of
//! numeric samples.
//!
//! ## Design target
//! Samples are given using a raw row-major vector, instead of any high-level arithmetics / matrix
//! crate such as nalgebra or ndarray. The assignment step (the expensive part of each iteration) is
//! parallelized using rayon, while all results stay deterministic for a seeded random generator.
//!
//! ## Normalization
//! Dimensions with large absolute ranges dominate squared euclidean distances. [`MinMaxScaler`]
//! (or the shorthand [`normalize`]) rescales every dimension into `[0, 1]`, and maps results back
//! into the original units. [`KMeans::new_normalized`] does both steps at once.
//!
//! ## Supported variants
//! - Lloyd's algorithm, iterated until the cluster assignments reach a fixed point [`KMeans::kmeans_lloyd`]
//! - Best of multiple seeded Lloyd runs [`KMeans::kmeans_lloyd_multistart`]
//!
//! ## Supported centroid initializations
//! The outcome of each k-means run depends on the initialization of its clusters. For a list of
//! implemented initialization methods, see [`KMeans`].
//!
//! ## Supported primitive types
//! - [`f32`]
//! - [`f64`]
//!
//! ## Example
//! ```rust
//! use kcluster::*;
//! use rand::prelude::*;
//!
//! fn main() -> Result<()> {
//!     // Height [cm] and weight [kg] of six people
//!     let samples = vec![
//!         160.0f64, 55.0,  162.0, 58.0,  158.0, 52.0,
//!         185.0, 90.0,  190.0, 95.0,  188.0, 88.0,
//!     ];
//!     let (kmean, scaler) = KMeans::new_normalized(&samples, 6, 2)?;
//!
//!     let conf = KMeansConfig::build()
//!         .random_generator(StdRng::seed_from_u64(42))
//!         .build();
//!     let result = kmean.kmeans_lloyd(2, KMeans::init_kmeanplusplus, &conf)?;
//!
//!     assert!(result.converged);
//!     assert_eq!(result.assignments[0], result.assignments[2]);
//!     assert_ne!(result.assignments[0], result.assignments[3]);
//!     println!("Centroids: {:?}", scaler.inverse_transform(&result.centroids)?);
//!     println!("Iterations: {}", result.iterations);
//!     println!("WCSS: {}", result.distsum);
//!     Ok(())
//! }
//! ```
//!
//! ## Example (using the status event callbacks)
//! ```rust
//! use kcluster::*;
//!
//! fn main() -> Result<()> {
//!     let (sample_cnt, sample_dims, k) = (2000, 20, 4);
//!
//!     // Generate some random data
//!     let mut samples = vec![0.0f64;sample_cnt * sample_dims];
//!     samples.iter_mut().for_each(|v| *v = rand::random());
//!
//!     let conf = KMeansConfig::build()
//!         .init_done(&|_| println!("Initialization completed."))
//!         .iteration_done(&|s, nr, new_distsum|
//!             println!("Iteration {} - Error: {:.2} -> {:.2} | Improvement: {:.2}",
//!                 nr, s.distsum, new_distsum, s.distsum - new_distsum))
//!         .abort_strategy(AbortStrategy::MaxIterations { max_iter: 300 })
//!         .build();
//!
//!     let kmean = KMeans::new(samples, sample_cnt, sample_dims)?;
//!     let result = kmean.kmeans_lloyd(k, KMeans::init_random_sample, &conf)?;
//!
//!     println!("Cluster-Sizes: {:?}", result.centroid_frequency);
//!     println!("Error: {}", result.distsum);
//!     Ok(())
//! }
//! ```
//!
//! ## Short API-Overview / Description
//! Entry-point of the library is the [`KMeans`] struct. This struct is generic over the underlying primitive
//! type, that should be used for the calculations. To use KMeans, an instance of this struct is created, taking
//! over the sample data into its ownership.
//!
//! The [`KMeans`] struct's instance-methods represent the supported k-means variants. Calling such a method
//! (e.g. [`KMeans::kmeans_lloyd`]) on the struct does not mutate it, so multiple runs can be done in parallel.
//! Internally, a new instance of [`KMeansState`] is used to store the state (and finally the result) of a
//! k-means calculation.
//!
//! All fallible operations return [`Result`], with [`KMeansError`] describing what went wrong.
//!
//! ## Logging
//! The library emits [`tracing`] events (`debug` per run, `trace` per iteration). Install a
//! subscriber (e.g. `tracing-subscriber`) in the application to see them.

#[macro_use] mod helpers;
mod primitive;
mod error;
mod api;
mod normalize;
mod variants;
mod inits;
mod abort_strategy;

pub use abort_strategy::AbortStrategy;
pub use api::{KMeansState, KMeansConfig, KMeansConfigBuilder, KMeans, InitDoneCallbackFn, IterationDoneCallbackFn};
pub use error::{KMeansError, Result};
pub use normalize::{normalize, MinMaxScaler};
pub use primitive::Primitive;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::testing::assert_kmeans_result_eq;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::cell::RefCell;

    fn dataset() -> impl Strategy<Value = (Vec<f64>, usize, usize, usize)> {
        (1usize..4, 2usize..40)
            .prop_flat_map(|(sample_dims, sample_cnt)| (
                proptest::collection::vec(-100.0f64..100.0, sample_cnt * sample_dims),
                Just(sample_cnt),
                Just(sample_dims),
                1..=sample_cnt,
            ))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn lloyd_properties((samples, sample_cnt, sample_dims, k) in dataset(), seed in any::<u64>()) {
            let kmean = KMeans::new(samples, sample_cnt, sample_dims).unwrap();
            let history = RefCell::new(Vec::new());
            let iteration_done = |_: &KMeansState<f64>, _: usize, distsum: f64| history.borrow_mut().push(distsum);
            let conf = KMeansConfig::build()
                .iteration_done(&iteration_done)
                .random_generator(StdRng::seed_from_u64(seed))
                .abort_strategy(AbortStrategy::MaxIterations { max_iter: 1000 })
                .build();
            let res = kmean.kmeans_lloyd(k, KMeans::init_random_sample, &conf).unwrap();

            // Lloyd on a finite dataset always reaches a fixed point
            prop_assert!(res.converged);
            prop_assert!(res.iterations >= 1);
            prop_assert_eq!(history.borrow().len(), res.iterations + 1);

            // Every label is a valid cluster id, and the frequencies match the labels
            prop_assert_eq!(res.assignments.len(), sample_cnt);
            prop_assert!(res.assignments.iter().all(|&l| l < k));
            prop_assert_eq!(res.centroid_frequency.iter().sum::<usize>(), sample_cnt);
            prop_assert!(res.distsum >= 0.0);

            // The distance sum never grows from one assignment step to the next
            for w in history.borrow().windows(2) {
                prop_assert!(w[1] <= w[0] * (1.0 + 1e-9) + 1e-9, "distsum grew: {:?}", w);
            }
            prop_assert_eq!(history.borrow().last().cloned(), Some(res.distsum));

            // Assigning against the final centroids reproduces the final labels
            for (idx, &label) in res.assignments.iter().enumerate() {
                let (nearest, dist) = helpers::nearest_centroid(kmean.sample(idx), &res.centroids, k);
                prop_assert_eq!(nearest, label);
                prop_assert_eq!(dist, res.centroid_distances[idx]);
            }

            // Same seed, same result
            let again = kmean.kmeans_lloyd(k, KMeans::init_random_sample, &KMeansConfig::build()
                .random_generator(StdRng::seed_from_u64(seed))
                .abort_strategy(AbortStrategy::MaxIterations { max_iter: 1000 })
                .build()).unwrap();
            assert_kmeans_result_eq(&res, &again);
            prop_assert_eq!(&res.assignments, &again.assignments);
        }

        #[test]
        fn one_cluster_per_sample((samples, sample_cnt, sample_dims, _) in dataset(), seed in any::<u64>()) {
            prop_assume!(samples.chunks_exact(sample_dims)
                .enumerate()
                .all(|(i, a)| samples.chunks_exact(sample_dims).skip(i + 1).all(|b| a != b)));
            let kmean = KMeans::new(samples, sample_cnt, sample_dims).unwrap();
            let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(seed)).build();
            let res = kmean.kmeans_lloyd(sample_cnt, KMeans::init_random_sample, &conf).unwrap();
            prop_assert_eq!(res.distsum, 0.0);
            prop_assert_eq!(res.iterations, 1);
            prop_assert!(res.centroid_frequency.iter().all(|&f| f == 1));
        }
    }

    #[test]
    fn normalized_clustering_in_original_units() {
        // Second dimension is two orders of magnitude larger, and would dominate without normalization
        let samples = vec![
            0.0f64, 500.0,  0.1, 100.0,  0.2, 900.0,
            1.0, 520.0,  0.9, 130.0,  1.1, 880.0,
        ];
        let (kmean, scaler) = KMeans::new_normalized(&samples, 6, 2).unwrap();
        let res = kmean.kmeans_lloyd(2, KMeans::init_precomputed(vec![0.0, 0.5, 1.0, 0.5]), &KMeansConfig::default()).unwrap();

        assert!(res.converged);
        assert_eq!(res.assignments, vec![0, 0, 0, 1, 1, 1]);
        let centroids = scaler.inverse_transform(&res.centroids).unwrap();
        assert_approx_eq!(centroids[0], 0.1, 1e-9);
        assert_approx_eq!(centroids[1], 500.0, 1e-9);
        assert_approx_eq!(centroids[2], 1.0, 1e-9);
        assert_approx_eq!(centroids[3], 510.0, 1e-9);
    }

    #[test]
    fn complete_run_f32() {
        let mut rnd = StdRng::seed_from_u64(1337);
        let (sample_cnt, sample_dims, k) = (500, 8, 6);
        let mut samples = vec![0.0f32; sample_cnt * sample_dims];
        samples.iter_mut().for_each(|v| *v = rnd.gen_range(0.0..1.0));

        let kmean = KMeans::new(samples, sample_cnt, sample_dims).unwrap();
        let conf = KMeansConfig::build().random_generator(rnd).build();
        let res = kmean.kmeans_lloyd(k, KMeans::init_kmeanplusplus, &conf).unwrap();

        assert!(res.converged);
        assert_eq!(res.ensure_converged(), Ok(()));
        assert_eq!(res.centroids.len(), k * sample_dims);
        assert_eq!(res.centroid_frequency.iter().sum::<usize>(), sample_cnt);
        assert_approx_eq!(res.distsum, res.centroid_distances.iter().sum::<f32>(), 1e-3);
    }
}
