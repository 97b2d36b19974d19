use crate::abort_strategy::Verdict;
use crate::{KMeans, KMeansConfig, KMeansError, KMeansState, Primitive, Result};
use tracing::{debug, trace};

pub(crate) struct Lloyd<T> where T: Primitive {
	_p: std::marker::PhantomData<T>
}
impl<T> Lloyd<T> where T: Primitive {
    /// Move every centroid into the mean of the samples assigned to it. Centroids without any
    /// samples keep their previous position. Returns the amount of non-empty clusters.
    fn update_centroids(data: &KMeans<T>, state: &mut KMeansState<T>) -> usize {
        let sample_dims = data.sample_dims;
        // Sum all samples in a cluster together into new_centroids
        // Count non-empty clusters
        let mut used_centroids_cnt = 0;
        let mut new_centroids = vec![T::zero(); state.centroids.len()];

        let (centroid_frequency, assignments) = (&mut state.centroid_frequency, &state.assignments);
        rayon::scope(|s| {
            s.spawn(|_| {
				used_centroids_cnt = data.update_cluster_frequencies(assignments, centroid_frequency);
            });
            s.spawn(|_| {
                data.samples.chunks_exact(sample_dims)
                    .zip(assignments.iter().cloned())
                    .for_each(|(s, centroid_id)| {
                        new_centroids.iter_mut().skip(centroid_id * sample_dims).take(sample_dims)
                            .zip(s.iter())
                            .for_each(|(c, sv)| *c += sv);
                    });
            });
        });

        // Calculate new centroids from the sums, leaving empty clusters where they are
        state.centroids.chunks_exact_mut(sample_dims)
            .zip(new_centroids.chunks_exact(sample_dims))
            .zip(state.centroid_frequency.iter().cloned())
            .filter(|(_, cfreq)| *cfreq > 0)
            .for_each(|((c, nc), cfreq)| {
                let cfreq = T::from_count(cfreq);
                c.iter_mut().zip(nc.iter().cloned())
                    .for_each(|(cv, ncv)| *cv = ncv / cfreq);
            });
        used_centroids_cnt
    }

    #[inline(always)] pub fn calculate<'a, F>(data: &KMeans<T>, k: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        if k == 0 || k > data.sample_cnt {
            return Err(KMeansError::InvalidClusterCount { k, sample_cnt: data.sample_cnt });
        }

        let mut state = KMeansState::new(data.sample_cnt, data.sample_dims, k);
        state.distsum = T::infinity();

        // Initialize clusters and notify subscriber
        init(data, &mut state, config)?;
        (config.init_done)(&state);
        debug!(k, sample_cnt = data.sample_cnt, sample_dims = data.sample_dims, "lloyd: centroids initialized");
        let mut abort_strategy = config.abort_strategy.create_logic();

        let mut pass = 0;
        loop {
            pass += 1;
            let new_distsum = data.update_cluster_assignments(&mut state, None);
            let verdict = abort_strategy.next(&state.assignments);

            // Notify subscriber about finished assignment step
            (config.iteration_done)(&state, pass, new_distsum);
            trace!(pass, distsum = %new_distsum, ?verdict, "lloyd: assignment step done");
            state.distsum = new_distsum;

            match verdict {
                Verdict::Continue => {
                    let used_centroids_cnt = Self::update_centroids(data, &mut state);
                    if used_centroids_cnt != k {
                        trace!(pass, empty_clusters = k - used_centroids_cnt, "lloyd: empty clusters keep their centroids");
                    }
                    state.iterations += 1;
                },
                Verdict::Converged => {
                    state.converged = true;
                    break;
                },
                Verdict::IterationLimit => break,
            }
        }

        data.update_cluster_frequencies(&state.assignments, &mut state.centroid_frequency);
        debug!(k, iterations = state.iterations, converged = state.converged, distsum = %state.distsum, "lloyd: finished");
        Ok(state)
    }
}
