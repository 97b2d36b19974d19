use crate::{KMeans, KMeansConfig, KMeansState, Primitive, Result};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use std::ops::DerefMut;

#[inline(always)]
pub fn calculate<T: Primitive>(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
    {
        // Randomly select first centroid
        let first_idx = config.rnd.borrow_mut().gen_range(0..kmean.sample_cnt);
        state.set_centroid_from_iter(0, kmean.sample(first_idx).iter().cloned());
    }
    for k in 1..state.k {
        // For each following centroid...
        // Calculate distances & update cluster-assignments
        kmean.update_cluster_assignments(state, Some(k));

        // Use rand's WeightedIndex to randomly draw a centroid, while respecting their (squared) distances.
        // Fails only when every sample already sits on a centroid, then any sample is as good as another.
        let sampled_centroid_id = match WeightedIndex::new(state.centroid_distances.iter().cloned()) {
            Ok(centroid_index) => centroid_index.sample(config.rnd.borrow_mut().deref_mut()),
            Err(_) => config.rnd.borrow_mut().gen_range(0..kmean.sample_cnt),
        };
        state.set_centroid_from_iter(k, kmean.sample(sampled_centroid_id).iter().cloned());
    }
    Ok(())
}
