use crate::{KMeans, KMeansConfig, KMeansError, KMeansState, Primitive, Result};

#[inline(always)]
pub fn calculate<T: Primitive>(
    kmean: &KMeans<T>, state: &mut KMeansState<T>, _config: &KMeansConfig<'_, T>, computed: Vec<T>,
) -> Result<()> {
    let expected = state.k * kmean.sample_dims;
    if computed.len() != expected {
        return Err(KMeansError::InvalidCentroids { expected, actual: computed.len() });
    }
    state.centroids.copy_from_slice(&computed);
    Ok(())
}
