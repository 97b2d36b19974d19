use crate::{KMeans, KMeansConfig, KMeansState, Primitive, Result};
use rand::prelude::*;
use std::ops::DerefMut;

#[inline(always)] pub fn calculate<T: Primitive>(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
	rand::seq::index::sample(config.rnd.borrow_mut().deref_mut(), kmean.sample_cnt, state.k)
		.into_iter()
		.enumerate()
		.for_each(|(ci, si)| { // Copy randomly chosen samples into state.centroids
			state.set_centroid_from_iter(ci, kmean.sample(si).iter().cloned());
		});
	Ok(())
}
