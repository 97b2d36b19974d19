use kcluster::*;
use rand::prelude::*;

fn main() -> Result<()> {
    let (sample_cnt, sample_dims, k) = (20000, 3, 4);

    // Generate some random data, with one dimension in a much larger unit than the others
    let mut rnd = StdRng::seed_from_u64(1337);
    let mut samples = vec![0.0f64;sample_cnt * sample_dims];
    samples.chunks_exact_mut(sample_dims).for_each(|s| {
        s[0] = rnd.gen_range(0.0..1.0);
        s[1] = rnd.gen_range(0.0..1.0);
        s[2] = rnd.gen_range(0.0..5000.0);
    });

    // Normalize, then calculate kmeans, using random samples as initial centroids
    let (kmean, scaler) = KMeans::new_normalized(&samples, sample_cnt, sample_dims)?;
    let conf = KMeansConfig::build().random_generator(rnd).build();
    let result = kmean.kmeans_lloyd(k, KMeans::init_random_sample, &conf)?;

    for (idx, freq) in result.centroid_frequency.iter().enumerate() {
        println!("Cluster {}: {} samples", idx + 1, freq);
    }
    println!("Iterations: {}", result.iterations);
    println!("WCSS: {}", result.distsum);

    let centroids = scaler.inverse_transform(&result.centroids)?;
    for (idx, c) in centroids.chunks_exact(sample_dims).enumerate() {
        println!("Centroid {}: {:?}", idx + 1, c);
    }
    Ok(())
}
