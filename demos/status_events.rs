use kcluster::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RUST_LOG=kcluster=trace shows every assignment step
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kcluster=debug")))
        .init();

    let (sample_cnt, sample_dims, k, max_iter) = (20000, 200, 4, 2500);

    // Generate some random data
    let mut samples = vec![0.0f64;sample_cnt * sample_dims];
    samples.iter_mut().for_each(|v| *v = rand::random());

    let conf = KMeansConfig::build()
        .init_done(&|_| println!("Initialization completed."))
        .iteration_done(&|s, nr, new_distsum|
            println!("Iteration {} - Error: {:.2} -> {:.2} | Improvement: {:.2}",
                nr, s.distsum, new_distsum, s.distsum - new_distsum))
        .abort_strategy(AbortStrategy::MaxIterations { max_iter })
        .build();

    // Calculate kmeans, using kmean++ as initialization-method
    let kmean = KMeans::new(samples, sample_cnt, sample_dims)?;
    let result = kmean.kmeans_lloyd(k, KMeans::init_kmeanplusplus, &conf)?;
    result.ensure_converged()?;

    println!("Cluster-Sizes: {:?}", result.centroid_frequency);
    println!("Error: {}", result.distsum);
    Ok(())
}
