use kcluster::*;
use rand::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Five blobs in the plane
    let mut rnd = StdRng::seed_from_u64(7);
    let centers = [[0.0, 0.0], [4.0, 0.0], [0.0, 4.0], [4.0, 4.0], [2.0, 2.0]];
    let rows: Vec<[f64; 2]> = centers.iter()
        .flat_map(|c| (0..400).map(move |_| *c).collect::<Vec<_>>())
        .map(|[x, y]| [x + rnd.gen_range(-0.8..0.8), y + rnd.gen_range(-0.8..0.8)])
        .collect();
    let kmean = KMeans::from_rows(&rows)?;

    for runs in [1, 4, 16] {
        let result = kmean.kmeans_lloyd_multistart(centers.len(), runs, 42, AbortStrategy::UntilStable, KMeans::init_random_sample)?;
        println!("{:>2} runs - WCSS: {:.3} | Cluster-Sizes: {:?}", runs, result.distsum, result.centroid_frequency);
    }
    Ok(())
}
