// Evaluate the most recent samples in a database and print the dashboard as JSON.
//
// Usage: cargo run --example dump_dashboard -- [DB_PATH] [LIMIT]
//   DB_PATH  default: ./data/stations.db
//   LIMIT    default: 5000

use stationhealth::catalog::Catalog;
use stationhealth::pipeline;
use stationhealth::sample_repo::SampleRepo;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let path = args
        .get(1)
        .map(String::as_str)
        .unwrap_or("./data/stations.db");
    let limit: u32 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(5000);

    let repo = SampleRepo::connect(path, 1).await?;
    repo.init().await?;
    let stations = repo.list_stations().await?;
    let samples = repo.recent_samples(limit).await?;

    let merged = pipeline::merge(&samples, &[]);
    let snapshot = pipeline::evaluate(&stations, &merged, &Catalog::default());

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
