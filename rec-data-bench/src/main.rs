//! Benchmark runner for rec-data components

use rec_data_bench::{bench_ingest, bench_partition, bench_split, BenchConfig, BenchResult};

fn print_result(result: &BenchResult) {
    println!("\nBenchmark: {}", result.name);
    println!("  Total time:   {:?}", result.total_time);
    println!("  Average time: {:?}", result.avg_time);
    println!("  Min time:     {:?}", result.min_time);
    println!("  Max time:     {:?}", result.max_time);
    println!("  Throughput:   {:.2} rows/sec", result.throughput);
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== rec-data Benchmarks ===");

    let config = BenchConfig::default();
    print_result(&bench_ingest(&BenchConfig {
        rows: 200_000,
        ..config.clone()
    })?);
    print_result(&bench_partition(&config)?);
    print_result(&bench_split(&config)?);

    // Chunk capacity trades peak reallocation against chunk count
    println!("\n=== Chunk Size ===");
    for chunk_size in [1_000, 10_000, 100_000] {
        let config = BenchConfig {
            iterations: 3,
            warmup_iterations: 1,
            chunk_size,
            ..BenchConfig::default()
        };

        let result = bench_partition(&config)?;
        println!("\nChunk size: {}", chunk_size);
        println!("  Average time: {:?}", result.avg_time);
        println!("  Throughput:   {:.2} rows/sec", result.throughput);
    }

    // Bucket count drives the prefix pass
    println!("\n=== Cardinality ===");
    for users in [10, 1_000, 100_000] {
        let config = BenchConfig {
            iterations: 3,
            warmup_iterations: 1,
            users,
            ..BenchConfig::default()
        };

        let result = bench_partition(&config)?;
        println!("\nUsers: {}", users);
        println!("  Average time: {:?}", result.avg_time);
        println!("  Throughput:   {:.2} rows/sec", result.throughput);
    }

    Ok(())
}
