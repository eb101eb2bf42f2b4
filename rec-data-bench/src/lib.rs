//! Benchmarks for rec-data ingestion, partitioning and splitting

use std::fmt::Write;
use std::io::Cursor;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rec_data_core::split::{RandomSplitOptions, StratifiedRandomSplitter};
use rec_data_core::{ColumnOptions, DataSplitter, DataType, Partition, RawValue, Table, TableBuilder, TableSchema};
use rec_data_readers::csv::{CsvReaderOptions, CsvTableReader};

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Number of measured iterations
    pub iterations: usize,

    /// Warmup iterations
    pub warmup_iterations: usize,

    /// Number of interaction rows
    pub rows: usize,

    /// Number of distinct users
    pub users: usize,

    /// Number of distinct items
    pub items: usize,

    /// Values per column chunk
    pub chunk_size: usize,

    /// Seed of the synthetic data generator
    pub seed: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            warmup_iterations: 3,
            rows: 1_000_000,
            users: 10_000,
            items: 50_000,
            chunk_size: 10_000,
            seed: 42,
        }
    }
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchResult {
    /// Name of the benchmark
    pub name: String,

    /// Total time taken
    pub total_time: Duration,

    /// Average time per iteration
    pub avg_time: Duration,

    /// Min time per iteration
    pub min_time: Duration,

    /// Max time per iteration
    pub max_time: Duration,

    /// Throughput (rows/second)
    pub throughput: f64,
}

/// Run a benchmark
#[allow(clippy::cast_precision_loss)]
pub fn run_benchmark<F>(name: &str, config: &BenchConfig, func: F) -> anyhow::Result<BenchResult>
where
    F: Fn() -> anyhow::Result<()>,
{
    for _ in 0..config.warmup_iterations {
        func()?;
    }

    let iterations = config.iterations.max(1);
    let mut times = Vec::with_capacity(iterations);
    let start_total = Instant::now();

    for _ in 0..iterations {
        let start = Instant::now();
        func()?;
        times.push(start.elapsed());
    }

    let total_time = start_total.elapsed();
    let avg_time = times.iter().sum::<Duration>() / u32::try_from(times.len())?;
    let min_time = times.iter().min().copied().unwrap_or_default();
    let max_time = times.iter().max().copied().unwrap_or_default();
    let throughput = (iterations * config.rows) as f64 / total_time.as_secs_f64();

    Ok(BenchResult {
        name: name.to_string(),
        total_time,
        avg_time,
        min_time,
        max_time,
        throughput,
    })
}

/// Schema of the synthetic interaction data
pub fn interaction_schema() -> TableSchema {
    TableSchema::new()
        .discrete_field("user", DataType::Integer)
        .discrete_field("item", DataType::Integer)
        .continuous_field("rating", DataType::Float)
        .continuous_field("time", DataType::Integer)
}

/// Generate a table of random interactions
pub fn synthetic_table(config: &BenchConfig) -> anyhow::Result<Table> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
    let options = ColumnOptions {
        chunk_size: config.chunk_size,
    };
    let mut builder = TableBuilder::new(interaction_schema(), options)?;

    for row in 0..config.rows {
        builder.append_row(&[
            RawValue::Integer(i64::try_from(rng.gen_range(0..config.users))?),
            RawValue::Integer(i64::try_from(rng.gen_range(0..config.items))?),
            RawValue::Float(rng.gen_range(1.0..5.0)),
            RawValue::Integer(i64::try_from(row)?),
        ])?;
    }

    Ok(builder.build()?)
}

/// Generate random interactions as CSV text with a header row
pub fn synthetic_csv(config: &BenchConfig) -> anyhow::Result<String> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
    let mut csv = String::from("user,item,rating,time\n");

    for row in 0..config.rows {
        writeln!(
            csv,
            "{},{},{:.1},{}",
            rng.gen_range(0..config.users),
            rng.gen_range(0..config.items),
            rng.gen_range(1.0..5.0),
            row
        )?;
    }

    Ok(csv)
}

/// Time CSV ingestion of the synthetic data
pub fn bench_ingest(config: &BenchConfig) -> anyhow::Result<BenchResult> {
    let csv = synthetic_csv(config)?;
    let reader = CsvTableReader::new(
        interaction_schema(),
        CsvReaderOptions {
            column_options: ColumnOptions {
                chunk_size: config.chunk_size,
            },
            ..Default::default()
        },
    );

    run_benchmark("csv_ingest", config, || {
        reader.read(Cursor::new(csv.as_bytes()))?;
        Ok(())
    })
}

/// Time partitioning the synthetic table by user
pub fn bench_partition(config: &BenchConfig) -> anyhow::Result<BenchResult> {
    let table = synthetic_table(config)?;

    run_benchmark("partition_by_user", config, || {
        Partition::by_field(&table, "user")?;
        Ok(())
    })
}

/// Time a stratified random split of the synthetic table by user
pub fn bench_split(config: &BenchConfig) -> anyhow::Result<BenchResult> {
    let table = synthetic_table(config)?;
    let options = RandomSplitOptions {
        train_ratio: 0.8,
        seed: config.seed,
    };

    run_benchmark("stratified_split_by_user", config, || {
        let splitter = StratifiedRandomSplitter::new(&table, "user", options)?;
        anyhow::ensure!(splitter.size() == 1, "single fold expected");
        Ok(())
    })
}
