use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use partk::cli::{self, inverted_index, pmi, wordcount};
use partk::mapreduce::{Dataset, Specification, run_computation};

#[derive(Parser)]
#[command(name = "partk", about = "Parallel computation toolkit example jobs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Count word frequencies in a text file.
    Wordcount(JobArgs),
    /// Build a word -> sentence-id inverted index over a text file.
    InvertedIndex(JobArgs),
    /// Score adjacent word pairs in a text file by normalized PMI.
    Pmi(JobArgs),
}

#[derive(clap::Args)]
struct JobArgs {
    /// Input text file, one sentence per line.
    input: PathBuf,
    #[arg(long, default_value_t = 4)]
    mappers: usize,
    #[arg(long, default_value_t = 2)]
    reducers: usize,
    #[arg(long, default_value_t = 1)]
    sorters: usize,
    /// Registered partitioner name; defaults to hash(key) mod reducer_count.
    #[arg(long)]
    partitioner: Option<String>,
    /// Registered key-comparer name; defaults to byte-lexicographic order.
    #[arg(long)]
    comparer: Option<String>,
}

fn apply_common(mut spec: Specification, args: &JobArgs) -> Result<Specification> {
    spec = spec
        .with_mapper_count(args.mappers)?
        .with_reducer_count(args.reducers)?
        .with_sorter_count(args.sorters)?;
    if let Some(name) = &args.partitioner {
        spec = spec.with_partitioner(name.clone())?;
    }
    if let Some(name) = &args.comparer {
        spec = spec.with_comparer(name.clone())?;
    }
    Ok(spec)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    cli::register_all();

    let cli = Cli::parse();
    match cli.command {
        Command::Wordcount(args) => run_wordcount(args),
        Command::InvertedIndex(args) => run_inverted_index(args),
        Command::Pmi(args) => run_pmi(args),
    }
}

fn run_wordcount(args: JobArgs) -> Result<()> {
    let dataset = cli::read_sentences(&args.input)?;
    let spec = Specification::new()
        .with_mapper(wordcount::MAPPER_NAME)?
        .with_reducer(wordcount::REDUCER_NAME)?;
    let spec = apply_common(spec, &args)?.with_dataset(dataset);
    print_records(run_computation(&spec)?);
    Ok(())
}

fn run_inverted_index(args: JobArgs) -> Result<()> {
    let dataset = cli::read_sentences(&args.input)?;
    let spec = Specification::new()
        .with_mapper(inverted_index::MAPPER_NAME)?
        .with_reducer(inverted_index::REDUCER_NAME)?;
    let spec = apply_common(spec, &args)?.with_dataset(dataset);
    print_records(run_computation(&spec)?);
    Ok(())
}

fn run_pmi(args: JobArgs) -> Result<()> {
    let dataset = cli::read_sentences(&args.input)?;
    let sentence_count = dataset.size() as u64;

    let word_count_spec = Specification::new()
        .with_mapper(pmi::WORD_COUNT_MAPPER_NAME)?
        .with_reducer(pmi::WORD_COUNT_REDUCER_NAME)?;
    let word_count_spec = apply_common(word_count_spec, &args)?.with_dataset(dataset.clone());
    let word_counts = run_computation(&word_count_spec)?
        .into_iter()
        .map(|record| {
            let word = String::from_utf8_lossy(&record.key).into_owned();
            let count: u64 = String::from_utf8_lossy(&record.value).parse().unwrap_or(0);
            (word, count)
        })
        .collect();

    let context = pmi::PmiContext {
        word_counts,
        sentence_count,
    };
    let pair_spec = Specification::new()
        .with_mapper(pmi::PAIR_MAPPER_NAME)?
        .with_reducer(pmi::PAIR_REDUCER_NAME)?;
    let pair_spec = apply_common(pair_spec, &args)?
        .with_dataset(dataset)
        .with_user_data(std::sync::Arc::new(context));
    print_records(run_computation(&pair_spec)?);
    Ok(())
}

fn print_records(records: Vec<partk::mapreduce::Record>) {
    for record in records {
        println!(
            "{} -> {}",
            String::from_utf8_lossy(&record.key),
            String::from_utf8_lossy(&record.value)
        );
    }
}
