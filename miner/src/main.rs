use clap::Parser;
use miner::{Miner, MinerError};
use threadmine_core::Blockchain;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Mine a proof-of-work blockchain with concurrent workers.
#[derive(Debug, Parser)]
#[command(name = "threadmine", version)]
struct Args {
    /// Number of mining worker threads
    #[arg(long, env = "THREADMINE_THREADS", default_value_t = num_cpus::get())]
    threads: usize,

    /// Required number of leading zero hex digits in a block hash
    #[arg(long, env = "THREADMINE_DIFFICULTY", default_value_t = 4)]
    difficulty: u8,

    /// How many blocks to mine on top of the genesis block
    #[arg(long, default_value_t = 1)]
    blocks: u64,

    /// Payload stored in each mined block
    #[arg(long, default_value = "ConcurrentBlock")]
    data: String,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("miner failed: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), MinerError> {
    let mut chain = Blockchain::with_difficulty(args.difficulty)?;
    let miner = Miner::new(args.threads, args.difficulty)?;

    for sequence in 1..=args.blocks {
        let data = if args.blocks == 1 {
            args.data.clone()
        } else {
            format!("{} #{}", args.data, sequence)
        };
        let candidate = chain.next_candidate(data);
        let outcome = miner.mine_block(candidate).await?;
        info!(
            worker = outcome.solution.worker_id,
            nonce = outcome.solution.block.nonce,
            hash = %outcome.solution.block.hash_hex(),
            "mined block {} with {} workers in {:.2}s",
            outcome.solution.block.height,
            args.threads,
            outcome.elapsed.as_secs_f64()
        );
        chain.append_mined(outcome.solution.block)?;
    }

    chain.validate()?;
    info!(height = chain.height(), "chain validated");
    println!("{}", serde_json::to_string_pretty(&chain)?);
    Ok(())
}
