use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tweetcrafter::cli;
use tweetcrafter::generator::workflow::{StageKey, launch};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let args = cli::Args::parse();
    let config = args.build_config()?;
    init_tracing(config.verbose);

    let inputs = args.inputs();

    let report = launch(&config, &inputs, !args.no_save).await?;

    println!("\n✨ 最终推文:\n");
    println!(
        "{}",
        report
            .result
            .content(StageKey::FinalTweets)
            .unwrap_or_default()
    );
    Ok(())
}

/// RUST_LOG 优先，否则按 --verbose 选择日志级别
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tweetcrafter={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
