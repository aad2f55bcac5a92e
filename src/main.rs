// src/main.rs

use denon::config::{load_or_default, LoggerConfig};
use denon::fs::RealFileSystem;
use denon::{cli, init_config, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("denon error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<i32> {
    let args = cli::parse();

    if let Some(format) = args.init {
        logging::init_logging(args.log_level, &LoggerConfig::default())?;
        init_config(format, &std::env::current_dir()?, &RealFileSystem)?;
        return Ok(0);
    }

    let config = load_or_default(args.config.as_deref())?;
    logging::init_logging(args.log_level, &config.logger)?;
    run(args, config).await
}
