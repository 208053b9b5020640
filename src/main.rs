mod cli;

use anyhow::Result;
use clap::Parser;
use log::error;

use zano_setup::config::SetupConfig;

fn main() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("FATAL: Failed to create Tokio runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(real_main()) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn real_main() -> Result<()> {
    let args = cli::Args::parse();

    let cfg_path = match args.config {
        Some(path) => path,
        None => SetupConfig::default_path()?,
    };
    let mut cfg = SetupConfig::load_or_create(&cfg_path)?;
    if let Some(work_dir) = args.work_dir {
        cfg.work_dir = work_dir;
    }
    log::info!("Using config from: {}", cfg_path.display());

    zano_setup::install::run(&cfg).await
}
