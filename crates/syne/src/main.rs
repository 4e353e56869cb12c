use anyhow::{anyhow, Result};
use log::LevelFilter;
use std::path::PathBuf;
use std::sync::Arc;

use syne::reader::USAGE;
use syne::storage::{FileStorage, KeyValueStore, MemoryStorage};
use syne::{seed, ApiClient, Config, Reader, ThemeStore};

struct Args {
    articles: Option<PathBuf>,
    input: String,
}

fn parse_args() -> Result<Args> {
    let mut articles = None;
    let mut rest = Vec::new();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--articles" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--articles needs a file path"))?;
                articles = Some(PathBuf::from(path));
            }
            _ => rest.push(arg),
        }
    }

    Ok(Args {
        articles,
        input: rest.join(" "),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Output goes to stdout, so keep stderr to warnings unless RUST_LOG says otherwise
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Warn);
    }
    logger.init();

    let args = parse_args()?;
    if args.input.is_empty() {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load().await?;

    let storage: Arc<dyn KeyValueStore> = match FileStorage::open_default() {
        Ok(storage) => {
            log::debug!("Using storage at {}", storage.path().display());
            Arc::new(storage)
        }
        Err(e) => {
            log::warn!("Persistent storage unavailable, preferences won't be kept: {}", e);
            Arc::new(MemoryStorage::new())
        }
    };

    let store = match &args.articles {
        Some(path) => seed::load_file(path).await?,
        None => seed::bundled_store()?,
    };

    let client = match ApiClient::new(&config.api, storage.clone()) {
        Ok(client) => Some(client),
        Err(e) => {
            log::warn!("API client disabled: {}", e);
            None
        }
    };

    let mut reader = Reader::new(store, ThemeStore::new(storage), config, client);
    let result = reader.execute(&args.input, chrono::Utc::now()).await;

    for notice in reader.notices.active() {
        eprintln!("[{}] {}", notice.kind.label(), notice.content);
    }

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            Ok(())
        }
        Err(e) => {
            log::error!("Command failed: {}", e);
            Err(e)
        }
    }
}
