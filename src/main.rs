//! cardgen - Telegram bot generating Luhn-valid test card numbers.
//!
//! CLI entry point.

use cardgen::bot::{Bot, TelegramApi};
use cardgen::lookup::{query_bin, BinLookupClient};
use cardgen::{BinConfig, Commands, Config, GenConfig, GenerationSession, MemorySessionStore, ServeConfig};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Set up logging
    let filter = if config.verbose {
        EnvFilter::new("cardgen=debug,info")
    } else {
        EnvFilter::new("cardgen=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let lookup = match BinLookupClient::new(&config.bin_api_url, config.lookup_timeout, config.rate_limit) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create BIN lookup client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match config.command.clone() {
        Commands::Serve(serve_config) => run_serve(serve_config, lookup).await,
        Commands::Gen(gen_config) => run_gen(gen_config, lookup).await,
        Commands::Bin(bin_config) => run_bin(bin_config, lookup).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

async fn run_serve(serve_config: ServeConfig, lookup: BinLookupClient) -> Result<(), ExitCode> {
    let api = match TelegramApi::new(&serve_config.token, serve_config.poll_timeout) {
        Ok(api) => api,
        Err(e) => {
            error!("Failed to create Telegram client: {}", e);
            return Err(ExitCode::FAILURE);
        }
    };

    let store = match serve_config.session_ttl() {
        Some(ttl) => MemorySessionStore::with_ttl(ttl),
        None => MemorySessionStore::new(),
    };
    let session = GenerationSession::new(lookup, store).with_batch_size(serve_config.batch_size);
    let bot = Arc::new(Bot::new(api, session, serve_config.poll_timeout));

    tokio::select! {
        _ = bot.run() => {},
        _ = shutdown_signal() => {
            info!("Signal received, shutting down");
        }
    }

    Ok(())
}

async fn run_gen(gen_config: GenConfig, lookup: BinLookupClient) -> Result<(), ExitCode> {
    let lookup = (!gen_config.offline).then_some(lookup);
    let session = GenerationSession::new(lookup, MemorySessionStore::new()).with_batch_size(gen_config.count);
    let report = session.generate(&gen_config.text.join(" ")).await;

    let record = &report.record;
    eprintln!("Base: {}|{}|{}", record.base_card, record.base_month_year, record.base_cvv);
    if let Some(info) = &report.bin_info {
        eprintln!(
            "Info: {} - {} - {}",
            info.brand.as_deref().unwrap_or("Unknown"),
            info.card_type.as_deref().unwrap_or("Unknown"),
            info.bank.as_deref().unwrap_or("Unknown"),
        );
    }
    for card in &report.cards {
        println!("{}", card);
    }

    Ok(())
}

async fn run_bin(bin_config: BinConfig, lookup: BinLookupClient) -> Result<(), ExitCode> {
    let report = match query_bin(&lookup, &bin_config.bin).await {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            return Err(ExitCode::FAILURE);
        }
    };

    match report.info {
        Some(info) => {
            let json = serde_json::to_string_pretty(&info).unwrap_or_default();
            println!("{}", json);
            Ok(())
        }
        None => {
            error!("No information found for BIN {}", report.bin);
            Err(ExitCode::FAILURE)
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (Ok(mut sigterm), Ok(mut sigint)) =
            (signal(SignalKind::terminate()), signal(SignalKind::interrupt()))
        else {
            let _ = tokio::signal::ctrl_c().await;
            return;
        };

        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
