//! macrolog
//!
//! Command-line front end for the macro ledger engine.

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use macrolog::build_info;
use macrolog::engine::MacroEngine;
use macrolog::ledger::serialize;
use macrolog::settings::Settings;
use macrolog::storage::{FsVault, VaultCache};

/// Get the vault path from environment or use the working directory
fn get_vault_path() -> PathBuf {
    std::env::var("MACROLOG_VAULT_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

fn print_usage() {
    eprintln!("Usage: macrolog <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  show <id>              Print a ledger's canonical form");
    eprintln!("  totals <id> [<id>...]  Nutrition totals with per-ledger breakdown");
    eprintln!("  log <id> <line>...     Queue selections and merge them in");
    eprintln!();
    eprintln!("The vault directory is taken from MACROLOG_VAULT_PATH (default: .);");
    eprintln!("settings are read from <vault>/macrolog.json");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Log to stderr so command output stays clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("macrolog=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();

    let vault_path = get_vault_path();
    eprintln!("Vault path: {}", vault_path.display());

    let settings = Settings::load(vault_path.join("macrolog.json"));
    let vault = Arc::new(FsVault::new(vault_path, settings.food_folder.clone()));
    let cache = Arc::new(VaultCache::new());
    let engine = MacroEngine::new(vault.clone(), vault, settings, cache);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        Some((cmd, rest)) if cmd == "show" && rest.len() == 1 => {
            match engine.parsed_structure(&rest[0]).await? {
                Some(structure) => println!("{}", serialize(&structure)),
                None => {
                    eprintln!("No ledger block with id '{}'", rest[0]);
                    std::process::exit(1);
                }
            }
        }
        Some((cmd, rest)) if cmd == "totals" && !rest.is_empty() => {
            let rollup = engine.aggregate_many(rest).await?;
            println!("{}", serde_json::to_string_pretty(&rollup)?);
        }
        Some((cmd, rest)) if cmd == "log" && rest.len() >= 2 => {
            let (id, lines) = (&rest[0], &rest[1..]);
            for line in lines {
                let outcome = engine.queue_selection(id, line).await;
                eprintln!("{}: {:?}", line, outcome);
            }
        }
        _ => {
            print_usage();
            std::process::exit(2);
        }
    }

    Ok(())
}
