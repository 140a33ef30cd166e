//! Utility to scan a vault for ledger blocks with unresolvable food references

use std::path::PathBuf;

use macrolog::ledger::LedgerParser;
use macrolog::nutrition::{NutritionResolver, Resolution};
use macrolog::settings::Settings;
use macrolog::storage::block;
use macrolog::storage::{DocumentStore, FoodFileSource, FsVault};

fn get_vault_path() -> PathBuf {
    std::env::var("MACROLOG_VAULT_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let vault_path = get_vault_path();
    println!("Vault path: {}", vault_path.display());
    println!(
        "Report generated: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let settings = Settings::load(vault_path.join("macrolog.json"));
    let vault = FsVault::new(vault_path, settings.food_folder.clone());

    let foods = vault.food_files().await?;
    println!("Food files: {}", foods.len());
    let resolver = NutritionResolver::new(foods);
    let parser = LedgerParser::new(&resolver);

    let mut blocks = 0usize;
    let mut missing = 0usize;
    let mut ambiguous = 0usize;

    for doc in vault.list_documents().await? {
        let text = vault.read(&doc).await?;
        for span in block::find_blocks(&text) {
            blocks += 1;
            let content = block::content_lines(&text, &span).join("\n");
            let structure = parser.parse(&content);
            for (food, _) in structure.all_items() {
                match resolver.resolve(food) {
                    Resolution::Resolved(_) => {}
                    Resolution::Ambiguous { candidates } => {
                        ambiguous += 1;
                        println!(
                            "  {} / {}: '{}' is ambiguous ({})",
                            doc.path,
                            span.id,
                            food,
                            candidates.join(", ")
                        );
                    }
                    Resolution::NotFound => {
                        missing += 1;
                        println!("  {} / {}: no food file for '{}'", doc.path, span.id, food);
                    }
                }
            }
        }
    }

    println!(
        "Checked {} ledger blocks: {} missing, {} ambiguous references",
        blocks, missing, ambiguous
    );

    Ok(())
}
