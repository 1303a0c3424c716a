use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use lottery_ledger::{export_csv, Config, JsonFileStore, Ledger};

fn main() -> Result<()> {
    // Logs go to stderr so they don't fight with the terminal UI on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();
    let store = JsonFileStore::new(&config.data_path, &config.users_path);
    let ledger = Ledger::new(Arc::new(store));

    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "export" {
        let target = args.get(2).context("Usage: lottery-ledger export <file.csv>")?;
        run_export(&ledger, Path::new(target))?;
    } else {
        // UI mode (default)
        run_ui_mode(&ledger)?;
    }

    Ok(())
}

fn run_export(ledger: &Ledger, target: &Path) -> Result<()> {
    let entries = ledger.load_entries().context("Failed to load entries for export")?;
    let rows = export_csv(target, &entries)?;
    println!("✓ Exported {} entries ({} rows) to {}", entries.len(), rows, target.display());
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(ledger: &Ledger) -> Result<()> {
    use lottery_ledger::ui;

    let entries = ledger.entries();
    let users = ledger.registry().names().to_vec();
    let today = chrono::Local::now().date_naive();

    let mut app = ui::App::new(entries, users, today);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_ledger: &Ledger) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use web UI: cargo run --bin lottery-server --features server");
    std::process::exit(1);
}
