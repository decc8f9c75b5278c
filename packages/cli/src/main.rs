use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use common::barcode::scan_png;
use inventory_core::models::{HistoryWindow, Product};
use inventory_core::{InventoryConfig, InventoryService};
use tracing::info;

#[derive(Parser)]
#[command(name = "stockctl", about = "Inventory ledger maintenance", version)]
struct Cli {
    /// Database URL; overrides `database.url` from the config file.
    #[arg(long, global = true, env = "STOCKCTL_DATABASE_URL")]
    database_url: Option<String>,
    /// Asset root; overrides `storage.root`.
    #[arg(long, global = true)]
    storage_root: Option<PathBuf>,
    #[arg(long, global = true, action = ArgAction::SetTrue, help = "Print results as JSON")]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare cached quantities with their ledger sums.
    Reconcile {
        /// Rewrite drifted quantities to the ledger sum.
        #[arg(long)]
        repair: bool,
    },
    /// List products at or below their threshold.
    LowStock,
    /// Remove stored images no product references.
    GcAssets,
    /// Render a product code to a PNG file.
    Render { code: String, out: PathBuf },
    #[command(subcommand)]
    Category(CategoryCommands),
    /// Show a product's most recent ledger entries.
    History {
        product_id: i32,
        #[arg(long, default_value_t = 20)]
        limit: u64,
    },
    /// Product counts and recent daily removals.
    Summary {
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
}

#[derive(Subcommand)]
enum CategoryCommands {
    Add { name: String },
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let cli = Cli::parse();
    let mut config = InventoryConfig::load().context("Failed to load config")?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    if let Some(root) = cli.storage_root {
        config.storage.root = root;
    }

    match cli.command {
        // Rendering needs neither the database nor the asset store.
        Commands::Render { code, out } => render(&config, &code, &out),
        command => run(command, &config, cli.json).await,
    }
}

async fn run(command: Commands, config: &InventoryConfig, json: bool) -> Result<()> {
    let service = InventoryService::from_config(config)
        .await
        .context("Failed to open inventory")?;

    match command {
        Commands::Reconcile { repair } => {
            let report = service.reconcile(repair).await?;
            if json {
                print_json(&report)?;
            } else {
                for drift in &report.drifted {
                    println!(
                        "product {} ({}): cached {} ledger {}",
                        drift.product_id, drift.barcode, drift.cached, drift.ledger
                    );
                }
                println!(
                    "checked {} products, {} drifted, {} repaired",
                    report.checked,
                    report.drifted.len(),
                    report.repaired
                );
            }
            if !report.is_consistent() && !repair {
                bail!("ledger drift detected; rerun with --repair");
            }
        }
        Commands::LowStock => {
            let products = service.list_low_stock().await?;
            if json {
                print_json(&products)?;
            } else {
                print_products(&products);
            }
        }
        Commands::GcAssets => {
            let report = service.collect_orphan_assets().await?;
            for asset in &report.removed {
                println!("removed {asset}");
            }
            for (asset, reason) in &report.failed {
                eprintln!("failed {asset}: {reason}");
            }
            println!(
                "scanned {} assets, removed {}",
                report.scanned,
                report.removed.len()
            );
        }
        Commands::Category(CategoryCommands::Add { name }) => {
            let category = service.create_category(&name).await?;
            println!("{}\t{}", category.id, category.name);
        }
        Commands::Category(CategoryCommands::List) => {
            let categories = service.list_categories().await?;
            if json {
                print_json(&categories)?;
            } else {
                for category in categories {
                    println!("{}\t{}", category.id, category.name);
                }
            }
        }
        Commands::History { product_id, limit } => {
            let entries = service
                .get_history(product_id, HistoryWindow::latest(limit))
                .await?;
            if json {
                print_json(&entries)?;
            } else {
                for entry in entries {
                    println!(
                        "{}\t{:>6}\t{}",
                        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        entry.change_amount,
                        entry.kind
                    );
                }
            }
        }
        Commands::Summary { days } => {
            let summary = service.stock_summary(days).await?;
            if json {
                print_json(&summary)?;
            } else {
                println!(
                    "{} products, {} low on stock",
                    summary.total_products, summary.low_stock_count
                );
                print_products(&summary.lowest);
                for day in &summary.daily_outflow {
                    println!("{}\t{} out", day.date, day.units);
                }
            }
        }
        Commands::Render { code, out } => render(config, &code, &out)?,
    }

    Ok(())
}

fn render(config: &InventoryConfig, code: &str, out: &Path) -> Result<()> {
    let code = common::barcode::BarcodeCode::parse(code).context("Invalid product code")?;
    let codec = common::barcode::IdentityCodec::new((&config.barcode).into());
    let png = codec.render_image(&code).context("Failed to render barcode")?;

    let scanned = scan_png(&png).context("Rendered image did not scan")?;
    if scanned != code {
        bail!("rendered image scans as {scanned}, expected {code}");
    }

    std::fs::write(out, &png).with_context(|| format!("Failed to write {}", out.display()))?;
    info!(code = %code, path = %out.display(), "Rendered barcode");
    Ok(())
}

fn print_products(products: &[Product]) {
    for p in products {
        println!(
            "{}\t{}\t{:>6}/{:<6}\t{}",
            p.id, p.barcode, p.quantity, p.low_stock_threshold, p.name
        );
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
