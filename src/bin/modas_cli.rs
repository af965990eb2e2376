use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use modas_pathy_api::{
    config::{self, AppConfig},
    db::{self, DbPool},
    openapi,
    services::{orders::OrderService, seed, Actor},
};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "modas-cli", about = "Operator tasks for the Modas Pathy API")]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Ensure stock themes, contact and settings rows, and the bootstrap admin
    Seed,
    /// Create a back-office account
    CreateAdmin(CreateAdminArgs),
    /// Show an order and its status history by order code
    Track(TrackArgs),
    /// Set the status of a retail order
    SetStatus(SetStatusArgs),
    /// Write the OpenAPI document to a file
    ExportOpenapi(ExportArgs),
}

#[derive(Args, Debug)]
struct CreateAdminArgs {
    username: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    superadmin: bool,
}

#[derive(Args, Debug)]
struct TrackArgs {
    code: String,
}

#[derive(Args, Debug)]
struct SetStatusArgs {
    order_id: i32,
    /// One of: Pagado, Recibido, Confeccionando, "Preparando envio", "En camino", Entregado
    status: String,
    #[arg(long)]
    note: Option<String>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long, default_value = "openapi/modas-pathy.v1.json")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::ExportOpenapi(args) => export_openapi(&args),
        command => run(command, cli.json).await,
    }
}

async fn run(command: Commands, as_json: bool) -> Result<()> {
    let cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(&cfg.log_level, cfg.log_json);
    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to the database")?;

    match command {
        Commands::Migrate => {
            db::run_migrations(&pool).await?;
            report(as_json, json!({ "migrated": true }), "Migrations applied");
        }
        Commands::Seed => seed_command(&pool, &cfg, as_json).await?,
        Commands::CreateAdmin(args) => {
            let user =
                seed::create_admin(&pool, &args.username, &args.password, args.superadmin).await?;
            report(
                as_json,
                json!({ "id": user.id, "username": user.username, "is_superadmin": user.is_superadmin }),
                &format!("Created account {} (id {})", user.username, user.id),
            );
        }
        Commands::Track(args) => track_command(pool, &args.code, as_json).await?,
        Commands::SetStatus(args) => {
            let orders = OrderService::new(Arc::new(pool), None);
            let detail = orders
                .update_status(args.order_id, &args.status, args.note, &Actor::system())
                .await?;
            report(
                as_json,
                json!({ "id": detail.order.id, "status": detail.order.status }),
                &format!("Order {} is now {}", detail.order.order_code, detail.order.status),
            );
        }
        Commands::ExportOpenapi(args) => export_openapi(&args)?,
    }

    Ok(())
}

async fn seed_command(pool: &DbPool, cfg: &AppConfig, as_json: bool) -> Result<()> {
    let summary = seed::seed_defaults(pool, cfg).await?;
    report(
        as_json,
        json!({ "themes": summary.themes, "admin_created": summary.admin_created }),
        &format!(
            "{} stock themes ensured; bootstrap admin {}",
            summary.themes,
            if summary.admin_created {
                "created"
            } else {
                "already present or not configured"
            }
        ),
    );
    Ok(())
}

async fn track_command(pool: DbPool, code: &str, as_json: bool) -> Result<()> {
    let orders = OrderService::new(Arc::new(pool), None);
    let detail = orders.find_by_code(code).await?;

    if as_json {
        let history: Vec<_> = detail
            .history
            .iter()
            .map(|h| json!({ "status": h.status, "note": h.note, "actor": h.actor, "at": h.created_at }))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "code": detail.order.order_code,
                "status": detail.order.status,
                "total": detail.order.total,
                "product": detail.product.as_ref().map(|p| p.name.clone()),
                "history": history,
            }))?
        );
        return Ok(());
    }

    println!("{}  {}", detail.order.order_code, detail.order.status);
    if let Some(product) = &detail.product {
        println!("  product: {}", product.name);
    }
    println!("  total:   {}", detail.order.total);
    for entry in &detail.history {
        println!(
            "  {}  {:<18} {}{}",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.status.to_string(),
            entry.actor,
            entry
                .note
                .as_deref()
                .map(|n| format!(" ({})", n))
                .unwrap_or_default()
        );
    }
    Ok(())
}

fn export_openapi(args: &ExportArgs) -> Result<()> {
    let json = openapi::openapi_json()?;
    if let Some(dir) = args.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(&args.output, json)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("OpenAPI document written to {}", args.output.display());
    Ok(())
}

fn report(as_json: bool, value: serde_json::Value, text: &str) {
    if as_json {
        println!("{}", value);
    } else {
        println!("{}", text);
    }
}
