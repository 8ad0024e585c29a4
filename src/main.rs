use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use boxguard::auth::ServerAuth;
use boxguard::cache::ProjectionCache;
use boxguard::config::AppConfig;
use boxguard::db::Database;
use boxguard::export;
use boxguard::logging::init_logging;
use boxguard::models::{
    CountType, MoveStatus, NewItem, NewMove, Payer, ResolveClaim, UpdateItem, UserRole,
};
use boxguard::photos::PlaceholderPhotoStore;
use boxguard::router::Router;
use boxguard::validation::InputValidator;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Phone identifier of the requesting user
    #[arg(short, long, global = true, default_value = "admin")]
    identity: String,

    /// Portal role to authenticate as (customer, company, admin)
    #[arg(short, long, global = true, default_value = "admin")]
    role: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wipe the store and load fixed demonstration data
    Seed,
    /// Wipe the store and reset to empty collections
    Migrate,
    /// Verify an identity against the registry
    Login,
    /// Show dashboard aggregate counts
    Dashboard,
    /// List moves visible to the requester
    ListMoves,
    /// Show the denormalized detail of one move
    MoveDetail {
        /// Move identifier
        #[arg(short, long)]
        move_id: String,
    },
    /// Create a new move for a customer
    CreateMove {
        /// Owning customer identifier
        #[arg(short, long)]
        customer_id: String,

        /// Protection price in dollars
        #[arg(short, long)]
        price: Option<f64>,
    },
    /// Create a box on a move
    CreateBox {
        /// Move identifier
        #[arg(short, long)]
        move_id: String,

        /// Box display name
        #[arg(short, long)]
        name: String,

        /// Photo payloads (data URIs or file references), repeatable
        #[arg(short, long)]
        photo: Vec<String>,
    },
    /// Log an item in a box
    AddItem {
        /// Box identifier
        #[arg(short, long)]
        box_id: String,

        /// Item name
        #[arg(short, long)]
        name: Option<String>,

        /// Free-text description
        #[arg(short, long)]
        description: Option<String>,

        /// Count classification (exact, broken, other)
        #[arg(short, long)]
        count_type: Option<String>,

        /// Quantity
        #[arg(short, long)]
        quantity: Option<u32>,

        /// Weight in pounds
        #[arg(short, long)]
        weight: Option<f64>,
    },
    /// Edit an existing item; omitted fields are left unchanged
    UpdateItem {
        /// Item identifier
        #[arg(long)]
        item_id: String,

        /// New item name
        #[arg(short, long)]
        name: Option<String>,

        /// New free-text description
        #[arg(short, long)]
        description: Option<String>,

        /// New count classification (exact, broken, other)
        #[arg(short, long)]
        count_type: Option<String>,

        /// New quantity
        #[arg(short, long)]
        quantity: Option<u32>,

        /// New weight in pounds
        #[arg(short, long)]
        weight: Option<f64>,
    },
    /// Change a move's lifecycle status
    SetStatus {
        /// Move identifier
        #[arg(short, long)]
        move_id: String,

        /// New status
        #[arg(short, long)]
        status: String,
    },
    /// Open a damage claim against a move
    OpenClaim {
        /// Move identifier
        #[arg(short, long)]
        move_id: String,
    },
    /// Resolve an open claim with a payout
    ResolveClaim {
        /// Move identifier
        #[arg(short, long)]
        move_id: String,

        /// Payout amount in dollars
        #[arg(short, long)]
        amount: f64,

        /// Who pays (insurance or company)
        #[arg(short, long, default_value = "company")]
        payer: String,

        /// Outcome narrative
        #[arg(short, long, default_value = "")]
        notes: String,
    },
    /// Export the CSV inventory and liability document for a move
    Export {
        /// Move identifier
        #[arg(short, long)]
        move_id: String,

        /// Output directory
        #[arg(short, long, default_value = "")]
        output_dir: String,
    },
    /// List all user accounts (admin only)
    ListUsers,
    /// Change a user's role (admin only)
    SetRole {
        /// User identifier
        #[arg(short, long)]
        user_id: String,

        /// New role
        #[arg(short, long)]
        new_role: String,
    },
    /// Toggle a user's review flag (admin only)
    ToggleFlag {
        /// User identifier
        #[arg(short, long)]
        user_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    let _log_guard = init_logging(
        Some(&config.get_log_level()),
        config.logging.file_path.as_deref().map(std::path::Path::new),
    )?;

    info!("Starting boxguard");

    // Parse command line arguments
    let cli = Cli::parse();

    // Open the snapshot and projection slots
    let db = Database::open(config.db_path())?;
    let cache = ProjectionCache::open(config.cache_path())?;
    let auth = ServerAuth::new(
        db.clone(),
        config.auth.login_delay_ms,
        config.auth.admin_token.clone(),
    );
    let router = Router::new(db.clone(), cache, Box::new(PlaceholderPhotoStore));

    // Administrative commands run without an authenticated requester
    match &cli.command {
        Commands::Seed => {
            db.seed()?;
            router.warm_cache()?;
            println!("Seeded demonstration data and warmed the cache");
            return Ok(());
        }
        Commands::Migrate => {
            db.migrate()?;
            router.warm_cache()?;
            println!("Store wiped and reset to empty collections");
            return Ok(());
        }
        _ => {}
    }

    let role = parse_role(&cli.role)?;
    let requester = auth
        .verify_identity(&cli.identity, role)
        .await
        .context("Failed to authenticate requester")?;
    info!(user = %requester.id, role = %requester.role, "Requester authenticated");

    match &cli.command {
        Commands::Seed | Commands::Migrate => unreachable!("handled above"),
        Commands::Login => {
            println!("Verified: {} ({})", requester.id, requester.role);
        }
        Commands::Dashboard => {
            let summary = router.get_dashboard(&requester)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::ListMoves => {
            let moves = router.list_moves(&requester)?;
            println!("{}", serde_json::to_string_pretty(&moves)?);
        }
        Commands::MoveDetail { move_id } => {
            let detail = router.get_move_detail(move_id, &requester)?;
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
        Commands::CreateMove { customer_id, price } => {
            if let Some(p) = price {
                InputValidator::validate_protection_price(*p)?;
            }
            let created = router.create_move(
                NewMove {
                    customer_id: customer_id.clone(),
                    assigned_company_id: None,
                    protection_tier: None,
                    protection_price: *price,
                },
                &requester,
            )?;
            println!("Created move {}", created.id);
        }
        Commands::CreateBox { move_id, name, photo } => {
            InputValidator::validate_name(name)?;
            let created = router.create_box(move_id, name, photo, &requester).await?;
            println!("Created box {} with {} photos", created.id, created.photos.len());
        }
        Commands::AddItem {
            box_id,
            name,
            description,
            count_type,
            quantity,
            weight,
        } => {
            if let Some(n) = name {
                InputValidator::validate_name(n)?;
            }
            if let Some(d) = description {
                InputValidator::validate_description(d)?;
            }
            if let Some(q) = quantity {
                InputValidator::validate_quantity(*q)?;
            }
            if let Some(w) = weight {
                InputValidator::validate_weight(*w)?;
            }
            let item = router.add_item(
                box_id,
                NewItem {
                    name: name.clone(),
                    description: description.clone(),
                    count_type: count_type.as_deref().map(parse_count_type).transpose()?,
                    quantity: *quantity,
                    weight: *weight,
                },
                &requester,
            )?;
            println!("Logged item {} ({})", item.id, item.name);
        }
        Commands::UpdateItem {
            item_id,
            name,
            description,
            count_type,
            quantity,
            weight,
        } => {
            if let Some(n) = name {
                InputValidator::validate_name(n)?;
            }
            if let Some(d) = description {
                InputValidator::validate_description(d)?;
            }
            if let Some(q) = quantity {
                InputValidator::validate_quantity(*q)?;
            }
            if let Some(w) = weight {
                InputValidator::validate_weight(*w)?;
            }
            let item = router.update_item(
                item_id,
                UpdateItem {
                    name: name.clone(),
                    description: description.clone(),
                    count_type: count_type.as_deref().map(parse_count_type).transpose()?,
                    quantity: *quantity,
                    weight: *weight,
                },
                &requester,
            )?;
            println!("Updated item {} ({})", item.id, item.name);
        }
        Commands::SetStatus { move_id, status } => {
            let status = parse_status(status)?;
            let updated = router.update_move_status(move_id, status, &requester)?;
            println!("Move {} is now {}", updated.id, updated.status);
        }
        Commands::OpenClaim { move_id } => {
            let updated = router.open_claim(move_id, &requester)?;
            println!("Claim opened on move {}", updated.id);
        }
        Commands::ResolveClaim {
            move_id,
            amount,
            payer,
            notes,
        } => {
            InputValidator::validate_payout(*amount)?;
            let updated = router.resolve_claim(
                move_id,
                ResolveClaim {
                    payout_amount: *amount,
                    payer: parse_payer(payer)?,
                    outcome_notes: InputValidator::sanitize_text(notes),
                },
                &requester,
            )?;
            println!("Claim resolved on move {}", updated.id);
        }
        Commands::Export { move_id, output_dir } => {
            let detail = router.get_move_detail(move_id, &requester)?;

            // Use configuration output directory if not provided
            let effective_output_dir = if output_dir.is_empty() {
                &config.export.output_directory
            } else {
                output_dir
            };
            let files = export::export_move(&detail, std::path::Path::new(effective_output_dir))?;
            for file in files {
                println!("Wrote {}", file.display());
            }
        }
        Commands::ListUsers => {
            let users = router.list_users(&requester)?;
            println!("{}", serde_json::to_string_pretty(&users)?);
        }
        Commands::SetRole { user_id, new_role } => {
            let updated = router.update_user_role(user_id, parse_role(new_role)?, &requester)?;
            println!("User {} is now {}", updated.id, updated.role);
        }
        Commands::ToggleFlag { user_id } => {
            let updated = router.toggle_user_flag(user_id, &requester)?;
            println!(
                "User {} is {}",
                updated.id,
                if updated.is_flagged { "flagged" } else { "unflagged" }
            );
        }
    }

    Ok(())
}

/// Parse a portal role from the command line
fn parse_role(raw: &str) -> Result<UserRole> {
    raw.parse::<UserRole>().map_err(|e| {
        warn!("Invalid role: {}", raw);
        anyhow::anyhow!(e)
    })
}

/// Parse a move status from the command line
fn parse_status(raw: &str) -> Result<MoveStatus> {
    raw.parse::<MoveStatus>().map_err(|e| anyhow::anyhow!(e))
}

/// Parse a count classification from the command line
fn parse_count_type(raw: &str) -> Result<CountType> {
    raw.parse::<CountType>().map_err(|e| anyhow::anyhow!(e))
}

/// Parse a claim payer from the command line
fn parse_payer(raw: &str) -> Result<Payer> {
    match raw.trim().to_lowercase().as_str() {
        "insurance" => Ok(Payer::Insurance),
        "company" => Ok(Payer::Company),
        other => Err(anyhow::anyhow!("Unknown payer: {other}")),
    }
}
