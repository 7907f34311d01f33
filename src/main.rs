use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use configuration::{Config, LogFormat};
use core_types::{GuestReservation, NewUser, PropertyListing, PropertySearch, User};
use database::{connect, run_migrations, DbRepository, OptionalExt, QueryGateway};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::process::ExitCode;

mod seed;
mod telemetry;

/// The main entry point for the LightBnB data tool.
#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; real deployments set the environment directly.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match configuration::load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let format = cli.log_format.unwrap_or(config.logging.format);
    let _log_guard = telemetry::init_tracing(&config.logging, format);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "Command failed.");
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Query and seed the LightBnB listing database.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (optional).
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Overrides the configured log output format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the database schema migrations.
    Migrate,
    /// Load the JSON user and property fixtures.
    Seed(SeedArgs),
    /// Look up a single user by email or id.
    User(UserArgs),
    /// Create a user.
    AddUser(AddUserArgs),
    /// List a guest's reservations with property details and ratings.
    Reservations(ReservationArgs),
    /// Search properties with optional filters.
    Search(SearchArgs),
}

#[derive(Args)]
struct SeedArgs {
    /// JSON array of users.
    #[arg(long, default_value = "fixtures/users.json")]
    users: PathBuf,

    /// JSON array of properties; `owner_id` is a 1-based position in the user file.
    #[arg(long, default_value = "fixtures/properties.json")]
    properties: PathBuf,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct UserArgs {
    /// Exact, case-sensitive email address.
    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    id: Option<i32>,
}

#[derive(Args)]
struct AddUserArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    password: String,
}

#[derive(Args)]
struct ReservationArgs {
    #[arg(long)]
    guest_id: i32,

    /// Maximum number of rows (defaults to `gateway.default_limit`).
    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Args)]
struct SearchArgs {
    /// Case-insensitive substring of the city.
    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    owner_id: Option<i32>,

    /// Lowest nightly price in dollars; needs --max-price.
    #[arg(long, requires = "max_price")]
    min_price: Option<i64>,

    /// Highest nightly price in dollars; needs --min-price.
    #[arg(long, requires = "min_price")]
    max_price: Option<i64>,

    /// Only properties whose average rating is above this value.
    #[arg(long)]
    min_rating: Option<Decimal>,

    /// Maximum number of rows (defaults to `gateway.default_limit`).
    #[arg(long)]
    limit: Option<u32>,
}

impl From<&SearchArgs> for PropertySearch {
    fn from(args: &SearchArgs) -> Self {
        PropertySearch {
            city: args.city.clone(),
            owner_id: args.owner_id,
            minimum_price_per_night: args.min_price,
            maximum_price_per_night: args.max_price,
            minimum_rating: args.min_rating,
        }
    }
}

// ==============================================================================
// Command Dispatch
// ==============================================================================

async fn run(command: Commands, config: Config) -> anyhow::Result<()> {
    let pool = connect(&config.database)
        .await
        .context("failed to connect to the database")?;

    let gateway = QueryGateway::new(DbRepository::new(pool), config.gateway);

    match command {
        Commands::Migrate => {
            run_migrations(gateway.store().pool()).await?;
            println!("Migrations applied.");
        }
        Commands::Seed(args) => {
            let report = seed::seed(&gateway, &args.users, &args.properties).await?;
            println!(
                "Created {} users ({} already present) and {} properties.",
                report.users_created, report.users_existing, report.properties_created
            );
        }
        Commands::User(args) => {
            let lookup = match args.email {
                Some(email) => gateway.get_user_with_email(&email).await,
                None => {
                    let id = args.id.context("either --email or --id is required")?;
                    gateway.get_user_with_id(id).await
                }
            };
            match lookup.optional()? {
                Some(user) => println!("{}", users_table(&[user])),
                None => println!("No matching user."),
            }
        }
        Commands::AddUser(args) => {
            let user = NewUser {
                name: args.name,
                email: args.email,
                password: args.password,
            };
            let created = gateway.add_user(&user).await?;
            println!("{}", users_table(&[created]));
        }
        Commands::Reservations(args) => {
            let reservations = gateway.get_all_reservations(args.guest_id, args.limit).await?;
            println!("{}", reservations_table(&reservations));
        }
        Commands::Search(args) => {
            let listings = gateway
                .get_all_properties(&PropertySearch::from(&args), args.limit)
                .await?;
            println!("{}", listings_table(&listings));
        }
    }

    Ok(())
}

// ==============================================================================
// Output Formatting
// ==============================================================================

/// Formats an amount in cents as dollars, e.g. `9350` -> `$93.50`.
fn dollars(cents: i32) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}${}.{:02}", cents / 100, cents % 100)
}

fn rating(average: Option<Decimal>) -> String {
    average.map_or_else(|| "-".to_string(), |avg| avg.round_dp(2).to_string())
}

fn users_table(users: &[User]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Id", "Name", "Email"]);
    for user in users {
        table.add_row(vec![user.id.to_string(), user.name.clone(), user.email.clone()]);
    }
    table
}

fn reservations_table(reservations: &[GuestReservation]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Id", "Property", "Start", "End", "Per night", "Rating"]);
    for row in reservations {
        table.add_row(vec![
            row.reservation.id.to_string(),
            row.title.clone(),
            row.reservation.start_date.to_string(),
            row.reservation.end_date.to_string(),
            dollars(row.cost_per_night),
            rating(row.average_rating),
        ]);
    }
    table
}

fn listings_table(listings: &[PropertyListing]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Id", "Title", "City", "Owner", "Per night", "Rating"]);
    for listing in listings {
        let property = &listing.property;
        table.add_row(vec![
            property.id.to_string(),
            property.title.clone(),
            property.city.clone(),
            property.owner_id.to_string(),
            dollars(property.cost_per_night),
            rating(listing.average_rating),
        ]);
    }
    table
}
