mod acquire;
mod cache;
mod context;
mod records;
mod spin;

use clap::{Args, Parser, Subcommand};
use eatwhat_core::{CandidateFilter, GeoPoint};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use crate::context::AppContext;
use crate::spin::PoolSource;

#[derive(Debug, Parser)]
#[command(name = "eatwhat")]
#[command(about = "Can't decide where to eat? Spin for it.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// A GPS point given on the command line. Without it the location comes
/// from an IP lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Args)]
struct LocationArgs {
    /// Latitude of the current position
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Longitude of the current position
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,
}

impl LocationArgs {
    fn gps(self) -> Option<GeoPoint> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Args)]
struct FilterArgs {
    /// Only spin restaurants of this category id
    #[arg(long)]
    category: Option<i64>,
    /// Minimum rating, e.g. 4.0
    #[arg(long)]
    min_rating: Option<Decimal>,
    /// Case-insensitive part of the restaurant name
    #[arg(long)]
    name: Option<String>,
}

impl From<FilterArgs> for CandidateFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            category_id: args.category,
            min_rating: args.min_rating,
            name_contains: args.name,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve and print the current location
    Locate {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Fetch nearby restaurants into the local snapshot
    Fetch {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Fetch nearby restaurants and merge them into the database
    Sync {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Seed synthetic restaurants around the current location if it has none
    Bootstrap {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Spin the wheel
    Spin {
        /// Where the pool comes from
        #[arg(long, value_enum, default_value = "cache")]
        source: PoolSource,
        #[command(flatten)]
        filter: FilterArgs,
        /// Skip the terminal animation
        #[arg(long)]
        no_animation: bool,
    },
    /// Show a stored restaurant
    Show { id: i64 },
    /// List recent confirmed picks
    History,
    /// List favorites
    Favorites,
    /// Add or remove a favorite
    Favorite { id: i64 },
    /// List categories
    Categories,
    /// Apply database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = eatwhat_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::new(config);
    tracing::debug!(env = %ctx.config.env, "configuration loaded");

    match cli.command {
        Some(Commands::Locate { location }) => acquire::run_locate(&ctx, location.gps()).await?,
        Some(Commands::Fetch { location }) => acquire::run_fetch(&ctx, location.gps()).await?,
        Some(Commands::Sync { location }) => acquire::run_sync(&ctx, location.gps()).await?,
        Some(Commands::Bootstrap { location }) => {
            acquire::run_bootstrap(&ctx, location.gps()).await?;
        }
        Some(Commands::Spin {
            source,
            filter,
            no_animation,
        }) => spin::run_spin(&ctx, source, filter.into(), !no_animation).await?,
        Some(Commands::Show { id }) => records::run_show(&ctx, id).await?,
        Some(Commands::History) => records::run_history(&ctx).await?,
        Some(Commands::Favorites) => records::run_favorites(&ctx).await?,
        Some(Commands::Favorite { id }) => records::run_toggle_favorite(&ctx, id).await?,
        Some(Commands::Categories) => records::run_categories(&ctx).await?,
        Some(Commands::Migrate) => {
            let pool = ctx.pool().await?;
            let applied = eatwhat_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        None => println!("nothing to do; try `eatwhat --help`"),
    }

    Ok(())
}
