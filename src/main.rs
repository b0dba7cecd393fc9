use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand, ValueEnum};
use letterboxd2supabase::{batch::DEFAULT_LIMIT, error::AppError};
use serde_json::json;

mod logging;

#[derive(Parser)]
#[command(
    name = "letterboxd2supabase",
    version,
    about = "Fetch Letterboxd film data and ratings into Supabase"
)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the Letterboxd average rating of a film
    Rating {
        title: String,
        year: Option<i32>,
        tmdb_id: Option<u64>,
        /// Store the rating on the first draft pick matching title and year
        #[arg(long)]
        write: bool,
    },
    /// Fill in missing Letterboxd ratings on draft picks
    Batch {
        /// Maximum number of movies to process
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
        /// Preview what would be updated
        #[arg(long)]
        dry_run: bool,
    },
    /// Inspect films on Letterboxd
    #[command(subcommand)]
    Movie(MovieCommand),
    /// Print a user's list, or save it as CSV
    List {
        user: String,
        list_slug: String,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Print a user's watchlist, or save it as CSV
    Watchlist {
        user: String,
        #[arg(long)]
        max: Option<usize>,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show a user's profile, watchlist or diary
    User {
        user: String,
        #[arg(value_enum, default_value_t = UserMode::Profile)]
        mode: UserMode,
        /// Maximum number of watchlist films or diary entries
        max: Option<usize>,
    },
    /// Add Letterboxd films to a spec draft
    #[command(subcommand)]
    Sync(SyncCommand),
    /// Verify the Letterboxd and Supabase connections
    Check,
}

#[derive(Subcommand)]
enum MovieCommand {
    Slug {
        slug: String,
    },
    Search {
        query: String,
        max_results: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum UserMode {
    Profile,
    Watchlist,
    Diary,
}

#[derive(Subcommand)]
enum SyncCommand {
    List {
        user: String,
        list_slug: String,
        spec_draft_id: String,
        #[arg(long)]
        dry_run: bool,
    },
    Watchlist {
        user: String,
        spec_draft_id: String,
        #[arg(long)]
        max: Option<usize>,
        #[arg(long)]
        dry_run: bool,
    },
}

async fn run(command: Command) -> Result<(), AppError> {
    match command {
        Command::Rating {
            title,
            year,
            tmdb_id,
            write,
        } => match letterboxd2supabase::fetch_rating(&title, year, tmdb_id, write).await {
            Ok(rating) => {
                println!("{}", json!({ "rating": rating, "scale": "0-5" }));
                Ok(())
            }
            Err(e) => {
                if e.is_rating_not_found() {
                    println!("{}", json!({ "rating": null, "error": "Rating not found" }));
                }
                Err(e)
            }
        },
        Command::Batch { limit, dry_run } => letterboxd2supabase::run_batch(limit, dry_run)
            .await
            .map(|_| ()),
        Command::Movie(MovieCommand::Slug { slug }) => letterboxd2supabase::show_film(&slug).await,
        Command::Movie(MovieCommand::Search { query, max_results }) => {
            letterboxd2supabase::search_films(&query, max_results).await
        }
        Command::List {
            user,
            list_slug,
            csv,
        } => letterboxd2supabase::export_list(&user, &list_slug, csv.as_deref()).await,
        Command::Watchlist { user, max, csv } => {
            letterboxd2supabase::export_watchlist(&user, max, csv.as_deref()).await
        }
        Command::User { user, mode, max } => match mode {
            UserMode::Profile => letterboxd2supabase::show_user_profile(&user).await,
            UserMode::Watchlist => letterboxd2supabase::export_watchlist(&user, max, None).await,
            UserMode::Diary => letterboxd2supabase::show_diary(&user, max).await,
        },
        Command::Sync(SyncCommand::List {
            user,
            list_slug,
            spec_draft_id,
            dry_run,
        }) => letterboxd2supabase::sync_list(&user, &list_slug, &spec_draft_id, dry_run)
            .await
            .map(|_| ()),
        Command::Sync(SyncCommand::Watchlist {
            user,
            spec_draft_id,
            max,
            dry_run,
        }) => letterboxd2supabase::sync_watchlist(&user, &spec_draft_id, max, dry_run)
            .await
            .map(|_| ()),
        Command::Check => letterboxd2supabase::check_connections().await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
