use clap::{ArgAction, Parser, Subcommand};
use commands::{browse, clear, config, search, show, watched};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;
mod terminal_title;

#[derive(Parser)]
#[command(name = "popcorn")]
#[command(about = "usePopcorn - search movies and keep a list of what you've watched")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search movies by title
    #[command(long_about = "Search the movie database by title. Queries shorter than 3 characters are not sent.")]
    Search {
        /// Title text to search for
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show details for one title
    Show {
        /// IMDb ID (e.g. tt0133093)
        imdb_id: String,
    },
    /// Rate a title and add it to your watched list
    Rate {
        /// IMDb ID (e.g. tt0133093)
        imdb_id: String,

        /// Your rating, 1-10
        #[arg(value_parser = clap::value_parser!(u8).range(1..=10))]
        rating: u8,
    },
    /// Remove a title from your watched list
    Remove {
        /// IMDb ID (e.g. tt0133093)
        imdb_id: String,
    },
    /// List watched movies with averages
    List,
    /// Interactive search-as-you-type session
    #[command(long_about = "Start an interactive session. Type to search; commands start with ':' (:open N, :rate N, :add, :rm ID, :list, :esc, :help, :quit). An empty line acts as the Enter key: it returns focus to the search and clears the query.")]
    Browse {
        /// Write logs to this file instead of the default log directory
        #[arg(long, value_name = "PATH")]
        log_file: Option<PathBuf>,
    },
    /// Configure the API key and settings
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
    /// Clear stored data
    Clear {
        /// Delete the watched list
        #[arg(long, action = ArgAction::SetTrue)]
        watched: bool,

        /// Don't ask for confirmation
        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Store an OMDb API key
    #[command(long_about = "Store an OMDb API key in the credentials file. The OMDB_API_KEY environment variable takes precedence over the stored key.")]
    ApiKey {
        /// API key (if not provided, will prompt)
        #[arg(long)]
        key: Option<String>,
    },
    /// Write a config file with default settings
    Init {
        /// Overwrite an existing config file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Interactive sessions log to a file so log lines don't land in the prompt
    let log_file = match &cli.command {
        Commands::Browse { log_file } => Some(
            log_file
                .clone()
                .unwrap_or_else(|| popcorn_config::PathManager::default().browse_log_file()),
        ),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { query } => search::run_search(query, &output).await,
        Commands::Show { imdb_id } => show::run_show(imdb_id, &output).await,
        Commands::Rate { imdb_id, rating } => watched::run_rate(imdb_id, rating, &output).await,
        Commands::Remove { imdb_id } => watched::run_remove(imdb_id, &output),
        Commands::List => watched::run_list(&output),
        Commands::Browse { .. } => browse::run_browse(&output).await,
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(cmd, &output)
        }
        Commands::Clear { watched, yes } => clear::run_clear(watched, yes, &output),
    }
}
