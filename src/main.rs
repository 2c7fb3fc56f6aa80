mod auth;
mod board;
mod cli;
mod client;
mod commands;
mod config;
mod error;
mod output;
mod payloads;
#[cfg(test)]
mod testing;
mod types;

use std::error::Error;
use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};
use client::GitHubClient;
use config::Config;
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_tracing(verbose);

    if let Err(e) = run(cli).await {
        output::alert(&format!("Error: {e}"));

        if verbose {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = cause.source();
            }
        }

        std::process::exit(1);
    }
}

/// Logs go to stderr so table and JSON output stay clean. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "gh_kanban=debug" } else { "gh_kanban=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    output::set_format(cli.output_format());
    output::set_quiet(cli.quiet);

    match cli.command {
        // Commands that don't require a token
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "gh-kanban", &mut io::stdout());
        }
        Commands::Init => commands::init::run()?,
        Commands::Login => commands::auth::login(Config::load()?).await?,
        Commands::Logout => commands::auth::logout(Config::load()?)?,
        // Commands that require a token and client
        command => {
            let config = Config::load()?;
            let client = GitHubClient::new(config.token()?, config.api_url())?;

            match command {
                Commands::Whoami => commands::auth::whoami(&client).await?,
                Commands::Repos { search } => commands::repos::list(&client, search).await?,
                Commands::Board(args) => {
                    let repo = config.resolve_repo(args.repository.as_deref().or(cli.repo.as_deref()))?;
                    commands::board::show(&client, &config, &repo, args).await?;
                }
                Commands::Move(args) => {
                    let repo = config.resolve_repo(cli.repo.as_deref())?;
                    commands::board::move_issue(&client, &config, &repo, args).await?;
                }
                Commands::Issue { action } => {
                    let repo = config.resolve_repo(cli.repo.as_deref())?;
                    commands::issues::run(&client, &repo, action).await?;
                }
                Commands::Label { action } => {
                    let repo = config.resolve_repo(cli.repo.as_deref())?;
                    commands::labels::run(&client, &repo, action).await?;
                }
                Commands::Milestone { action } => {
                    let repo = config.resolve_repo(cli.repo.as_deref())?;
                    commands::milestones::run(&client, &repo, action).await?;
                }
                Commands::Completions { .. }
                | Commands::Init
                | Commands::Login
                | Commands::Logout => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
