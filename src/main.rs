mod cli;
mod commands;
mod directive;
mod error;
mod library;
mod mcp;
mod ops;
mod page_range;
mod pdf;
mod transform;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use error::{EditError, ErrorKind};
use std::process::ExitCode;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// 2 for bad input, 3 when there was nothing to write, 1 otherwise.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<EditError>().map(EditError::kind) {
        Some(
            ErrorKind::MalformedInput | ErrorKind::OutOfRange | ErrorKind::IncompletePermutation,
        ) => ExitCode::from(2),
        Some(ErrorKind::EmptyResult) => ExitCode::from(3),
        _ => ExitCode::FAILURE,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code(&e)
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Extract {
            path,
            pages,
            output,
        } => {
            commands::extract::run(&path, &pages, &output)?;
        }
        Commands::Edit {
            path,
            directive,
            output,
            labels,
        } => {
            commands::edit::run(&path, &directive, &labels.markers(), &output)?;
        }
        Commands::Plan {
            path,
            directive,
            labels,
        } => {
            commands::plan::run(&path, &directive, &labels.markers())?;
        }
        Commands::Merge { inputs, output } => {
            commands::merge::run(inputs.as_slice(), &output)?;
        }
        Commands::MergeFolder { folder, output } => {
            commands::merge::run_folder(&folder, &output)?;
        }
        Commands::Cover {
            cover,
            body,
            output,
        } => {
            commands::cover::run(&cover, &body, &output)?;
        }
        Commands::Unlock {
            path,
            password,
            output,
        } => {
            commands::unlock::run(&path, &password, &output)?;
        }
        Commands::Text { path, output } => {
            commands::text::run(&path, &output)?;
        }
    }

    Ok(())
}
