use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use items::cli::{join_words, Cli, Command};
use items::{output, server, Config, Item, ItemPatch, ItemsError, State};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

/// Turn the recoverable repository errors into a message for the user.
/// Anything else is passed on and ends the process.
fn report(result: Result<()>) -> Result<()> {
    let Err(e) = result else {
        return Ok(());
    };
    let message = match e.downcast_ref::<ItemsError>() {
        Some(ItemsError::InvalidItemId(id)) => Some(format!("Error: Invalid item id {id}.")),
        Some(ItemsError::MissingSummary) => Some("Error: missing summary.".to_string()),
        _ => None,
    };
    match message {
        Some(m) => {
            println!("{m}");
            Ok(())
        }
        None => Err(e),
    }
}

fn list(config: &Config, owner: Option<&str>, state: Option<&str>, json: bool) -> Result<()> {
    let items = config.with_db(|db| Ok(db.list_items(owner, state)?))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        print!("{}", output::format_item_table(&items));
    }
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.db_dir.as_deref())?;
    log::debug!("item database directory: {}", config.db_dir.display());

    let Some(command) = cli.command else {
        return list(&config, None, None, false);
    };

    match command {
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }

        Command::Add { summary, owner } => {
            let item = Item {
                id: None,
                summary: join_words(&summary).unwrap_or_default(),
                owner,
                state: State::Todo.as_str().to_string(),
            };
            report(config.with_db(|db| {
                db.add_item(&item)?;
                Ok(())
            }))?;
        }

        Command::Delete { id } => {
            report(config.with_db(|db| Ok(db.delete_item(id)?)))?;
        }

        Command::List { owner, state, json } => {
            list(&config, owner.as_deref(), state.as_deref(), json)?;
        }

        Command::Update { id, owner, summary } => {
            let mods = ItemPatch {
                summary: summary.as_deref().and_then(join_words),
                owner,
                state: None,
            };
            report(config.with_db(|db| Ok(db.update_item(id, &mods)?)))?;
        }

        Command::Start { id } => {
            report(config.with_db(|db| Ok(db.start(id)?)))?;
        }

        Command::Finish { id } => {
            report(config.with_db(|db| Ok(db.finish(id)?)))?;
        }

        Command::Config => {
            let path = config.with_db(|db| Ok(db.path().to_path_buf()))?;
            println!("{}", path.display());
        }

        Command::Count => {
            let count = config.with_db(|db| Ok(db.count()?))?;
            println!("{count}");
        }

        Command::Serve { bind, static_dir } => {
            let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(server::serve(config, &bind, static_dir.map(PathBuf::from)))?;
        }
    }

    Ok(())
}
