use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use finwise_core::Category;
use finwise_finance::insights::TREND_MONTHS;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod config;
mod llm_stream;
mod state;

#[derive(Parser, Debug)]
#[command(name = "finwise", version, about = "Personal finance scoring and planning")]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage ~/.finwise/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Preview a CSV statement, optionally saving it
    Import {
        csv: PathBuf,

        /// Header of the date column (default from config)
        #[arg(long)]
        date_column: Option<String>,

        /// Header of the description column (default from config)
        #[arg(long)]
        description_column: Option<String>,

        /// Header of the amount column (default from config)
        #[arg(long)]
        amount_column: Option<String>,

        /// Override a row's category, e.g. `3=shopping` (rows numbered from 1)
        #[arg(long = "set-category", value_name = "N=TAG", value_parser = parse_category_override)]
        set_category: Vec<(usize, Category)>,

        /// Save the rows instead of only previewing them
        #[arg(long)]
        commit: bool,
    },

    /// Record a transaction by hand
    Add {
        amount: f64,
        description: String,

        #[arg(long)]
        category: Category,

        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        recurring: bool,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Show transactions, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Change fields of a transaction
    Edit {
        id: String,

        #[arg(long)]
        amount: Option<f64>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category: Option<Category>,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        recurring: Option<bool>,

        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,

        #[arg(long)]
        clear_notes: bool,
    },

    /// Remove a transaction
    Delete { id: String },

    /// Recompute the financial profile
    Score {
        /// Score as of this date without saving
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Recommended actions
    Actions {
        #[command(subcommand)]
        command: Option<ActionsCommand>,
    },

    /// Score the risk tolerance quiz and save the result
    Quiz {
        /// One score (1-3) per question, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        answers: Vec<u8>,
    },

    /// Health label, spending breakdown and monthly trend
    Insights {
        #[arg(long, default_value_t = TREND_MONTHS)]
        months: u32,
    },

    /// Ask the finance assistant
    Chat {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum ActionsCommand {
    List,
    Regenerate,
    /// Flip an item between done and not done
    Toggle { id: String },
}

fn parse_category_override(s: &str) -> std::result::Result<(usize, Category), String> {
    let (n, tag) = s
        .split_once('=')
        .ok_or_else(|| format!("expected N=TAG, got {s:?}"))?;
    let n: usize = n
        .trim()
        .parse()
        .map_err(|_| format!("bad row number {n:?}"))?;
    if n == 0 {
        return Err("rows are numbered from 1".to_string());
    }
    let category = tag.trim().parse::<Category>().map_err(|e| e.to_string())?;
    Ok((n - 1, category))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG > --verbose > info
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => commands::show_config()?,
        },

        Command::Import {
            csv,
            date_column,
            description_column,
            amount_column,
            set_category,
            commit,
        } => {
            let cfg = config::load_config()?;
            let mut mapping = cfg.import.mapping();
            if let Some(c) = date_column {
                mapping.date = c;
            }
            if let Some(c) = description_column {
                mapping.description = c;
            }
            if let Some(c) = amount_column {
                mapping.amount = c;
            }
            commands::import(&cfg, &csv, &mapping, &set_category, commit).await?;
        }

        Command::Add {
            amount,
            description,
            category,
            date,
            recurring,
            notes,
        } => {
            let on = date.unwrap_or_else(|| commands::Clock::now().today);
            let mut txn = finwise_core::NewTransaction::new(amount, description, category, on)
                .recurring(recurring);
            if let Some(n) = notes {
                txn = txn.with_notes(n);
            }
            commands::add(&config::load_config()?, txn).await?;
        }

        Command::List { limit } => commands::list(&config::load_config()?, limit).await?,

        Command::Edit {
            id,
            amount,
            description,
            category,
            date,
            recurring,
            notes,
            clear_notes,
        } => {
            let update = finwise_core::TransactionUpdate {
                amount,
                description,
                category,
                transaction_date: date,
                is_recurring: recurring,
                notes: if clear_notes { Some(None) } else { notes.map(Some) },
            };
            commands::edit(&config::load_config()?, &id, update).await?;
        }

        Command::Delete { id } => commands::delete(&config::load_config()?, &id).await?,

        Command::Score { as_of } => commands::score(&config::load_config()?, as_of).await?,

        Command::Actions { command } => {
            let cfg = config::load_config()?;
            match command.unwrap_or(ActionsCommand::List) {
                ActionsCommand::List => commands::list_actions(&cfg).await?,
                ActionsCommand::Regenerate => commands::regenerate_actions(&cfg).await?,
                ActionsCommand::Toggle { id } => commands::toggle_action(&cfg, &id).await?,
            }
        }

        Command::Quiz { answers } => commands::quiz(&config::load_config()?, &answers).await?,

        Command::Insights { months } => {
            commands::insights(&config::load_config()?, months).await?
        }

        Command::Chat { message } => {
            commands::chat(&config::load_config()?, &message.join(" ")).await?
        }
    }

    Ok(())
}
