use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use engine::{CreateAccountParams, Currency, Engine, Page, TransferFilter, TransferTxParams};
use migration::{Migrator, MigratorTrait};
use serde::Serialize;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "simplebank")]
#[command(about = "Move money between accounts and inspect the ledger")]
struct Cli {
    /// Database connection string; overrides the `database` settings section.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending schema migrations and exit.
    Migrate,
    Account(Account),
    Transfer(Transfer),
    Entry(Entry),
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
    Get(IdArgs),
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    owner: String,
    #[arg(long, default_value = "USD", value_parser = parse_currency)]
    currency: Currency,
    /// Opening balance in minor units.
    #[arg(long, default_value_t = 0)]
    balance: i64,
}

#[derive(Args, Debug)]
struct Transfer {
    #[command(subcommand)]
    command: TransferCommand,
}

#[derive(Subcommand, Debug)]
enum TransferCommand {
    Create(TransferCreateArgs),
    Get(IdArgs),
    List(TransferListArgs),
}

#[derive(Args, Debug)]
struct TransferCreateArgs {
    #[arg(long)]
    from: i64,
    #[arg(long)]
    to: i64,
    /// Amount in minor units.
    #[arg(long)]
    amount: i64,
}

#[derive(Args, Debug)]
struct TransferListArgs {
    #[arg(long)]
    from: Option<i64>,
    #[arg(long)]
    to: Option<i64>,
    #[command(flatten)]
    page: PageArgs,
}

#[derive(Args, Debug)]
struct Entry {
    #[command(subcommand)]
    command: EntryCommand,
}

#[derive(Subcommand, Debug)]
enum EntryCommand {
    Get(IdArgs),
    List(EntryListArgs),
}

#[derive(Args, Debug)]
struct EntryListArgs {
    #[arg(long)]
    account: i64,
    #[command(flatten)]
    page: PageArgs,
}

#[derive(Args, Debug)]
struct IdArgs {
    #[arg(long)]
    id: i64,
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = 50)]
    limit: u64,
    #[arg(long, default_value_t = 0)]
    offset: u64,
}

impl From<PageArgs> for Page {
    fn from(args: PageArgs) -> Self {
        Page {
            limit: args.limit,
            offset: args.offset,
        }
    }
}

fn parse_currency(raw: &str) -> Result<Currency, String> {
    Currency::try_from(raw).map_err(|err| err.to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "simplebank={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| settings.database.url());
    let db = connect(&url).await?;

    let mut builder = Engine::builder().database(db);
    if let Some(ms) = settings.engine.tx_timeout_ms {
        builder = builder.tx_timeout(Duration::from_millis(ms));
    }
    let engine = builder.build().await?;

    match cli.command {
        Command::Migrate => {
            tracing::info!("schema is up to date");
        }
        Command::Account(Account { command }) => match command {
            AccountCommand::Create(args) => {
                let account = engine
                    .create_account(CreateAccountParams {
                        owner: args.owner,
                        balance: args.balance,
                        currency: args.currency,
                    })
                    .await?;
                print_json(&account)?;
            }
            AccountCommand::Get(IdArgs { id }) => print_json(&engine.account(id).await?)?,
        },
        Command::Transfer(Transfer { command }) => match command {
            TransferCommand::Create(args) => {
                let result = engine
                    .transfer_tx(TransferTxParams {
                        from_account_id: args.from,
                        to_account_id: args.to,
                        amount: args.amount,
                    })
                    .await
                    .inspect_err(|err| {
                        if err.is_retryable() {
                            tracing::warn!("transfer failed but may succeed if retried: {err}");
                        }
                    })?;
                print_json(&result)?;
            }
            TransferCommand::Get(IdArgs { id }) => print_json(&engine.transfer(id).await?)?,
            TransferCommand::List(args) => {
                let filter = TransferFilter {
                    from_account_id: args.from,
                    to_account_id: args.to,
                };
                print_json(&engine.list_transfers(filter, args.page.into()).await?)?;
            }
        },
        Command::Entry(Entry { command }) => match command {
            EntryCommand::Get(IdArgs { id }) => print_json(&engine.entry(id).await?)?,
            EntryCommand::List(args) => {
                print_json(&engine.list_entries(args.account, args.page.into()).await?)?;
            }
        },
    }

    Ok(())
}

async fn connect(
    url: &str,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::debug!("connected and migrated");
    Ok(database)
}
