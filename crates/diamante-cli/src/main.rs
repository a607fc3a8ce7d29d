use clap::{Parser, Subcommand};
use diamante_types::constants::{DEFAULT_BACKEND_URL, TESTNET_LEDGER_URL};
use std::path::PathBuf;
use std::time::Duration;

mod commands;

/// Diamante wallet command-line interface.
#[derive(Parser)]
#[command(name = "diamante-wallet-cli")]
#[command(about = "Command-line wallet for the Diamante testnet")]
#[command(version)]
struct Cli {
    /// Wallet backend URL (key issuance, funding, payments).
    #[arg(long, default_value = DEFAULT_BACKEND_URL)]
    backend: String,

    /// Ledger API URL (balances, transaction history).
    #[arg(long, default_value = TESTNET_LEDGER_URL)]
    ledger: String,

    /// Directory holding the stored keypairs.
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Account to act on, as numbered by `accounts` (defaults to the first).
    #[arg(long, short = 'a')]
    account: Option<usize>,

    /// Extra attempts for ledger reads that fail transiently.
    /// Backend actions are always sent once.
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new keypair and store it.
    Create,

    /// List stored accounts.
    Accounts,

    /// Fund the selected account on testnet.
    Fund,

    /// Show the selected account's balance.
    Balance,

    /// Show the selected account's transactions.
    History,

    /// Show keys, balance and transactions of the selected account.
    Profile,

    /// Remove a stored account.
    Remove {
        /// Account number, as shown by `accounts`.
        number: usize,

        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Write a key/value data entry on an account.
    ManageData {
        /// Secret key of the account to write to.
        #[arg(long)]
        secret: String,

        #[arg(long)]
        key: String,

        #[arg(long)]
        value: String,
    },

    /// Send a native-asset payment.
    Pay {
        /// Sender secret key.
        #[arg(long)]
        secret: String,

        /// Receiver public key.
        #[arg(long)]
        to: String,

        #[arg(long)]
        amount: String,
    },

    /// Transfer an asset from the selected account.
    Transfer {
        /// Recipient address.
        #[arg(long, default_value = "")]
        to: String,

        #[arg(long, default_value = "")]
        amount: String,
    },
}

/// Application context shared across commands.
pub struct AppContext {
    backend_url: String,
    ledger_url: String,
    store_dir: PathBuf,
    account: Option<usize>,
    retries: u32,
    timeout: Duration,
}

impl AppContext {
    fn from_cli(cli: &Cli) -> Self {
        let store_dir = cli.store_dir.clone().unwrap_or_else(default_store_dir);

        Self {
            backend_url: cli.backend.clone(),
            ledger_url: cli.ledger.clone(),
            store_dir,
            account: cli.account,
            retries: cli.retries,
            timeout: Duration::from_secs(cli.timeout),
        }
    }
}

fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("diamante")
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let ctx = AppContext::from_cli(&cli);

    let result = match cli.command {
        Commands::Create => commands::create_account(&ctx).await,
        Commands::Accounts => commands::list_accounts(&ctx),
        Commands::Fund => commands::fund_account(&ctx).await,
        Commands::Balance => commands::show_balance(&ctx).await,
        Commands::History => commands::show_history(&ctx).await,
        Commands::Profile => commands::show_profile(&ctx).await,
        Commands::Remove { number, yes } => commands::remove_account(&ctx, number, yes),
        Commands::ManageData { secret, key, value } => {
            commands::manage_data(&ctx, &secret, &key, &value).await
        }
        Commands::Pay { secret, to, amount } => {
            commands::make_payment(&ctx, &secret, &to, &amount).await
        }
        Commands::Transfer { to, amount } => commands::transfer_asset(&ctx, &to, &amount).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
