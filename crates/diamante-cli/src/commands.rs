//! CLI command implementations.

use crate::AppContext;
use diamante_types::TransactionRecord;
use diamante_wallet::flows;
use diamante_wallet::{
    AccountRegistry, ClientConfig, Fetch, FileStore, Gateway, Profile, Prompt, Registry, Removal,
    Submission, WalletError,
};
use std::io::Write;

type Result = std::result::Result<(), Box<dyn std::error::Error>>;

// ─── Helpers ────────────────────────────────────────────────────────────────

fn open_registry(ctx: &AppContext) -> AccountRegistry<FileStore> {
    log::debug!("opening keypair store in {}", ctx.store_dir.display());
    AccountRegistry::load(FileStore::new(&ctx.store_dir))
}

/// Registry with `--account` applied.
fn open_selected(ctx: &AppContext) -> std::result::Result<Registry, Box<dyn std::error::Error>> {
    let mut accounts = open_registry(ctx);
    if let Some(number) = ctx.account {
        let index = account_index(number)?;
        if !accounts.select(index) {
            return Err(format!(
                "no account #{} ({} stored)",
                number,
                accounts.registry().len()
            )
            .into());
        }
    }
    Ok(accounts.registry().clone())
}

/// Accounts are numbered from 1 on screen.
fn account_index(number: usize) -> std::result::Result<usize, Box<dyn std::error::Error>> {
    number
        .checked_sub(1)
        .ok_or_else(|| "account numbers start at 1".into())
}

fn gateway(ctx: &AppContext) -> std::result::Result<Gateway, Box<dyn std::error::Error>> {
    let config = |url: &str| ClientConfig {
        url: url.to_string(),
        timeout: ctx.timeout,
        retries: ctx.retries,
        ..Default::default()
    };
    Ok(Gateway::with_config(config(&ctx.backend_url), config(&ctx.ledger_url))?)
}

fn prompt_yes_no(prompt: &Prompt) -> bool {
    println!("{}", prompt.title);
    print!("{} [y/N] ", prompt.message);
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_submission(sub: &Submission) -> Result {
    println!("{}", sub.message());
    if sub.is_success() {
        Ok(())
    } else {
        Err("request failed".into())
    }
}

fn print_transactions(txs: &Fetch<Vec<TransactionRecord>>) {
    match txs {
        Fetch::Ok(records) => {
            for tx in records {
                println!("Transaction ID: {}", tx.id);
                println!("  Amount: {}", tx.amount().unwrap_or_default());
                println!("  Date:   {}", tx.created_at);
            }
        }
        Fetch::Empty => println!("No transactions."),
        Fetch::Failed(reason) => println!("Could not load transactions: {}", reason),
    }
}

// ─── Commands ───────────────────────────────────────────────────────────────

pub async fn create_account(ctx: &AppContext) -> Result {
    let gw = gateway(ctx)?;
    let mut accounts = open_registry(ctx);

    let keypair = match flows::create_account(&gw, &mut accounts).await {
        Ok(keypair) => keypair,
        Err(WalletError::NotSaved { keypair, source }) => {
            println!("Account created but NOT saved. Record these keys now:");
            println!("Public Key: {}", keypair.public_key);
            println!("Secret Key: {}", keypair.secret);
            return Err(source);
        }
        Err(e) => return Err(e.into()),
    };
    let number = accounts.registry().len();

    println!("Account #{} created.", number);
    println!("Public Key: {}", keypair.public_key);
    println!("Secret Key: {}", keypair.secret);
    println!();
    println!("Keep the secret key safe; it is stored unencrypted in {}.", ctx.store_dir.display());
    Ok(())
}

pub fn list_accounts(ctx: &AppContext) -> Result {
    let registry = open_selected(ctx)?;

    if registry.is_empty() {
        println!("No accounts. Run 'create' to generate one.");
        return Ok(());
    }

    for (i, kp) in registry.keypairs().iter().enumerate() {
        let marker = if registry.selected_index() == Some(i) { "*" } else { " " };
        println!("{} Account {}: {}", marker, i + 1, kp.public_key);
    }
    Ok(())
}

pub async fn fund_account(ctx: &AppContext) -> Result {
    let registry = open_selected(ctx)?;
    let gw = gateway(ctx)?;

    let sub = flows::fund_selected(&gw, &registry).await?;
    print_submission(&sub)
}

pub async fn show_balance(ctx: &AppContext) -> Result {
    let registry = open_selected(ctx)?;
    let account = registry
        .selected()
        .ok_or(WalletError::NoSelection)?;
    let gw = gateway(ctx)?;

    let balance = gw.fetch_balance(&account.public_key).await;
    println!("Public Key: {}", account.public_key);
    println!("Balance:    {}", balance.display_text());
    Ok(())
}

pub async fn show_history(ctx: &AppContext) -> Result {
    let registry = open_selected(ctx)?;
    let account = registry
        .selected()
        .ok_or(WalletError::NoSelection)?;
    let gw = gateway(ctx)?;

    let txs = gw.fetch_transactions(&account.public_key).await;
    print_transactions(&txs);
    Ok(())
}

pub async fn show_profile(ctx: &AppContext) -> Result {
    let registry = open_selected(ctx)?;
    let gw = gateway(ctx)?;

    let Some(profile) = Profile::load(&gw, &registry).await else {
        println!("No accounts. Run 'create' to generate one.");
        return Ok(());
    };

    println!("Selected Account:");
    println!("  Public Key: {}", profile.keypair.public_key);
    println!("  Secret Key: {}", profile.keypair.secret);
    println!("  Balance:    {}", profile.balance.display_text());
    println!();
    println!("Transactions:");
    print_transactions(&profile.transactions);
    Ok(())
}

pub fn remove_account(ctx: &AppContext, number: usize, yes: bool) -> Result {
    let index = account_index(number)?;
    let mut accounts = open_registry(ctx);

    let outcome = if yes {
        accounts.remove(index, &mut |_: &Prompt| true)?
    } else {
        accounts.remove(index, &mut prompt_yes_no)?
    };

    match outcome {
        Removal::Removed(kp) => {
            println!("Removed account {} ({}).", number, kp.public_key);
            Ok(())
        }
        Removal::Cancelled => {
            println!("Cancelled.");
            Ok(())
        }
        Removal::OutOfRange => Err(format!(
            "no account #{} ({} stored)",
            number,
            accounts.registry().len()
        )
        .into()),
    }
}

pub async fn manage_data(ctx: &AppContext, secret: &str, key: &str, value: &str) -> Result {
    let gw = gateway(ctx)?;
    let sub = gw.manage_data(secret, key, value).await;
    print_submission(&sub)
}

pub async fn make_payment(ctx: &AppContext, secret: &str, to: &str, amount: &str) -> Result {
    let gw = gateway(ctx)?;
    let sub = gw.make_payment(secret, to, amount).await;
    print_submission(&sub)
}

pub async fn transfer_asset(ctx: &AppContext, to: &str, amount: &str) -> Result {
    let registry = open_selected(ctx)?;
    let gw = gateway(ctx)?;

    if let Some(account) = registry.selected() {
        println!("Selected Account: {}", account.public_key);
    }
    let sub = flows::transfer_from_selected(&gw, &registry, to, amount).await?;
    print_submission(&sub)
}
