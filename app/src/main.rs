use std::{path::PathBuf, process::exit, str::FromStr, sync::Arc};

use alloy_primitives::Address;
use anyhow::Context;
use clap::{Parser, Subcommand};
use shared::{
    alert::Alert,
    config::{load_config_file, AppConfig},
    contract::{find_task, ContractReader, TaskContract},
    error::SyncError,
    interaction::TaskView,
    log::init_log,
    rpc::RpcClient,
    sync::{spawn_count_watcher, TaskListSynchronizer},
    types::TaskId,
    wallet::WalletSession,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    signal,
};
use tracing::*;

use crate::{
    spinner::Spinner,
    view::{render_board, render_detail, state_alert},
};

mod spinner;
mod view;

#[derive(Parser, Debug)]
#[command(about, version)]
struct Args {
    #[arg(
        long,
        value_name = "PATH",
        help = "Config file",
        default_value = "./config.json",
        global = true
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "List every task of the contract")]
    List,

    #[command(about = "Show one task")]
    Show {
        #[arg(value_name = "INDEX", help = "1-based task index")]
        index: u64,
    },

    #[command(about = "Keep the task list in sync with the contract")]
    Watch,

    #[command(about = "Remember a connected wallet account")]
    Connect {
        #[arg(value_name = "ADDRESS")]
        address: String,
    },

    #[command(about = "Forget the connected wallet account")]
    Disconnect,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_log("warn");

    let args = Args::parse();

    let cfg = load_config_file(&args.config)?;

    debug!("VERSION: {}", env!("CARGO_PKG_VERSION"));
    debug!("config: {cfg:?}");

    let network = cfg.network()?;
    let rpc = RpcClient::new(&network.rpc, cfg.sync.request_timeout())?
        .with_retry(cfg.sync.retry_times, cfg.sync.retry_delay_ms);
    let contract = Arc::new(TaskContract::new(rpc, cfg.contract));

    let mut wallet = WalletSession::load(&cfg.wallet.session_file);

    match args.command {
        Command::List => list(contract, &cfg, &wallet).await,
        Command::Show { index } => show(contract, TaskId(index), &network.currency).await,
        Command::Watch => watch(contract, &cfg, &wallet).await,
        Command::Connect { address } => connect(&contract, &cfg, &mut wallet, &address).await,
        Command::Disconnect => {
            wallet.disconnect().context("fail to remove wallet session")?;
            print_alert(&Alert::info("Wallet disconnected"));
            Ok(())
        }
    }
}

fn print_alert(alert: &Alert) {
    if let Some(line) = alert.render() {
        println!("{line}");
    }
}

async fn list(
    contract: Arc<TaskContract>,
    cfg: &AppConfig,
    wallet: &WalletSession,
) -> anyhow::Result<()> {
    let currency = &cfg.network()?.currency;
    let sync = TaskListSynchronizer::new(contract).with_concurrency(cfg.sync.concurrency);

    let result = {
        let _spinner = Spinner::start("Loading tasks...");
        sync.refresh().await
    };

    if let Err(err) = result {
        error!("{err}");
        print_alert(&Alert::error(format!("Failed to load tasks: {err}")));
        exit(1);
    }

    println!("{}", render_board(&sync.tasks(), currency, wallet.is_connected()));
    Ok(())
}

async fn show(contract: Arc<TaskContract>, id: TaskId, currency: &str) -> anyhow::Result<()> {
    let result = {
        let _spinner = Spinner::start(&format!("Loading task {id}..."));
        find_task(contract.as_ref(), id).await
    };

    match result {
        Ok(Some(task)) => println!("{}", render_detail(&TaskView::new(id, &task, currency))),
        Ok(None) => print_alert(&Alert::warning(format!("Task {id} does not exist"))),
        Err(err) => {
            error!("{err}");
            print_alert(&Alert::error(format!("Failed to load task {id}: {err}")));
            exit(1);
        }
    }
    Ok(())
}

async fn watch(
    contract: Arc<TaskContract>,
    cfg: &AppConfig,
    wallet: &WalletSession,
) -> anyhow::Result<()> {
    let reader: Arc<dyn ContractReader> = contract;
    let sync =
        Arc::new(TaskListSynchronizer::new(reader.clone()).with_concurrency(cfg.sync.concurrency));
    let mut tasks = sync.subscribe_tasks();
    let mut state = sync.subscribe_state();

    let (counts, watcher) = spawn_count_watcher(reader, cfg.sync.poll_interval());
    let handle = sync.follow(counts);

    let currency = &cfg.network()?.currency;
    let connected = wallet.is_connected();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    info!("watching tasks, `r` + Enter to retry, `q` + Enter to quit");

    loop {
        tokio::select! {
            Ok(()) = tasks.changed() => {
                let list = tasks.borrow_and_update().clone();
                println!("\n{}", render_board(&list, currency, connected));
            }
            Ok(()) = state.changed() => {
                let current = state.borrow_and_update().clone();
                debug!("sync state: {current:?}");
                if let Some(alert) = state_alert(&current) {
                    print_alert(&alert);
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) if line.trim() == "r" => {
                        let sync = sync.clone();
                        tokio::spawn(async move {
                            // pass failures already show up through the state
                            if let Err(err @ SyncError::Count(_)) = sync.refresh().await {
                                print_alert(&Alert::error(format!("{err}. Enter `r` to retry.")));
                            }
                        });
                    }
                    Ok(Some(line)) if line.trim() == "q" => break,
                    Ok(Some(_)) => {}
                    Ok(None) | Err(_) => stdin_open = false,
                }
            }
            _ = signal::ctrl_c() => {
                info!("ctrl+c received");
                break;
            }
        }
    }

    drop(handle);
    watcher.abort();
    Ok(())
}

async fn connect(
    contract: &TaskContract,
    cfg: &AppConfig,
    wallet: &mut WalletSession,
    address: &str,
) -> anyhow::Result<()> {
    let account = Address::from_str(address)
        .map_err(|err| anyhow::anyhow!("invalid address {address}: {err}"))?;
    let network = cfg.network()?;

    match contract.rpc().chain_id().await {
        Ok(chain_id) if chain_id != network.chain_id => {
            print_alert(&Alert::warning(format!(
                "RPC reports chain {chain_id}, expected {} ({})",
                network.chain_id, network.name
            )));
        }
        Ok(_) => {}
        Err(err) => warn!("fail to check chain id: {err}"),
    }

    wallet.connect(account, network.chain_id).context("fail to save wallet session")?;
    print_alert(&Alert::success(format!("Connected {account} on {}", network.name)));
    Ok(())
}
