use std::{path::PathBuf, sync::Arc};

use actix_web::{web, App, HttpServer};
use clap::Parser;
use shared::{
    config::load_config_file,
    contract::{ContractReader, TaskContract},
    log::init_log,
    rpc::RpcClient,
    sync::{spawn_count_watcher, TaskListSynchronizer},
};
use tracing::*;

use crate::restful::RESTful;

mod restful;
mod routes;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(about, version)]
struct Args {
    #[arg(long, help = "Config the server listen port", default_value = "8080")]
    port: u16,

    #[arg(long, value_name = "PATH", help = "Config file", default_value = "./config.json")]
    config: PathBuf,
}

pub(crate) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::tasks).service(routes::task).service(routes::sync);
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_log("server=info,shared=info,warn");

    info!("VERSION:{}", VERSION);

    let args = Args::parse();

    let cfg = load_config_file(&args.config)?;

    debug!("config: {cfg:?}");

    let network = cfg.network()?;
    info!("network: {} ({}), contract: {}", network.name, network.chain_id, cfg.contract);

    let rpc = RpcClient::new(&network.rpc, cfg.sync.request_timeout())?
        .with_retry(cfg.sync.retry_times, cfg.sync.retry_delay_ms);
    let reader: Arc<dyn ContractReader> = Arc::new(TaskContract::new(rpc, cfg.contract));

    let synchronizer =
        Arc::new(TaskListSynchronizer::new(reader.clone()).with_concurrency(cfg.sync.concurrency));

    let (counts, watcher) = spawn_count_watcher(reader, cfg.sync.poll_interval());
    let handle = synchronizer.follow(counts);

    let restful = Arc::new(RESTful {
        synchronizer,
        currency: network.currency.clone(),
    });

    HttpServer::new(move || {
        App::new().app_data(web::Data::new(restful.clone())).configure(configure)
    })
    .workers(4)
    .bind(("0.0.0.0", args.port))?
    .run()
    .await?;

    drop(handle);
    watcher.abort();
    Ok(())
}
