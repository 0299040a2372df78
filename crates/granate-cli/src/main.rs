#![cfg_attr(test, allow(unused_crate_dependencies))]

use clap::crate_version;
use granate::{Environment, GranateContext};
use runtime_local::NativeFetcher;
use tokio::runtime;

mod args;
mod config;
mod telemetry;

const THREAD_NAME: &str = "granate";

fn main() -> anyhow::Result<()> {
    let args = self::args::parse();
    let config = args.config()?;

    telemetry::init(&args)?;

    let schema = args.schema()?;
    let query = args.query()?;
    let variables = args.variables()?;

    let mut environment = Environment::from_process();
    environment.extend(config.environment);

    let fetcher = NativeFetcher::runtime_fetcher(config.http.timeout)?;

    let context = GranateContext::default()
        .with_environment(environment)
        .with_fetcher(fetcher)
        .with_user_agent(config.http.user_agent);

    let runtime = runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name(THREAD_NAME)
        .build()?;

    let response = runtime.block_on(async move {
        let crate_version = crate_version!();
        tracing::info!("Granate {crate_version}");

        granate::granate(&schema, &query, variables, context).await
    })?;

    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
