use clap::Parser;
use sanatorium::cli::{Args, build_config, init_logging, open_storage};
use sanatorium::commands::{Output, run};
use sanatorium::start_client;
use tracing::error;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(storage) = open_storage(&args.state).await else {
        std::process::exit(1);
    };

    let config = build_config(args.api_url, storage);
    let mut client = match start_client(config).await {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to restore session");
            std::process::exit(1);
        }
    };
    client.settle().await;

    let out = Output { json: args.json };
    if let Err(e) = run(&mut client, args.command, args.role, &out).await {
        error!(error = ?e, "Command failed");
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
