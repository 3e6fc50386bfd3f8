use clap::Parser;
use hotelhub::cli::{
    Args, build_config, init_logging, load_token_secrets, open_database, validate_public_origin,
};
use hotelhub::run_server;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(secrets) = load_token_secrets(
        args.access_token_secret_file.as_deref(),
        args.refresh_token_secret_file.as_deref(),
    ) else {
        std::process::exit(1);
    };

    let Some(public_origin) = validate_public_origin(&args.public_origin) else {
        std::process::exit(1);
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let local_addr = listener.local_addr().unwrap_or_else(|e| {
        error!(error = %e, "Failed to read listener address");
        std::process::exit(1);
    });

    let config = build_config(db, &public_origin, secrets, args.token_transport);

    info!(
        address = %local_addr,
        transport = ?config.transport,
        secure_cookies = config.secure_cookies,
        "Listening"
    );

    if let Err(e) = run_server(config, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
