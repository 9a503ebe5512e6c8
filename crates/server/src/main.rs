use std::future::IntoFuture;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tracing::{error, info, warn};

use blobvault_core::Profile;
use blobvault_server::api::{self, AppState};
use blobvault_server::auth::{TokenIssuer, TokenVerifier};
use blobvault_server::backend_factory::{create_backend, create_gateway};
use blobvault_server::config::BlobvaultConfig;
use blobvault_server::crypto::{
    CryptoError, MASTER_KEY_ENV, MasterKey, encrypt_value, parse_master_key, resolve_secret,
};

/// Per-identity blob storage gateway.
#[derive(Parser, Debug)]
#[command(name = "blobvault-server", about = "Per-identity blob storage gateway")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "blobvault.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a value for use in blobvault.toml. Reads plaintext from stdin.
    Encrypt,
    /// Print a bearer token signed with the configured secret and issuer.
    IssueToken {
        /// Login placed in the token's profile claim.
        #[arg(long)]
        login: String,
        /// Display name.
        #[arg(long)]
        name: Option<String>,
        /// Contact email.
        #[arg(long)]
        email: Option<String>,
        /// Lifetime in seconds. Defaults to `auth.token_ttl_seconds`.
        #[arg(long)]
        ttl_seconds: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Commands::Encrypt) = cli.command {
        init_cli_tracing();
        return run_encrypt();
    }

    // Load configuration from TOML file, or use defaults if the file does not exist.
    let config_found = Path::new(&cli.config).exists();
    let mut config: BlobvaultConfig = if config_found {
        toml::from_str(&std::fs::read_to_string(&cli.config)?)?
    } else {
        BlobvaultConfig::default()
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if let Some(Commands::IssueToken {
        login,
        name,
        email,
        ttl_seconds,
    }) = cli.command
    {
        init_cli_tracing();
        let mut profile = Profile::new(login);
        profile.name = name;
        profile.email = email;
        let ttl = Duration::from_secs(ttl_seconds.unwrap_or(config.auth.token_ttl_seconds));
        return run_issue_token(&config, &profile, ttl);
    }

    let telemetry_guard = blobvault_server::telemetry::init(&config.telemetry);
    if !config_found {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    config.validate()?;
    let master_key = load_master_key()?;
    let (secret, issuer) = signing_settings(&config, master_key.as_ref())?;
    let verifier = TokenVerifier::new(&secret, issuer).with_leeway(config.auth.leeway_seconds);
    info!(
        issuer = verifier.issuer(),
        leeway_seconds = config.auth.leeway_seconds,
        "token verifier ready"
    );

    let backend = create_backend(&config.storage).await?;
    let gateway = create_gateway(backend, &config.storage)?;
    info!(
        backend = gateway.backend_name(),
        namespace_root = gateway.namespace_root(),
        timeout_ms = config.storage.timeout_ms,
        max_retries = config.storage.max_retries,
        allowed_content_types = ?config.blob.allowed_content_types,
        "blob gateway ready"
    );
    if let Err(e) = gateway.health_check().await {
        warn!(error = %e, "backend health check failed at startup, serving anyway");
    }
    if config.blob.allowed_content_types.is_empty() {
        warn!("blob.allowed_content_types is empty; every upload will be rejected");
    }

    let state = AppState {
        gateway: Arc::new(gateway),
        policy: Arc::new(config.blob.policy()),
        verifier: Arc::new(verifier),
        max_blob_bytes: config.server.max_blob_bytes,
    };
    let app = api::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "blobvault-server listening");

    // Serve until a signal arrives, then give in-flight requests a bounded
    // window to finish.
    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel();
    let serve = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();
    let mut serve = std::pin::pin!(serve);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    tokio::select! {
        result = &mut serve => result?,
        Ok(()) = signalled_rx => {
            if let Ok(result) = tokio::time::timeout(shutdown_timeout, serve).await {
                result?;
            } else {
                warn!(
                    timeout_secs = config.server.shutdown_timeout_seconds,
                    "shutdown timeout exceeded, dropping in-flight requests"
                );
            }
        }
    }

    telemetry_guard.shutdown();

    info!("blobvault-server shut down");
    Ok(())
}

fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_master_key() -> Result<Option<MasterKey>, CryptoError> {
    std::env::var(MASTER_KEY_ENV)
        .ok()
        .map(|raw| parse_master_key(&raw))
        .transpose()
}

/// Resolve the signing secret (decrypting it if needed) and the issuer.
fn signing_settings(
    config: &BlobvaultConfig,
    master_key: Option<&MasterKey>,
) -> Result<(SecretString, String), Box<dyn std::error::Error>> {
    let raw = config
        .auth
        .jwt_secret
        .as_deref()
        .ok_or("auth.jwt_secret is required")?;
    let issuer = config
        .auth
        .issuer
        .clone()
        .ok_or("auth.issuer is required")?;
    Ok((resolve_secret(raw, master_key)?, issuer))
}

/// Run the `issue-token` subcommand: print a signed token to stdout.
fn run_issue_token(
    config: &BlobvaultConfig,
    profile: &Profile,
    ttl: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    if !profile.has_valid_login() {
        return Err(format!("invalid login '{}'", profile.login).into());
    }
    let master_key = load_master_key()?;
    let (secret, issuer) = signing_settings(config, master_key.as_ref())?;

    let token = TokenIssuer::new(&secret, issuer).issue(profile, ttl)?;
    info!(login = %profile.login, ttl_secs = ttl.as_secs(), "issued token");
    println!("{token}");
    Ok(())
}

/// Run the `encrypt` subcommand: read plaintext from stdin, output ENC[...] to stdout.
fn run_encrypt() -> Result<(), Box<dyn std::error::Error>> {
    let master_key_raw = std::env::var(MASTER_KEY_ENV).map_err(|_| {
        format!("{MASTER_KEY_ENV} environment variable is required for the encrypt command")
    })?;
    let master_key = parse_master_key(&master_key_raw)?;

    let mut plaintext = String::new();
    std::io::Read::read_to_string(&mut std::io::stdin(), &mut plaintext)?;
    let plaintext = plaintext.trim_end_matches('\n');

    println!("{}", encrypt_value(plaintext, &master_key)?);
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
