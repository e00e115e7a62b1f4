//! hasty-test-server binary.
//!
//! ```text
//! parse CLI → validate config → load TLS identity → bind both ports
//!     → serve until /done or a signal → exit(0)
//! ```
//!
//! Any startup failure is returned from `main`, which exits non-zero.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use hasty_test_server::config::{schema, validate_config, ServerConfig};
use hasty_test_server::lifecycle::{signals, ShutdownReason};
use hasty_test_server::net::{load_tls_config, BoundListeners};
use hasty_test_server::observability::logging;
use hasty_test_server::{FixtureServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "hasty-test-server")]
#[command(about = "Fixture HTTP/HTTPS server for the hasty client tests", long_about = None)]
struct Cli {
    /// Address both listeners bind to.
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Plaintext HTTP port.
    #[arg(long, default_value_t = schema::DEFAULT_HTTP_PORT)]
    http_port: u16,

    /// TLS port.
    #[arg(long, default_value_t = schema::DEFAULT_HTTPS_PORT)]
    https_port: u16,

    /// PKCS#12 keystore with the server key and certificate chain.
    #[arg(long, default_value = schema::DEFAULT_IDENTITY_PATH)]
    identity: PathBuf,

    /// Keystore passphrase.
    #[arg(long, default_value = "")]
    passphrase: String,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.listener.bind_address = self.bind;
        config.listener.http_port = self.http_port;
        config.listener.https_port = self.https_port;
        config.tls.identity_path = self.identity;
        config.tls.passphrase = self.passphrase;
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = Cli::parse().into_config();
    validate_config(&config)?;

    tracing::info!(
        http_port = config.listener.http_port,
        https_port = config.listener.https_port,
        identity = ?config.tls.identity_path,
        "hasty-test-server starting"
    );

    let tls = load_tls_config(&config.tls)
        .inspect_err(|e| tracing::error!(error = %e, "TLS identity unusable"))?;

    // Handlers go in before the ports accept, so an early signal is not fatal.
    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let listeners = BoundListeners::bind(&config.listener)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Cannot bind listeners"))?;

    let server = FixtureServer::new(config, tls, shutdown);
    let reason = server.run(listeners).await?;

    tracing::info!(%reason, "Shutdown complete");
    if reason == ShutdownReason::Done {
        // Other tasks still parked on the runtime must not hold the exit.
        std::process::exit(0);
    }
    Ok(())
}
