mod apps;
mod registry;

use anyhow::{Context, Error};
use clap::Parser;
use tracing::{event, Level};
use wsgi_bridge::ServerConfig;

use crate::registry::AppRegistry;

/// Serve a registered application over HTTP, one request at a time.
#[derive(Parser)]
#[command(name = "wsgi-serve")]
struct Cli {
    /// Application to serve, as `module:attribute`.
    app: String,

    /// Host to bind.
    #[arg(long, env = "WSGI_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to bind.
    #[arg(long, env = "WSGI_PORT", default_value_t = 3456)]
    port: u16,
}

fn main() -> Result<(), Error> {
    devutils::init_logging();

    let cli = Cli::parse();

    let registry = AppRegistry::with_demos();
    let app = registry.resolve(&cli.app)?;

    let config = ServerConfig::default().with_addr(cli.host, cli.port);
    let server = wsgi_bridge::make_server(config, app)?;

    event!(
        Level::INFO,
        app = %cli.app,
        port = server.endpoint().port(),
        "serving HTTP"
    );
    server.serve_forever().context("failed to accept connection")?;

    Ok(())
}
