use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use simplelog::{ColorChoice, LevelFilter, SimpleLogger, TermLogger, TerminalMode};

use coap_get::server::{CoAPServer, DEFAULT_DATAFILE};

/// Serve GET /sensor with the last non-empty line of a data file
#[derive(PartialEq, Clone, Debug, Parser)]
#[command(name = "coap-server", version)]
pub struct Options {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:5683")]
    pub bind: SocketAddr,

    /// File holding one reading per line
    #[arg(long, env = "COAP_DATAFILE", default_value = DEFAULT_DATAFILE)]
    pub datafile: PathBuf,

    /// Configure app logging levels (off, error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load options
    let opts = Options::parse();

    // Initialise logging
    let log_config = simplelog::ConfigBuilder::new().build();
    if TermLogger::init(
        opts.log_level,
        log_config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .is_err()
    {
        let _ = SimpleLogger::init(opts.log_level, log_config);
    }

    let server = match CoAPServer::bind(opts.bind, opts.datafile.clone()).await {
        Ok(server) => server,
        Err(e) => {
            error!("bind {} failed: {}", opts.bind, e);
            return ExitCode::FAILURE;
        }
    };
    println!("CoAP sensor server on {}", opts.bind);
    println!("datafile={}", server.datafile().display());

    tokio::select! {
        _ = server.run() => {}
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }
    ExitCode::SUCCESS
}
