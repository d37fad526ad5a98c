use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{debug, info};
use simplelog::{ColorChoice, LevelFilter, SimpleLogger, TermLogger, TerminalMode};

use coap_get::client::{
    parse_coap_url, url_path_segments, CoAPClientAsync, CoAPResponse, ClientError, RequestOptions,
    DEFAULT_PORT,
};

const EXIT_OK: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_TIMEOUT: u8 = 1;
const EXIT_INVALID_RESPONSE: u8 = 2;

/// Send a CoAP GET to coap://<host>:<port>/<path> and print the reply
#[derive(PartialEq, Clone, Debug, Parser)]
#[command(name = "coap-get", version)]
pub struct Options {
    /// Target host or IP address
    #[arg(long, required_unless_present = "url")]
    pub host: Option<String>,

    /// UDP port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Resource path
    #[arg(long, default_value = "sensor")]
    pub path: String,

    /// Full target as coap://host[:port]/path, instead of --host/--port/--path
    #[arg(long, conflicts_with = "host")]
    pub url: Option<String>,

    /// Seconds to wait for the reply
    #[arg(long, default_value_t = 5.0, allow_negative_numbers = true)]
    pub timeout: f64,

    /// Number of random token bytes (0 to 8)
    #[arg(long = "token-length", default_value_t = 4)]
    pub token_length: usize,

    /// Configure app logging levels (off, error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: LevelFilter,
}

#[derive(Debug)]
struct Target {
    host: String,
    port: u16,
    /// Path as shown to the user
    path: String,
    /// Uri-Path values put on the wire
    segments: Vec<String>,
}

impl Options {
    fn target(&self) -> Result<Target, String> {
        match (&self.url, &self.host) {
            (Some(url), _) => {
                let (_scheme, host, port, path) =
                    parse_coap_url(url).map_err(|e| format!("{}: {}", url, e))?;
                let segments = url_path_segments(url).map_err(|e| format!("{}: {}", url, e))?;
                Ok(Target {
                    host,
                    port,
                    path: path.trim_start_matches('/').to_string(),
                    segments,
                })
            }
            (None, Some(host)) => Ok(Target {
                host: host.clone(),
                port: self.port,
                path: self.path.clone(),
                segments: self
                    .path
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            }),
            (None, None) => Err("either --host or --url is required".to_string()),
        }
    }

    fn request_options(&self) -> Result<RequestOptions, String> {
        let timeout = Duration::try_from_secs_f64(self.timeout)
            .map_err(|_| format!("invalid timeout: {}", self.timeout))?;
        Ok(RequestOptions {
            timeout,
            token_length: self.token_length,
        })
    }
}

/// Checks the arguments before anything is sent.
fn prepare(opts: &Options) -> Result<(Target, RequestOptions), String> {
    let target = opts.target()?;
    let request_opts = opts.request_options()?;
    Ok((target, request_opts))
}

/// The lines to print for the outcome of a request, and the exit code.
fn report(
    result: &Result<CoAPResponse, ClientError>,
    display_url: &str,
    timeout: f64,
) -> (Vec<String>, u8) {
    match result {
        Ok(response) => {
            info!(
                "Response: {} {}",
                response.get_status(),
                response.get_status_name().unwrap_or("")
            );
            let lines = vec![
                display_url.to_string(),
                format!(
                    "[OK] GET -> {} | {}",
                    response.get_status(),
                    response.payload_text()
                ),
            ];
            (lines, EXIT_OK)
        }
        Err(ClientError::Timeout) => (
            vec![format!("[TIMEOUT] GET {} (>{:.1}s)", display_url, timeout)],
            EXIT_TIMEOUT,
        ),
        Err(ClientError::InvalidResponse(e)) => {
            debug!("invalid response: {}", e);
            (
                vec!["[ERROR] invalid CoAP response".to_string()],
                EXIT_INVALID_RESPONSE,
            )
        }
        Err(e) => (vec![format!("[ERROR] {}", e)], EXIT_FAILURE),
    }
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

    let (target, request_opts) = match prepare(&opts) {
        Ok(v) => v,
        Err(e) => {
            println!("[ERROR] {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    debug!("{:?}", request_opts);

    let display_url = format!("coap://{}/{}", target.host, target.path);

    info!("Connecting client to target: {}:{}", target.host, target.port);
    let result = match CoAPClientAsync::new_udp((target.host.as_str(), target.port)).await {
        Ok(mut client) => client.get_segments(&target.segments, &request_opts).await,
        Err(e) => Err(e),
    };

    let (lines, code) = report(&result, &display_url, opts.timeout);
    for line in lines {
        println!("{}", line);
    }
    ExitCode::from(code)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io;

    use coap_get::message::{decode, ParseError};

    #[test]
    fn test_defaults() {
        let opts = Options::try_parse_from(["coap-get", "--host", "10.0.0.7"]).unwrap();
        assert_eq!(opts.port, 5683);
        assert_eq!(opts.path, "sensor");
        assert_eq!(opts.timeout, 5.0);
        assert_eq!(opts.log_level, LevelFilter::Warn);

        let target = opts.target().unwrap();
        assert_eq!(target.host, "10.0.0.7");
        assert_eq!(target.port, 5683);
        assert_eq!(opts.request_options().unwrap(), RequestOptions::default());
    }

    #[test]
    fn test_url_target() {
        let opts = Options::try_parse_from(["coap-get", "--url", "coap://[::1]:6000/a/b"]).unwrap();
        let target = opts.target().unwrap();
        assert_eq!(target.host, "::1");
        assert_eq!(target.port, 6000);
        assert_eq!(target.path, "a/b");
        assert_eq!(target.segments, vec!["a", "b"]);
    }

    #[test]
    fn test_url_target_decoded() {
        let opts = Options::try_parse_from(["coap-get", "--url", "coap://h/a%20b/c"]).unwrap();
        let (target, _) = prepare(&opts).unwrap();
        assert_eq!(target.segments, vec!["a b", "c"]);

        let opts = Options::try_parse_from(["coap-get", "--host", "h", "--path", "a b/c"]).unwrap();
        let (plain, _) = prepare(&opts).unwrap();
        assert_eq!(plain.segments, target.segments);
    }

    #[test]
    fn test_bad_arguments() {
        assert!(Options::try_parse_from(["coap-get"]).is_err());
        assert!(
            Options::try_parse_from(["coap-get", "--host", "h", "--url", "coap://h/x"]).is_err()
        );

        let opts = Options::try_parse_from(["coap-get", "--host", "h", "--timeout", "-1"]).unwrap();
        assert!(opts.request_options().is_err());
        assert_eq!(prepare(&opts).unwrap_err(), "invalid timeout: -1");

        let opts = Options::try_parse_from(["coap-get", "--url", "http://h/x"]).unwrap();
        assert!(prepare(&opts).is_err());
    }

    #[test]
    fn test_report_ok() {
        let message = decode(&[0x60, 0x45, 0x00, 0x01, 0xFF, b'2', b'1', b'.', b'5']).unwrap();
        let (lines, code) = report(&Ok(CoAPResponse { message }), "coap://h/sensor", 5.0);
        assert_eq!(lines, vec!["coap://h/sensor", "[OK] GET -> 2.05 | 21.5"]);
        assert_eq!(code, 0);
    }

    #[test]
    fn test_report_timeout() {
        let (lines, code) = report(&Err(ClientError::Timeout), "coap://h/sensor", 0.5);
        assert_eq!(lines, vec!["[TIMEOUT] GET coap://h/sensor (>0.5s)"]);
        assert_eq!(code, 1);
    }

    #[test]
    fn test_report_invalid_response() {
        let err = ClientError::InvalidResponse(ParseError::ReservedNibble);
        let (lines, code) = report(&Err(err), "coap://h/sensor", 5.0);
        assert_eq!(lines, vec!["[ERROR] invalid CoAP response"]);
        assert_eq!(code, 2);
    }

    #[test]
    fn test_report_other_error() {
        let err = ClientError::Io(io::Error::new(io::ErrorKind::Other, "no route"));
        let (lines, code) = report(&Err(err), "coap://h/sensor", 5.0);
        assert_eq!(lines, vec!["[ERROR] no route"]);
        assert_eq!(code, 1);
    }
}
