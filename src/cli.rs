//! Command line interface for the `lumberjack` shipper.
//!
//! Reads lines from standard input and forwards each one as a record batch.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments for the `lumberjack` binary.
#[derive(Debug, Parser)]
#[command(
    name = "lumberjack",
    version,
    about = "Ship lines from standard input to a Lumberjack server"
)]
pub struct Cli {
    /// Server host name or address.
    #[arg(long)]
    pub host: String,

    /// Server port.
    #[arg(short, long, default_value_t = 5043)]
    pub port: u16,

    /// Name to validate the server certificate against; defaults to the host.
    #[arg(long)]
    pub server_name: Option<String>,

    /// PEM file of CA certificates to trust instead of the Mozilla roots.
    #[arg(long, value_name = "FILE")]
    pub ca_file: Option<PathBuf>,

    /// Connect without TLS.
    #[arg(long, conflicts_with_all = ["server_name", "ca_file"])]
    pub plaintext: bool,

    /// Maximum number of unacknowledged frames.
    #[arg(short, long, default_value_t = 5000)]
    pub window_size: u32,

    /// Seconds to wait for an ACK before giving up.
    #[arg(long, value_name = "SECS")]
    pub ack_timeout: Option<u64>,

    /// Extra field added to every record, as `key=value`. May be repeated.
    #[arg(short, long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rstest::rstest;

    use super::Cli;

    #[test]
    fn parses_defaults() {
        let cli = Cli::parse_from(["lumberjack", "--host", "logs.example.com"]);
        assert_eq!(cli.host, "logs.example.com");
        assert_eq!(cli.port, 5043);
        assert_eq!(cli.window_size, 5000);
        assert!(cli.fields.is_empty());
        assert!(!cli.plaintext);
    }

    #[test]
    fn parses_repeated_fields() {
        let cli = Cli::parse_from([
            "lumberjack",
            "--host",
            "localhost",
            "--field",
            "type=syslog",
            "-f",
            "env=a=b",
        ]);
        assert_eq!(
            cli.fields,
            vec![
                ("type".to_owned(), "syslog".to_owned()),
                ("env".to_owned(), "a=b".to_owned()),
            ]
        );
    }

    #[rstest]
    #[case::missing_separator("novalue")]
    #[case::empty_key("=value")]
    fn rejects_malformed_fields(#[case] field: &str) {
        let result = Cli::try_parse_from(["lumberjack", "--host", "h", "--field", field]);
        assert!(result.is_err());
    }

    #[test]
    fn plaintext_conflicts_with_ca_file() {
        let result = Cli::try_parse_from([
            "lumberjack",
            "--host",
            "h",
            "--plaintext",
            "--ca-file",
            "ca.pem",
        ]);
        assert!(result.is_err());
    }
}
