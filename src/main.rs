//! `lumberjack` binary: ship standard input lines to a Lumberjack server.
//!
//! Each line becomes one record batch with `line` and `offset` fields plus any
//! `--field` pairs given on the command line.

mod cli;

use std::{io, process::ExitCode, time::Duration};

use clap::Parser;
use lumberjack::{
    ClientBuilder,
    ClientError,
    ProtocolSession,
    RecordBatch,
    SessionError,
    TlsConfig,
    TlsConfigError,
    session::SessionStream,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, thiserror::Error)]
enum ShipError {
    #[error("could not resolve {0}")]
    Resolve(String),
    #[error("failed to read input: {0}")]
    Input(#[from] io::Error),
    #[error(transparent)]
    TlsConfig(#[from] TlsConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    match run(cli).await {
        Ok(lines) => {
            tracing::info!(lines, "input exhausted");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "shipping failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: cli::Cli) -> Result<u64, ShipError> {
    let addr = tokio::net::lookup_host((cli.host.as_str(), cli.port))
        .await?
        .next()
        .ok_or_else(|| ShipError::Resolve(cli.host.clone()))?;

    let mut builder = ClientBuilder::new()
        .window_size(cli.window_size)
        .nodelay(true);
    if let Some(secs) = cli.ack_timeout {
        builder = builder.ack_timeout(Duration::from_secs(secs));
    }

    if cli.plaintext {
        let session = builder.connect_plaintext(addr).await?;
        return ship(session, &cli.fields).await;
    }

    if let Some(path) = &cli.ca_file {
        builder = builder.tls_config(TlsConfig::from_ca_pem_file(path)?);
    }
    let server_name = cli.server_name.as_deref().unwrap_or(&cli.host);
    let session = builder.connect(addr, server_name).await?;
    ship(session, &cli.fields).await
}

async fn ship<T: SessionStream>(
    mut session: ProtocolSession<T>,
    fields: &[(String, String)],
) -> Result<u64, ShipError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut offset = 0u64;
    let mut shipped = 0u64;

    let result = async {
        while let Some(line) = lines.next_line().await? {
            let next_offset = offset + line.len() as u64 + 1;
            let batch = fields.iter().fold(
                RecordBatch::new()
                    .with_field("line", line)
                    .with_field("offset", offset.to_string()),
                |batch, (key, value)| batch.with_field(key.as_str(), value.as_str()),
            );
            session.send(&batch).await?;
            offset = next_offset;
            shipped += 1;
        }
        Ok::<_, ShipError>(())
    }
    .await;

    session.close().await;
    result.map(|()| shipped)
}
