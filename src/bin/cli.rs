//! xqwire CLI Client
//!
//! Runs commands against a document-query server, one after another.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use xqwire::{Config, Session};

/// xqwire CLI
#[derive(Parser, Debug)]
#[command(name = "xqwire-cli")]
#[command(about = "Run commands against a document-query server")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "1984")]
    port: u16,

    /// User name
    #[arg(short, long, default_value = "admin")]
    user: String,

    /// Password
    #[arg(short = 'P', long, default_value = "admin")]
    password: String,

    /// Print each command's info text to stderr
    #[arg(short, long)]
    info: bool,

    /// Give up waiting for a reply after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Commands to run, in order
    #[arg(required = true)]
    commands: Vec<String>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,xqwire=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut builder = Config::builder()
        .host(&args.host)
        .port(args.port)
        .username(&args.user)
        .password(&args.password);
    if let Some(ms) = args.timeout_ms {
        builder = builder.query_timeout_ms(ms);
    }
    let config = builder.build();

    let session = match Session::connect(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to connect to {}:{}: {}", args.host, args.port, e);
            std::process::exit(1);
        }
    };

    for command in &args.commands {
        match session.query(command.as_str()) {
            Ok(reply) => {
                println!("{}", reply.result);
                if args.info && !reply.info.is_empty() {
                    eprintln!("{}", reply.info);
                }
            }
            Err(e) => {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = session.close() {
        tracing::warn!("Error while closing: {}", e);
    }
}
