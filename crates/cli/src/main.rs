//! `arch-copier` -- archive a file and keep the archive within its
//! retention policy.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arch_copier::{parse_error_output, parse_error_status, Cli, Stream, EXIT_FAILURE, EXIT_OK};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "arch_copier=info,arch_copier_core=info,arch_copier_events=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            match parse_error_output(&e) {
                (Stream::Stdout, text) => print!("{text}"),
                (Stream::Stderr, text) => eprint!("{text}"),
            }
            return ExitCode::from(parse_error_status(&e));
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    match runtime.block_on(arch_copier::run(cli)) {
        Ok(_) => ExitCode::from(EXIT_OK),
        Err(e) => {
            tracing::error!(error = %e, "Archive copy failed");
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
