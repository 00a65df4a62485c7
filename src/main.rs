use anyhow::{Context, Result};
use chess_repertoire::config::Config;
use chess_repertoire::persistence::PersistenceGateway;
use chess_repertoire::shell::{self, Command};
use chess_repertoire::TrainerApp;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    tracing::info!("Starting Chess Repertoire in {}", config.data_dir.display());

    let mut app = TrainerApp::new(PersistenceGateway::new(config.storage()));
    println!("Type help for a list of commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match shell::parse_line(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => match shell::execute(&mut app, command).await {
                Ok(reply) => println!("{}", reply),
                Err(e) => println!("error: {:#}", e),
            },
            // Usage errors and help output are already formatted by clap
            Err(e) => print!("{}", e),
        }
    }

    Ok(())
}
