use std::process;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use synomagnet::app::{App, Command};
use synomagnet::prompt::TerminalPrompter;
use synomagnet::store::Store;

#[derive(Parser, Debug)]
#[command(author, version, about = "Send magnet links to Synology Download Station", long_about = None)]
struct Cli {
    /// Open the configuration form
    #[arg(long)]
    settings: bool,
    /// Magnet link to download
    magnet: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();
    if let Err(err) = try_main().await {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

async fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let command = Command::from_args(cli.settings, cli.magnet);
    if command == Command::Usage {
        println!("{}", synomagnet::app::USAGE);
        return Ok(());
    }

    let mut app = App::new(Store::from_home()?, TerminalPrompter::new());
    let outcome = app.run(command).await?;
    if let Some(message) = outcome.console_message() {
        println!("{message}");
    }
    Ok(())
}

fn init_logging() {
    let env = Env::default().default_filter_or("warn");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
