use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::{error::Error, io, path::PathBuf, time::Duration};

use task_tracker::app::client::ApiClient;
use task_tracker::app::config::{ServerConfig, DEFAULT_API_URL};
use task_tracker::app::{logging, server, ui};

#[derive(Debug, Parser)]
#[command(name = "task_tracker", version, about = "Task tracker API server and terminal client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (configured through HOST, PORT and SEED_SAMPLE_TASKS)
    Serve,
    /// Open the terminal client against a running API
    Tui {
        #[arg(long, env = "TASK_TRACKER_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,

        #[arg(long, env = "TASK_TRACKER_LOG", default_value = "task_tracker.log")]
        log_file: PathBuf,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => run_server(),
        Command::Tui { api_url, log_file } => run_tui(api_url, log_file),
    }
}

fn run_server() -> Result<(), Box<dyn Error>> {
    logging::init_server_tracing();
    let config = ServerConfig::from_env()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(config))?;
    Ok(())
}

// Terminal handling heavily based on:
// https://github.com/ratatui-org/ratatui/blob/main/examples/list.rs
fn run_tui(api_url: String, log_file: PathBuf) -> Result<(), Box<dyn Error>> {
    logging::init_client_tracing(&log_file)?;
    tracing::info!(%api_url, "Starting terminal client");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create an app with 250 ms tick
    let tick_rate = Duration::from_millis(250);
    let app = ui::App::new(ApiClient::new(api_url));
    let res = ui::run_app(&mut terminal, app, tick_rate);

    // Restore previous terminal state after exit
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "Terminal client stopped with an error");
        println!("{err:?}");
    }

    Ok(())
}
