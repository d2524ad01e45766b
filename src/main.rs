use clap::{
    Parser,
    Subcommand,
};
use color_eyre::eyre::Result;
use raffle_console::{
    config::{
        self,
        AppConfig,
        Session,
    },
    logging,
};
use std::time::Duration;

mod client;
mod commands;
mod ui;

#[derive(Parser, Debug)]
#[command(
    name = "raffle-console",
    about = "Terminal front end for the raffle promotion service",
    version
)]
struct Args {
    /// Base URL of the raffle API
    #[arg(long, env = "API_HOST_URL", default_value = config::DEFAULT_API_URL)]
    api_url: String,

    /// User drawing the raffle
    #[arg(long, default_value = "")]
    user_id: String,

    /// Raffle activity to play
    #[arg(long, default_value_t = 0)]
    activity_id: i64,

    /// Directory for the rolling log file used by the TUI
    #[arg(long, default_value = config::DEFAULT_LOG_DIR)]
    log_dir: String,

    /// Seconds between recent-winner polls
    #[arg(long, default_value_t = config::DEFAULT_WINNERS_POLL_SECS)]
    winners_poll_secs: u64,

    /// Milliseconds per animation frame
    #[arg(long, default_value_t = config::DEFAULT_TICK_MILLIS)]
    tick_millis: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Interactive raffle screen (default)
    Tui,
    /// Warm up the activity's draw strategy
    Armory,
    /// List the award grid
    Awards,
    /// Draw once
    Draw,
    /// Draw ten times in one request
    DrawTen,
    /// Show the activity account
    Account,
    /// Show the credit balance
    Credit,
    /// Daily sign-in
    Sign,
    /// Whether today's sign-in is done
    SignStatus,
    /// Show rule-weight progress tiers
    RuleWeights,
    /// List SKU products
    Skus,
    /// Spend credits on a SKU
    Redeem {
        #[arg(long)]
        sku: i64,
    },
    /// List recent winners
    Winners,
}

impl Args {
    fn into_config(self) -> (AppConfig, Command) {
        let config = AppConfig {
            api_url: self.api_url,
            session: Session::new(self.user_id, self.activity_id),
            log_dir: config::resolve_dir(&self.log_dir),
            winners_poll_interval: Duration::from_secs(self.winners_poll_secs.max(1)),
            tick_interval: Duration::from_millis(self.tick_millis.max(1)),
        };
        (config, self.command.unwrap_or(Command::Tui))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let (config, command) = Args::parse().into_config();
    match command {
        Command::Tui => {
            logging::init_file_logging(&config.log_dir)?;
            tracing::info!(api_url = %config.api_url, "starting raffle console");
            client::run_app(config).await
        }
        other => {
            logging::init_stderr_logging();
            commands::run(&config, other).await
        }
    }
}
