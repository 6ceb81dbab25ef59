use crate::demo::{run_countdown, run_sponsor, run_waitlist, CountdownArgs, SponsorArgs, WaitlistArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use wdc_labs::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "WDC Labs",
    about = "Serve and exercise the WDC Labs waitlist, countdown, and sponsorship flows",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the live countdown to the cohort deadline
    Countdown(CountdownArgs),
    /// Submit one waitlist application to the configured store
    Waitlist(WaitlistArgs),
    /// Generate a sponsorship link and e-mail draft
    Sponsor(SponsorArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Countdown(args) => run_countdown(args).await,
        Command::Waitlist(args) => run_waitlist(args).await,
        Command::Sponsor(args) => run_sponsor(args),
    }
}
