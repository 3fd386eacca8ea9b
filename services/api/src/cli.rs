use crate::offline::{run_offline_plan, PlanArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fleet_induction::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Fleet Induction Planner",
    about = "Run the nightly fleet induction planning service and tooling",
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
    /// Rank a fleet snapshot file with the local optimizer and print the plan
    Plan(PlanArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured listen address (host:port)
    #[arg(long)]
    pub(crate) bind: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Plan(args) => run_offline_plan(args),
    }
}
