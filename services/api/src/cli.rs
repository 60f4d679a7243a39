use crate::demo::{run_demo, run_export, run_rank, run_session, DemoArgs, ExportArgs, RankArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use talent_rank::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "TalentRank",
    about = "Rank applicant pools, review bias reports, and serve the ranking dashboard",
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
    /// Analyze an applicant file, persist the session, and print a summary
    Rank(RankArgs),
    /// Inspect or discard the persisted session
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },
    /// Export the persisted session's ranking as CSV
    Export(ExportArgs),
    /// Walk through upload, filtering, and export on an in-memory session
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
pub(crate) enum SessionCommand {
    /// Print the saved session summary
    Show,
    /// Delete the saved session
    Clear,
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
        Command::Rank(args) => run_rank(args).await,
        Command::Session { command } => run_session(command),
        Command::Export(args) => run_export(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
