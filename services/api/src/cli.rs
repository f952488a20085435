use crate::demo::{run_browse, run_demo, run_matches, BrowseArgs, DemoArgs, MatchesArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use upskillr::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "UpSkillr",
    about = "Serve and explore the UpSkillr student, employer, and investor catalog",
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
    /// Filter a dataset the way the dashboards do and print the preview
    Browse(BrowseArgs),
    /// Rank students for an employer or investor by match score
    Matches(MatchesArgs),
    /// Walk a dashboard through loading, filtering, and clearing filters
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the directory holding students.json, employers.json, investors.json
    #[arg(long)]
    pub(crate) data_dir: Option<std::path::PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Browse(args) => run_browse(args),
        Command::Matches(args) => run_matches(args),
        Command::Demo(args) => run_demo(args),
    }
}
