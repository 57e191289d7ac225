use crate::demo::{run_demo, run_form_listing, DemoArgs, FormsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use talent_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Talent Intake",
    about = "Serve and demonstrate the multi-step talent intake forms",
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
    /// List the available intake forms and their steps
    Forms(FormsArgs),
    /// Walk a scripted applicant through one form and submit it
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
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Forms(args) => run_form_listing(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
