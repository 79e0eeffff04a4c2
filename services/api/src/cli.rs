use crate::demo::{
    run_demo, run_locations, run_lookup, run_slots, DemoArgs, LocationsArgs, LookupArgs, SlotsArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use passport_appointment::config::ServerConfig;
use passport_appointment::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Passport Appointment Service",
    about = "Browse offices, check schedules, and book passport appointments from the command line",
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
    /// List regions, countries, or offices from the office directory
    Locations(LocationsArgs),
    /// Show the time slots and whether a date can be booked
    Slots(SlotsArgs),
    /// Look up an existing appointment by reference code and email
    Lookup(LookupArgs),
    /// Walk a sample applicant through the booking wizard end to end
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

impl ServeArgs {
    pub(crate) fn apply(self, server: &mut ServerConfig) {
        if let Some(host) = self.host {
            server.host = host;
        }
        if let Some(port) = self.port {
            server.port = port;
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Locations(args) => run_locations(args),
        Command::Slots(args) => run_slots(args),
        Command::Lookup(args) => run_lookup(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
