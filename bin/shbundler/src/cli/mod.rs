use crate::utils::run_until_ctrl_c;
use clap::{value_parser, Parser, Subcommand};

pub mod args;
pub mod commands;

/// The main shBundler CLI interface
#[derive(Debug, Parser)]
#[command(author, version, about = "shBundler", long_about = None)]
pub struct Cli {
    /// The command to execute
    #[clap(subcommand)]
    command: Commands,

    /// The verbosity level
    #[clap(long, short, global = true, default_value_t = 2, value_parser = value_parser!(u8).range(..=4))]
    verbosity: u8,
}

impl Cli {
    /// Get the log level based on the verbosity level
    pub fn get_log_level(&self) -> String {
        match self.verbosity {
            0 => "error",
            1 => "warn",
            2 => "info",
            3 => "debug",
            _ => "trace",
        }
        .into()
    }
}

/// Commands to be executed
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send a user operation with a single call from the smart account
    #[command(name = "send")]
    Send(Box<commands::SendCommand>),

    /// Print the smart account of the owner on the chain
    #[command(name = "address")]
    Address(Box<commands::AddressCommand>),

    /// Query the bundler for the current user operation gas price
    #[command(name = "gas-price")]
    GasPrice(commands::GasPriceCommand),

    /// Fetch the receipt of a user operation
    #[command(name = "receipt")]
    Receipt(commands::ReceiptCommand),

    /// Print the published endpoint defaults of a chain
    #[command(name = "defaults")]
    Defaults(commands::DefaultsCommand),
}

pub fn run() -> eyre::Result<()> {
    let cli = Cli::parse();

    let level = cli.get_log_level();
    let rust_log = match std::env::var("RUST_LOG") {
        Ok(val) => format!("{val},shbundler={level},shbundler_client={level}"),
        Err(_) => format!("shbundler={level},shbundler_client={level}"),
    };
    std::env::set_var("RUST_LOG", rust_log);
    tracing_subscriber::fmt::init();

    let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    let task = async move {
        match cli.command {
            Commands::Send(command) => command.execute().await,
            Commands::Address(command) => command.execute().await,
            Commands::GasPrice(command) => command.execute().await,
            Commands::Receipt(command) => command.execute().await,
            Commands::Defaults(command) => command.execute().await,
        }
    };

    rt.block_on(run_until_ctrl_c(task))
}
