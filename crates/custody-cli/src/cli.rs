use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "custody",
    about = "Custody registry for tracked physical items",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Ledger snapshot used by local commands.
    #[arg(long, global = true, default_value = "custody-ledger.json")]
    pub data: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register a newly produced item
    Register(RegisterArgs),
    /// Change the owner or holder of an item
    Transfer(TransferArgs),
    /// Show the stored record of an item
    Read(ReadArgs),
    /// List items with keys in [start, end)
    List(ListArgs),
    /// Invoke a registry function with raw arguments
    Invoke(InvokeArgs),
    /// Start the HTTP gateway
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct RegisterArgs {
    pub id: String,
    #[arg(long)]
    pub producer: String,
    #[arg(long, default_value = "")]
    pub model: String,
    #[arg(long, default_value = "")]
    pub serial: String,
    #[arg(long, default_value = "")]
    pub place: String,
    #[arg(long, default_value = "")]
    pub time: String,
    #[arg(short, long, default_value = "")]
    pub location: String,
}

#[derive(Args)]
pub struct TransferArgs {
    pub id: String,
    #[arg(long)]
    pub owner: Option<String>,
    #[arg(long)]
    pub holder: Option<String>,
    #[arg(short, long, default_value = "")]
    pub location: String,
}

#[derive(Args)]
pub struct ReadArgs {
    pub id: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// Inclusive start key; empty lists from the first key
    #[arg(default_value = "")]
    pub start: String,
    /// Exclusive end key; empty lists to the last key
    #[arg(default_value = "")]
    pub end: String,
}

#[derive(Args)]
pub struct InvokeArgs {
    pub function: String,
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<String>,
    /// TOML gateway configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_register() {
        let cli = Cli::try_parse_from([
            "custody", "register", "item-1", "--producer", "Acme", "--serial", "SN-1", "-l", "Plant",
        ])
        .unwrap();
        if let Command::Register(args) = cli.command {
            assert_eq!(args.id, "item-1");
            assert_eq!(args.producer, "Acme");
            assert_eq!(args.serial, "SN-1");
            assert_eq!(args.location, "Plant");
            assert!(args.model.is_empty());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn register_requires_producer() {
        assert!(Cli::try_parse_from(["custody", "register", "item-1"]).is_err());
    }

    #[test]
    fn parse_transfer() {
        let cli = Cli::try_parse_from(["custody", "transfer", "item-1", "--owner", "Alice"]).unwrap();
        if let Command::Transfer(args) = cli.command {
            assert_eq!(args.owner, Some("Alice".into()));
            assert_eq!(args.holder, None);
            assert!(args.location.is_empty());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_list_defaults() {
        let cli = Cli::try_parse_from(["custody", "list"]).unwrap();
        if let Command::List(args) = cli.command {
            assert!(args.start.is_empty());
            assert!(args.end.is_empty());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_invoke_raw_args() {
        let cli = Cli::try_parse_from(["custody", "invoke", "rangedList", "a", "z"]).unwrap();
        if let Command::Invoke(args) = cli.command {
            assert_eq!(args.function, "rangedList");
            assert_eq!(args.args, vec!["a", "z"]);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["custody", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:8080".into()));
            assert!(args.config.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_globals() {
        let cli = Cli::try_parse_from([
            "custody", "--verbose", "--format", "json", "--data", "/tmp/l.json", "read", "x",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.data, PathBuf::from("/tmp/l.json"));
    }
}
