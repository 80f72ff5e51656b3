use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use custody_registry::{Contract, Execution, ListedItem};
use custody_server::{CustodyServer, ServerConfig};
use custody_store::InMemoryLedger;
use custody_types::{Item, ItemCodec, ProducedInfo, TransferPayload};
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    let data = cli.data;
    match cli.command {
        Command::Register(args) => cmd_register(&Session::open(&data)?, args, &format),
        Command::Transfer(args) => cmd_transfer(&Session::open(&data)?, args, &format),
        Command::Read(args) => cmd_read(&Session::open(&data)?, args, &format),
        Command::List(args) => cmd_list(&Session::open(&data)?, args, &format),
        Command::Invoke(args) => cmd_invoke(&Session::open(&data)?, args),
        Command::Serve(args) => cmd_serve(args, &data),
    }
}

/// A ledger loaded from the local snapshot for the duration of one command.
struct Session {
    contract: Contract,
    data: PathBuf,
}

impl Session {
    fn open(data: &Path) -> anyhow::Result<Self> {
        let ledger = InMemoryLedger::load_snapshot(data)
            .with_context(|| format!("failed to load ledger from {}", data.display()))?;
        tracing::debug!(path = %data.display(), entries = ledger.len()?, "local ledger opened");
        Ok(Self {
            contract: Contract::new(Arc::new(ledger)),
            data: data.to_path_buf(),
        })
    }

    /// Invoke `function`, saving the snapshot if the invocation wrote.
    fn call(&self, function: &str, args: &[Vec<u8>]) -> anyhow::Result<Execution> {
        let execution = self.contract.call(function, args)?;
        if execution.receipt.writes > 0 {
            self.contract
                .ledger()
                .save_snapshot(&self.data)
                .with_context(|| format!("failed to save ledger to {}", self.data.display()))?;
        }
        Ok(execution)
    }
}

fn cmd_register(session: &Session, args: RegisterArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let produced = ProducedInfo::new(args.producer)
        .with_model(args.model)
        .with_serial(args.serial)
        .with_place(args.place)
        .with_time(args.time);
    let execution = session.call(
        "register",
        &[
            args.id.clone().into_bytes(),
            ItemCodec::encode_produced(&produced)?,
            args.location.into_bytes(),
        ],
    )?;
    match format {
        OutputFormat::Json => print_receipt(&args.id, &execution),
        OutputFormat::Text => println!(
            "{} Registered {} (version {})",
            "✓".green().bold(),
            args.id.bold(),
            execution.receipt.version
        ),
    }
    Ok(())
}

fn cmd_transfer(session: &Session, args: TransferArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let payload = TransferPayload::new(
        args.owner.unwrap_or_default(),
        args.holder.unwrap_or_default(),
    );
    let execution = session.call(
        "transfer",
        &[
            args.id.clone().into_bytes(),
            ItemCodec::encode_transfer(&payload)?,
            args.location.into_bytes(),
        ],
    )?;
    match format {
        OutputFormat::Json => print_receipt(&args.id, &execution),
        OutputFormat::Text => println!(
            "{} Transferred {} (version {})",
            "✓".green().bold(),
            args.id.bold(),
            execution.receipt.version
        ),
    }
    Ok(())
}

fn cmd_read(session: &Session, args: ReadArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let execution = session.call("read", &[args.id.into_bytes()])?;
    match format {
        OutputFormat::Json => println!("{}", String::from_utf8_lossy(&execution.payload)),
        OutputFormat::Text => print_item(&ItemCodec::decode(&execution.payload)?),
    }
    Ok(())
}

fn cmd_list(session: &Session, args: ListArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let execution = session.call("rangedList", &[args.start.into_bytes(), args.end.into_bytes()])?;
    match format {
        OutputFormat::Json => println!("{}", String::from_utf8_lossy(&execution.payload)),
        OutputFormat::Text => {
            let listed = ListedItem::parse_list(&execution.payload)?;
            if listed.is_empty() {
                println!("No items.");
            }
            for entry in &listed {
                match entry.item() {
                    Ok(item) => println!(
                        "{}  owner={} holder={} location={}",
                        entry.key.yellow(),
                        item.owner,
                        item.holder,
                        item.location
                    ),
                    Err(_) => println!("{}  {}", entry.key.yellow(), entry.record.get().dimmed()),
                }
            }
        }
    }
    Ok(())
}

fn cmd_invoke(session: &Session, args: InvokeArgs) -> anyhow::Result<()> {
    let raw: Vec<Vec<u8>> = args.args.into_iter().map(String::into_bytes).collect();
    let execution = session.call(&args.function, &raw)?;
    if execution.payload.is_empty() {
        println!("{} {}", "✓".green().bold(), execution.function);
    } else {
        println!("{}", String::from_utf8_lossy(&execution.payload));
    }
    Ok(())
}

fn cmd_serve(args: ServeArgs, data: &Path) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid bind address {bind}"))?;
    }
    if config.snapshot_path.is_none() {
        config.snapshot_path = Some(data.to_path_buf());
    }

    println!(
        "Custody gateway on {} (ledger: {})",
        config.bind_addr.to_string().bold(),
        data_label(&config)
    );
    let server = CustodyServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn data_label(config: &ServerConfig) -> String {
    config
        .snapshot_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "memory".into())
}

fn print_receipt(id: &str, execution: &Execution) {
    println!(
        "{}",
        json!({
            "function": execution.function.name(),
            "id": id,
            "txId": execution.receipt.tx_id,
            "version": execution.receipt.version,
        })
    );
}

fn print_item(item: &Item) {
    println!("Item {}", item.id.yellow().bold());
    println!("  Owner:    {}", item.owner);
    println!("  Holder:   {}", item.holder);
    println!("  Location: {}", item.location);
    let p = &item.produced;
    println!("  Produced: {} {} {}", p.producer.cyan(), p.model, p.serial);
    if !p.place.is_empty() || !p.time.is_empty() {
        println!("            at {} {}", p.place, p.time);
    }
}
