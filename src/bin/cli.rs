//! chunkkv CLI
//!
//! Command-line interface over a log backend directory.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use bytes::Bytes;
use chunkkv::config::DEFAULT_MAX_ENTRY_LEN;
use chunkkv::wal::WalRecovery;
use chunkkv::{ChunkKvError, ChunkedStore, Config, LogBackend, StorageAdapter, StorageKey};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// chunkkv CLI
#[derive(Parser, Debug)]
#[command(name = "chunkkv")]
#[command(about = "Chunking hierarchical key-value store")]
#[command(version = chunkkv::VERSION)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./chunkkv_data")]
    data_dir: PathBuf,

    /// Largest payload stored as a single entry, in bytes
    #[arg(short, long, default_value_t = DEFAULT_MAX_ENTRY_LEN)]
    max_entry_len: usize,

    #[command(subcommand)]
    command: Commands,
}

/// Key given as space separated segments
#[derive(ClapArgs, Debug)]
struct KeyArg {
    /// Key segments
    #[arg(required = true, num_args = 1..)]
    segments: Vec<String>,
}

/// Prefix given as space separated segments, empty for everything
#[derive(ClapArgs, Debug)]
struct PrefixArg {
    /// Prefix segments
    #[arg(num_args = 0..)]
    segments: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a value to stdout
    Get {
        #[command(flatten)]
        key: KeyArg,
    },

    /// Store a value
    Set {
        #[command(flatten)]
        key: KeyArg,

        /// The value to set
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        value: Option<String>,

        /// Read the value from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Remove a value
    Rm {
        #[command(flatten)]
        key: KeyArg,
    },

    /// List physical entries under a prefix
    Ls {
        #[command(flatten)]
        prefix: PrefixArg,
    },

    /// Remove every entry under a prefix
    RmRange {
        #[command(flatten)]
        prefix: PrefixArg,
    },

    /// Rewrite the WAL keeping only live entries
    Compact,

    /// Check WAL integrity without modifying it
    Verify,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,chunkkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> chunkkv::Result<ExitCode> {
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .max_entry_len(args.max_entry_len)
        .build();

    let store = match args.command {
        Commands::Verify => {
            let result = WalRecovery::verify(&config.data_dir.join("wal.log"))?;
            println!(
                "entries: {}, corrupted: {}, last lsn: {}, valid bytes: {}",
                result.entries_recovered, result.entries_corrupted, result.last_lsn, result.valid_len
            );
            return Ok(ExitCode::SUCCESS);
        }
        _ => {
            let backend = LogBackend::open(&config)?;
            ChunkedStore::new(backend, config)?
        }
    };

    let mut code = ExitCode::SUCCESS;

    match args.command {
        Commands::Get { key } => {
            let key = StorageKey::from(key.segments);
            match store.load(&key)? {
                Some(value) => std::io::stdout().write_all(&value)?,
                None => {
                    tracing::warn!(key = %key, "key not found");
                    code = ExitCode::from(2);
                }
            }
        }
        Commands::Set { key, value, file } => {
            let key = StorageKey::from(key.segments);
            let data = match (value, file) {
                (Some(value), _) => Bytes::from(value),
                (None, Some(path)) => Bytes::from(std::fs::read(path)?),
                (None, None) => {
                    return Err(ChunkKvError::Config(
                        "either --value or --file is required".to_string(),
                    ))
                }
            };
            store.save(&key, data)?;
        }
        Commands::Rm { key } => {
            store.remove(&StorageKey::from(key.segments))?;
        }
        Commands::Ls { prefix } => {
            for entry in store.load_range(&StorageKey::from(prefix.segments))? {
                println!("{}\t{}", entry.key, entry.data.len());
            }
        }
        Commands::RmRange { prefix } => {
            store.remove_range(&StorageKey::from(prefix.segments))?;
        }
        Commands::Compact => {
            let backend = store.backend();
            backend.compact()?;
            println!("compacted {} entries in {}", backend.len(), backend.data_dir().display());
        }
        Commands::Verify => {}
    }

    store.into_backend().close()?;
    Ok(code)
}
