use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cdag",
    about = "ChunkDAG — content-addressed chunk store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory (overrides the configuration file)
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a chunk read from a file or stdin
    Put(PutArgs),
    /// Show a stored chunk
    Get(GetArgs),
    /// Show how many chunks are stored
    Stat,
    /// Periodically report complete chunk counts until interrupted
    Watch(WatchArgs),
}

#[derive(Args)]
pub struct PutArgs {
    /// Payload file, or `-` for stdin
    pub source: PathBuf,
}

#[derive(Args)]
pub struct GetArgs {
    /// Chunk id (hex, optionally prefixed with `chunk:`)
    pub id: String,
    /// Write the raw payload to stdout
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Seconds between reports (overrides the configuration file)
    #[arg(short, long)]
    pub interval: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["cdag", "get", "abcd", "--raw", "-d", "/tmp/x", "--format", "json"])
            .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Command::Get(args) => {
                assert_eq!(args.id, "abcd");
                assert!(args.raw);
            }
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn watch_interval_is_optional() {
        let cli = Cli::try_parse_from(["cdag", "watch"]).unwrap();
        assert!(matches!(cli.command, Command::Watch(WatchArgs { interval: None })));
    }
}
