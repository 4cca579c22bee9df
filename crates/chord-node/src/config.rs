//! CLI surface. Parses the process's startup arguments into a `Config`,
//! exiting with status 1 (per spec) on anything malformed.

use clap::Parser;

const PORT_RANGE: std::ops::RangeInclusive<u16> = 49152..=65535;

#[derive(Parser, Debug)]
#[command(name = "chord-node", about = "One peer in a fixed-membership Chord ring")]
struct Cli {
    /// This node's host, as peers will address it.
    hostname: String,

    /// This node's TCP port; must be in 49152..=65535.
    port: u16,

    /// JSON array of peer "host:port" addresses, e.g. '["a:49152","b:49153"]'.
    /// May include or omit this node's own address; duplicates are fine.
    #[arg(long)]
    peers: Option<String>,

    /// Tracing filter, e.g. "info" or "chord_node=debug".
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Stop accepting connections after this many idle minutes. Unset disables
    /// the watchdog; this is an operator convenience, not a product requirement.
    #[arg(long)]
    idle_timeout_mins: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub hostname: String,
    pub port: u16,
    pub peers: Vec<String>,
    pub log_level: String,
    pub idle_timeout_mins: Option<u64>,
}

impl Config {
    pub fn self_address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }

    /// Parses `std::env::args()`. Prints a usage message and returns `Err(())`
    /// (caller exits 1) on any malformed argument, matching the Python
    /// original's "usage: ... ; error: ..." startup contract.
    pub fn from_args() -> Result<Self, ()> {
        let cli = match Cli::try_parse() {
            Ok(cli) => cli,
            Err(e) => {
                eprintln!("{e}");
                return Err(());
            }
        };

        if !PORT_RANGE.contains(&cli.port) {
            eprintln!(
                "error: port must be in {}..={}, got {}",
                PORT_RANGE.start(),
                PORT_RANGE.end(),
                cli.port
            );
            return Err(());
        }

        let peers = match cli.peers {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => list,
                Err(e) => {
                    eprintln!("error: --peers must be a JSON array of strings: {e}");
                    return Err(());
                }
            },
        };

        Ok(Config {
            hostname: cli.hostname,
            port: cli.port,
            peers,
            log_level: cli.log_level,
            idle_timeout_mins: cli.idle_timeout_mins,
        })
    }
}
