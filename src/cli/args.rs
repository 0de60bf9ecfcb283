use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Greeting the ESP32 firmware answers with "OK"
pub const DEFAULT_GREETING: &str = "Olá ESP32!";

/// Command line arguments for SppCom
#[derive(Parser, Debug)]
#[command(
    name = "sppcom",
    version = env!("CARGO_PKG_VERSION"),
    about = "Talk to an embedded device over a serial-profile or TCP link",
    long_about = "Opens a point-to-point link to one peer, writes a payload and reads back one chunk of the reply. Serial-profile radio links are reached through a bound serial device such as /dev/rfcomm0."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a message and print the first chunk of the reply
    Exchange(ExchangeArgs),
    /// Send data without waiting for a reply
    Send(SendArgs),
    /// Wait for one chunk of data from the peer
    Receive(ReceiveArgs),
    /// Interactive line-by-line exchange over stdin
    Chat(ChatArgs),
    /// List configured peers
    Peers,
    /// List serial devices on this system
    Ports,
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
}

/// Data format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Text,
    Hex,
    Base64,
}

/// Which peer to talk to and how
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Configured peer name
    #[arg(short, long)]
    pub peer: Option<String>,

    /// Peer address (hardware address, or host with --tcp)
    #[arg(short, long)]
    pub address: Option<String>,

    /// Service identifier (service UUID, or port with --tcp)
    #[arg(short, long)]
    pub service: Option<String>,

    /// Serial device carrying the link, e.g. /dev/rfcomm0
    #[arg(short, long, conflicts_with = "tcp")]
    pub device: Option<String>,

    /// Baud rate for --device
    #[arg(short, long, requires = "device")]
    pub baud: Option<u32>,

    /// Connect over TCP using --address as host and --service as port
    #[arg(long)]
    pub tcp: bool,

    /// Connect timeout in milliseconds
    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,
}

/// Receive tuning shared by commands that read
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ReadArgs {
    /// Receive timeout in milliseconds
    #[arg(short, long)]
    pub timeout_ms: Option<u64>,

    /// Largest chunk to read
    #[arg(short, long)]
    pub max_bytes: Option<usize>,
}

/// Exchange arguments
#[derive(ClapArgs, Debug)]
pub struct ExchangeArgs {
    /// Message to send
    #[arg(default_value = DEFAULT_GREETING)]
    pub message: String,

    /// Message format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: DataFormat,

    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub read: ReadArgs,
}

/// Send arguments
#[derive(ClapArgs, Debug)]
pub struct SendArgs {
    /// Data to send (text, hex or base64)
    pub data: String,

    /// Data format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: DataFormat,

    #[command(flatten)]
    pub target: TargetArgs,
}

/// Receive arguments
#[derive(ClapArgs, Debug)]
pub struct ReceiveArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub read: ReadArgs,
}

/// Chat arguments
#[derive(ClapArgs, Debug)]
pub struct ChatArgs {
    /// Line ending appended to every line sent
    #[arg(short, long, value_enum, default_value = "none")]
    pub line_ending: LineEnding,

    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub read: ReadArgs,
}

/// Line ending options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    None,
    Lf,
    Crlf,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Write an example configuration
    Init {
        /// Directory for the project configuration (defaults to the current directory)
        #[arg(short, long)]
        path: Option<String>,
        /// Write the global configuration instead
        #[arg(short, long, conflicts_with = "path")]
        global: bool,
    },
    /// Print the configuration file locations
    Path,
}

impl LineEnding {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LineEnding::None => b"",
            LineEnding::Lf => b"\n",
            LineEnding::Crlf => b"\r\n",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFormat::Text => write!(f, "text"),
            DataFormat::Hex => write!(f, "hex"),
            DataFormat::Base64 => write!(f, "base64"),
        }
    }
}
