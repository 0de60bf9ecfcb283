use crate::cli::args::{
    Args, ChatArgs, Command, ConfigCommand, DataFormat, ExchangeArgs, ReadArgs, ReceiveArgs,
    SendArgs, TargetArgs,
};
use crate::cli::output::{ConsoleWriter, ExchangeReport, OutputWriter, PayloadView};
use crate::core::session::SerialLinkSession;
use crate::domain::address::{PeerAddress, ServiceIdentifier};
use crate::domain::config::{
    default_baud_rate, FlowControlConfig, GlobalConfig, LinkConfig, ParityConfig, PeerConfig,
    SppComConfig, DEFAULT_PEER_ADDRESS,
};
use crate::domain::error::{ReceiveError, SppComError, SppComResult};
use crate::infrastructure::{config::ConfigManager, logging, serial, transport_for};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Execute CLI command
pub async fn execute_command(args: Args) -> SppComResult<()> {
    let writer = ConsoleWriter::new(args.output);

    let config = load_effective_config(args.config.as_deref())?;

    if !args.quiet {
        logging::init_logging(&config.global.log_level, args.verbose);
    }

    match args.command {
        Command::Exchange(exchange_args) => execute_exchange(exchange_args, &writer, &config).await,
        Command::Send(send_args) => execute_send(send_args, &writer, &config).await,
        Command::Receive(receive_args) => execute_receive(receive_args, &writer, &config).await,
        Command::Chat(chat_args) => execute_chat(chat_args, &writer, &config).await,
        Command::Peers => {
            writer.write_peers(&config.peers)?;
            Ok(())
        }
        Command::Ports => {
            let ports = serial::list_ports()?;
            writer.write_ports(&ports)?;
            Ok(())
        }
        Command::Config(config_args) => {
            let config_manager = ConfigManager::new()?;
            execute_config_command(config_args.command, &writer, &config, &config_manager)
        }
        Command::Version => {
            writer.write_message(&format!("sppcom {}", env!("CARGO_PKG_VERSION")))?;
            Ok(())
        }
    }
}

/// Configuration for this run: `--config` alone when given, otherwise the
/// merged global and project files
pub fn load_effective_config(config_path: Option<&str>) -> SppComResult<SppComConfig> {
    match config_path {
        Some(path) => ConfigManager::load_config_from_path(Path::new(path)),
        None => ConfigManager::new()?.load_config(),
    }
}

/// Work out which peer a command addresses.
///
/// `--device` and `--tcp` describe an ad-hoc peer; otherwise the peer comes
/// from configuration (`--peer`, falling back to `global.default_peer`).
/// `--address` and `--service` override whatever was resolved.
pub fn resolve_target(target: &TargetArgs, config: &SppComConfig) -> SppComResult<PeerConfig> {
    let mut resolved = if let Some(device) = &target.device {
        PeerConfig {
            name: format!("serial-{}", device),
            description: format!("Serial link on {}", device),
            address: PeerAddress::new(DEFAULT_PEER_ADDRESS)?,
            service: ServiceIdentifier::serial_port_profile(),
            link: LinkConfig::Serial {
                port: device.clone(),
                baud_rate: target.baud.unwrap_or_else(default_baud_rate),
                data_bits: 8,
                stop_bits: 1,
                parity: ParityConfig::None,
                flow_control: FlowControlConfig::None,
            },
        }
    } else if target.tcp {
        let host = target.address.as_deref().ok_or_else(|| {
            SppComError::InvalidInput("--tcp requires --address <HOST>".to_string())
        })?;
        let port = target.service.as_deref().ok_or_else(|| {
            SppComError::InvalidInput("--tcp requires --service <PORT>".to_string())
        })?;
        PeerConfig {
            name: format!("tcp-{}:{}", host, port),
            description: format!("TCP link to {}:{}", host, port),
            address: PeerAddress::new(host)?,
            service: ServiceIdentifier::new(port)?,
            link: LinkConfig::Tcp { nodelay: true },
        }
    } else {
        let name = target
            .peer
            .as_deref()
            .or(config.global.default_peer.as_deref())
            .ok_or_else(|| {
                SppComError::InvalidInput(
                    "No peer selected: pass --peer, --device or --tcp, or set global.default_peer"
                        .to_string(),
                )
            })?;
        config.find_peer(name).cloned().ok_or_else(|| SppComError::Config {
            message: format!("Peer '{}' not found in configuration", name),
        })?
    };

    if let Some(address) = &target.address {
        resolved.address = PeerAddress::new(address.as_str())?;
    }
    if let Some(service) = &target.service {
        resolved.service = ServiceIdentifier::new(service.as_str())?;
    }

    Ok(resolved)
}

/// Connect timeout to use; zero disables it
pub fn connect_timeout(target: &TargetArgs, global: &GlobalConfig) -> Option<Duration> {
    match target.connect_timeout_ms.unwrap_or(global.connect_timeout_ms) {
        0 => None,
        ms => Some(Duration::from_millis(ms)),
    }
}

/// Chunk size and wait bound for a receive
pub fn read_settings(read: &ReadArgs, global: &GlobalConfig) -> (usize, Duration) {
    let max_bytes = read.max_bytes.unwrap_or(global.max_read_bytes);
    let timeout = read
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| global.receive_timeout());
    (max_bytes, timeout)
}

async fn open_session(
    target: &TargetArgs,
    config: &SppComConfig,
) -> SppComResult<(PeerConfig, SerialLinkSession)> {
    let peer = resolve_target(target, config)?;
    let transport = transport_for(&peer)?;

    // Gate the connect on the transport being usable
    transport.check_available().await?;

    info!("Using peer '{}' via {}", peer.name, transport.transport_type());
    let mut session = SerialLinkSession::new(transport);
    session
        .connect(
            &peer.address,
            &peer.service,
            connect_timeout(target, &config.global),
        )
        .await?;

    Ok((peer, session))
}

async fn execute_exchange(
    args: ExchangeArgs,
    writer: &ConsoleWriter,
    config: &SppComConfig,
) -> SppComResult<()> {
    let payload = parse_data(&args.message, args.format)?;
    let (max_bytes, timeout) = read_settings(&args.read, &config.global);

    let (peer, mut session) = open_session(&args.target, config).await?;
    let result = session.exchange(&payload, max_bytes, timeout).await;
    session.disconnect().await;
    let received = result?;

    writer.write_exchange(&ExchangeReport {
        peer: peer.address.to_string(),
        service: peer.service.to_string(),
        sent: Some(PayloadView::new(&payload)),
        received: Some(PayloadView::new(&received)),
    })?;
    Ok(())
}

async fn execute_send(
    args: SendArgs,
    writer: &ConsoleWriter,
    config: &SppComConfig,
) -> SppComResult<()> {
    let payload = parse_data(&args.data, args.format)?;

    let (peer, mut session) = open_session(&args.target, config).await?;
    let result = session.send(&payload).await;
    session.disconnect().await;
    result?;

    writer.write_exchange(&ExchangeReport {
        peer: peer.address.to_string(),
        service: peer.service.to_string(),
        sent: Some(PayloadView::new(&payload)),
        received: None,
    })?;
    Ok(())
}

async fn execute_receive(
    args: ReceiveArgs,
    writer: &ConsoleWriter,
    config: &SppComConfig,
) -> SppComResult<()> {
    let (max_bytes, timeout) = read_settings(&args.read, &config.global);

    let (peer, mut session) = open_session(&args.target, config).await?;
    let result = session.receive(max_bytes, timeout).await;
    session.disconnect().await;
    let received = result?;

    writer.write_exchange(&ExchangeReport {
        peer: peer.address.to_string(),
        service: peer.service.to_string(),
        sent: None,
        received: Some(PayloadView::new(&received)),
    })?;
    Ok(())
}

async fn execute_chat(
    args: ChatArgs,
    writer: &ConsoleWriter,
    config: &SppComConfig,
) -> SppComResult<()> {
    let (max_bytes, timeout) = read_settings(&args.read, &config.global);
    let (peer, mut session) = open_session(&args.target, config).await?;

    writer.write_message(&format!(
        "Connected to {} ({}). Type a line to send it, Ctrl-D to quit.",
        peer.name, peer.address
    ))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                None
            }
        };
        let Some(line) = line else {
            break;
        };

        let mut payload = line.into_bytes();
        payload.extend_from_slice(args.line_ending.as_bytes());
        if payload.is_empty() {
            continue;
        }

        if let Err(e) = session.send(&payload).await {
            writer.write_error(&e.to_string())?;
            continue;
        }

        match session.receive(max_bytes, timeout).await {
            Ok(received) => writer.write_exchange(&ExchangeReport {
                peer: peer.address.to_string(),
                service: peer.service.to_string(),
                sent: None,
                received: Some(PayloadView::new(&received)),
            })?,
            Err(e @ ReceiveError::ConnectionClosed) => {
                writer.write_error(&e.to_string())?;
                break;
            }
            Err(e) => writer.write_error(&e.to_string())?,
        }
    }

    session.disconnect().await;
    writer.write_session(&session.info())?;
    Ok(())
}

fn execute_config_command(
    command: ConfigCommand,
    writer: &ConsoleWriter,
    config: &SppComConfig,
    config_manager: &ConfigManager,
) -> SppComResult<()> {
    match command {
        ConfigCommand::Show => {
            writer.write_config(config)?;
        }
        ConfigCommand::Init { path, global } => {
            if global {
                let written = config_manager.init_global_config()?;
                writer.write_message(&format!(
                    "Global configuration initialized at '{}'",
                    written.display()
                ))?;
            } else {
                let dir: std::path::PathBuf = match path {
                    Some(path) => path.into(),
                    None => std::env::current_dir()?,
                };
                let written = config_manager.init_project_config(&dir)?;
                writer.write_message(&format!(
                    "Project configuration initialized at '{}'",
                    written.display()
                ))?;
            }
        }
        ConfigCommand::Path => {
            writer.write_message(&format!(
                "global: {}",
                config_manager.get_global_config_path_ref().display()
            ))?;
            match config_manager.get_project_config_path() {
                Some(project) => {
                    writer.write_message(&format!("project: {}", project.display()))?
                }
                None => writer.write_message("project: (none)")?,
            }
        }
    }
    Ok(())
}

/// Decode command line data in the given format
pub fn parse_data(data: &str, format: DataFormat) -> SppComResult<Vec<u8>> {
    match format {
        DataFormat::Text => Ok(data.as_bytes().to_vec()),
        DataFormat::Hex => {
            let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
            hex::decode(&cleaned)
                .map_err(|e| SppComError::InvalidInput(format!("Invalid hex data: {}", e)))
        }
        DataFormat::Base64 => {
            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(data.trim())
                .map_err(|e| SppComError::InvalidInput(format!("Invalid base64 data: {}", e)))
        }
    }
}
