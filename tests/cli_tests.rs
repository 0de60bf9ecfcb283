use clap::{CommandFactory, Parser};
use sppcom::cli::args::{Args, Command, ConfigCommand, DataFormat, LineEnding, OutputFormat};
use sppcom::cli::commands::{connect_timeout, parse_data, read_settings, resolve_target};
use sppcom::domain::config::LinkConfig;
use sppcom::{ServiceIdentifier, SppComConfig};
use std::time::Duration;

/// CLI interface tests
#[cfg(test)]
mod cli_tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).expect("arguments should parse")
    }

    #[test]
    fn test_cli_help() {
        let help = Args::command().render_long_help().to_string();

        assert!(help.contains("Usage:"));
        assert!(help.contains("Commands:"));
        for command in ["exchange", "send", "receive", "chat", "peers", "ports", "config"] {
            assert!(help.contains(command), "help lacks {}", command);
        }
    }

    #[test]
    fn test_cli_version_flag() {
        let err = Args::try_parse_from(["sppcom", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert!(matches!(parse(&["sppcom", "version"]).command, Command::Version));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["sppcom", "peers", "-o", "json", "-v"]);
        assert!(args.verbose);
        assert_eq!(args.output, OutputFormat::Json);
        assert!(matches!(args.command, Command::Peers));
    }

    #[test]
    fn test_invalid_output_format() {
        assert!(Args::try_parse_from(["sppcom", "-o", "xml", "peers"]).is_err());
    }

    #[test]
    fn test_send_with_hex_payload() {
        let args = parse(&["sppcom", "send", "4f 4b", "-f", "hex", "-p", "esp32"]);
        match args.command {
            Command::Send(send) => {
                assert_eq!(send.format, DataFormat::Hex);
                assert_eq!(send.target.peer.as_deref(), Some("esp32"));
                assert_eq!(parse_data(&send.data, send.format).unwrap(), b"OK");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_chat_line_ending() {
        match parse(&["sppcom", "chat", "-l", "crlf", "-t", "250"]).command {
            Command::Chat(chat) => {
                assert_eq!(chat.line_ending, LineEnding::Crlf);
                assert_eq!(chat.read.timeout_ms, Some(250));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_config_subcommands() {
        match parse(&["sppcom", "config", "init", "--global"]).command {
            Command::Config(config) => {
                assert!(matches!(config.command, ConfigCommand::Init { global: true, path: None }));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Args::try_parse_from(["sppcom", "config", "init", "-g", "-p", "."]).is_err());
    }

    #[test]
    fn test_exchange_over_device_resolves_to_serial_peer() {
        let args = parse(&[
            "sppcom", "exchange", "--device", "/dev/rfcomm1", "--baud", "9600",
            "--connect-timeout-ms", "0",
        ]);
        let exchange = match args.command {
            Command::Exchange(exchange) => exchange,
            other => panic!("unexpected command {:?}", other),
        };

        let config = SppComConfig::example();
        let peer = resolve_target(&exchange.target, &config).unwrap();
        assert_eq!(peer.service, ServiceIdentifier::serial_port_profile());
        match peer.link {
            LinkConfig::Serial { port, baud_rate, .. } => {
                assert_eq!(port, "/dev/rfcomm1");
                assert_eq!(baud_rate, 9600);
            }
            other => panic!("unexpected link {:?}", other),
        }

        assert_eq!(connect_timeout(&exchange.target, &config.global), None);
        assert_eq!(
            read_settings(&exchange.read, &config.global),
            (1024, Duration::from_millis(5000))
        );
    }

    #[test]
    fn test_exchange_uses_default_peer() {
        let args = parse(&["sppcom", "exchange", "hello", "-m", "16"]);
        let exchange = match args.command {
            Command::Exchange(exchange) => exchange,
            other => panic!("unexpected command {:?}", other),
        };

        let config = SppComConfig::example();
        let peer = resolve_target(&exchange.target, &config).unwrap();
        assert_eq!(peer.name, "esp32");
        assert_eq!(exchange.message, "hello");
        assert_eq!(read_settings(&exchange.read, &config.global).0, 16);
    }

    #[test]
    fn test_unknown_peer_is_rejected() {
        let args = parse(&["sppcom", "receive", "-p", "toaster"]);
        let receive = match args.command {
            Command::Receive(receive) => receive,
            other => panic!("unexpected command {:?}", other),
        };
        assert!(resolve_target(&receive.target, &SppComConfig::example()).is_err());
    }
}
