//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Channel to send and listen on (0-255), overrides the config file
    #[arg(long, allow_negative_numbers = true)]
    pub channel: Option<i64>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Broadcast a text message once
    Send {
        /// Message content
        message: String,
    },
    /// Broadcast raw bytes given as hex
    SendHex {
        /// Payload, e.g. "deadbeef"
        payload: String,
    },
    /// Print messages received on the channel
    Listen {
        /// Show signal strength and sender address
        #[arg(short, long)]
        full: bool,
        /// Stop after this many messages
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Run three simulated radios in-process and show channel filtering
    Demo {
        /// Message the first radio sends
        #[arg(default_value = "Hello")]
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send_with_channel() {
        let cli = Cli::try_parse_from(["ble-radio", "--channel", "7", "send", "Hello"]).unwrap();
        assert_eq!(cli.channel, Some(7));
        assert_eq!(
            cli.command,
            Commands::Send {
                message: "Hello".to_string()
            }
        );
    }

    #[test]
    fn test_parse_listen_options() {
        let cli = Cli::try_parse_from(["ble-radio", "-v", "listen", "--full", "-n", "3"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Commands::Listen {
                full: true,
                count: Some(3)
            }
        );
    }

    #[test]
    fn test_negative_channel_reaches_validation() {
        let cli = Cli::try_parse_from(["ble-radio", "--channel", "-1", "demo"]).unwrap();
        assert_eq!(cli.channel, Some(-1));
    }

    #[test]
    fn test_demo_has_default_message() {
        let cli = Cli::try_parse_from(["ble-radio", "demo"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Demo {
                message: "Hello".to_string()
            }
        );
    }
}
