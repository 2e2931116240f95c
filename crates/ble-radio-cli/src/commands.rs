//! Command handlers for the radio CLI

use tracing::info;

use ble_radio::{AdvertisementProvider, Radio, RadioConfig, ReceivedMessage, SimulatedAir};
#[cfg(feature = "hardware")]
use ble_radio::HardwareProvider;

use crate::cli::Commands;
use crate::error::Result;

/// Command dispatcher for handling CLI commands
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Execute a CLI command
    pub async fn execute(command: Commands, config: RadioConfig) -> Result<()> {
        match command {
            Commands::Send { message } => {
                Self::handle_send_command(config, message.into_bytes()).await
            }
            Commands::SendHex { payload } => {
                let bytes = hex::decode(payload.trim())?;
                Self::handle_send_command(config, bytes).await
            }
            Commands::Listen { full, count } => {
                Self::handle_listen_command(config, full, count).await
            }
            Commands::Demo { message } => Self::handle_demo_command(config, message).await,
        }
    }

    /// Handle the send and send-hex commands
    #[cfg(feature = "hardware")]
    async fn handle_send_command(config: RadioConfig, payload: Vec<u8>) -> Result<()> {
        let mut radio = open_radio(config).await?;
        let result = radio.send_bytes(&payload).await;

        // The advertisement is withdrawn when the process exits
        if result.is_ok() {
            tokio::time::sleep(radio.config().advertise_duration).await;
        }
        let channel = radio.channel();
        radio.shutdown().await?;
        result?;

        info!("Sent {} bytes on channel {}", payload.len(), channel);
        Ok(())
    }

    #[cfg(not(feature = "hardware"))]
    async fn handle_send_command(_config: RadioConfig, _payload: Vec<u8>) -> Result<()> {
        Err(hardware_unavailable())
    }

    /// Handle the listen command
    #[cfg(feature = "hardware")]
    async fn handle_listen_command(
        config: RadioConfig,
        full: bool,
        count: Option<usize>,
    ) -> Result<()> {
        let mut radio = open_radio(config).await?;
        info!("Listening on channel {} (Ctrl-C to stop)", radio.channel());

        let result = tokio::select! {
            result = listen(&mut radio, full, count) => result.map(|_| ()),
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                Ok(())
            }
        };

        radio.shutdown().await?;
        result
    }

    #[cfg(not(feature = "hardware"))]
    async fn handle_listen_command(
        _config: RadioConfig,
        _full: bool,
        _count: Option<usize>,
    ) -> Result<()> {
        Err(hardware_unavailable())
    }

    /// Handle the demo command
    async fn handle_demo_command(config: RadioConfig, message: String) -> Result<()> {
        info!("Running simulated radios on channel {}", config.channel);
        for line in run_demo(config, &message).await? {
            println!("{}", line);
        }
        Ok(())
    }
}

#[cfg(feature = "hardware")]
async fn open_radio(config: RadioConfig) -> Result<Radio<HardwareProvider>> {
    let provider = HardwareProvider::new().await?;
    Ok(Radio::with_config(provider, config)?)
}

#[cfg(not(feature = "hardware"))]
fn hardware_unavailable() -> crate::error::CliError {
    crate::error::CliError::FeatureNotAvailable(
        "built without Bluetooth support; rebuild with `--features hardware`".to_string(),
    )
}

/// Poll `radio` and print each message until `count` have arrived
pub async fn listen<P: AdvertisementProvider>(
    radio: &mut Radio<P>,
    full: bool,
    count: Option<usize>,
) -> Result<usize> {
    let mut received = 0;
    while count.map_or(true, |limit| received < limit) {
        if let Some(message) = radio.receive_full().await? {
            println!("{}", format_message(&message, full));
            received += 1;
        }
    }
    Ok(received)
}

/// Render a message for the terminal. Binary payloads are shown as hex.
pub fn format_message(message: &ReceivedMessage, full: bool) -> String {
    let body = message
        .text()
        .unwrap_or_else(|| format!("0x{}", hex::encode(&message.payload)));
    if full {
        format!(
            "{} ({} dBm from {}, {} ms ago)",
            body,
            message.rssi,
            message.address,
            message.received_at.elapsed().as_millis()
        )
    } else {
        body
    }
}

/// Send `message` from one simulated radio and report what a listener on the
/// same channel and one on the next channel hear
pub async fn run_demo(config: RadioConfig, message: &str) -> Result<Vec<String>> {
    let channel = i64::from(config.validate()?);
    let other_channel = (channel + 1) % 256;

    let air = SimulatedAir::new();
    let mut sender = Radio::with_config(air.attach(), config.clone())?;
    let mut listener = Radio::with_config(air.attach(), config.clone())?;
    let mut outsider = Radio::with_config(air.attach(), config.with_channel(other_channel))?;

    let mut lines = Vec::new();
    sender.send(message).await?;
    lines.push(format!("A (channel {}) sent {:?}", channel, message));

    let (heard, overheard) = tokio::join!(listener.receive(), outsider.receive());
    lines.push(format!(
        "B (channel {}) heard {}",
        channel,
        describe(heard?)
    ));
    lines.push(format!(
        "C (channel {}) heard {}",
        other_channel,
        describe(overheard?)
    ));

    sender.shutdown().await?;
    listener.shutdown().await?;
    outsider.shutdown().await?;
    Ok(lines)
}

fn describe(text: Option<String>) -> String {
    match text {
        Some(text) => format!("{:?}", text),
        None => "nothing".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_demo_shows_channel_filtering() {
        let config = RadioConfig::new().with_channel(7);
        let lines = run_demo(config, "Hello").await.unwrap();
        assert_eq!(
            lines,
            [
                "A (channel 7) sent \"Hello\"",
                "B (channel 7) heard \"Hello\"",
                "C (channel 8) heard nothing",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_wraps_channel_255() {
        let config = RadioConfig::new().with_channel(255);
        let lines = run_demo(config, "x").await.unwrap();
        assert_eq!(lines[2], "C (channel 0) heard nothing");
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_rejects_oversize_message() {
        let message = "x".repeat(ble_radio::MAX_LENGTH + 1);
        let err = run_demo(RadioConfig::default(), &message).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Radio(ble_radio::RadioError::OversizeMessage { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_listen_stops_after_count() {
        let air = SimulatedAir::new();
        let config = RadioConfig::new().with_advertise_duration(Duration::from_secs(10));
        let mut sender = Radio::with_config(air.attach(), config).unwrap();
        let mut listener = Radio::new(air.attach());

        sender.send("one").await.unwrap();
        assert_eq!(listen(&mut listener, true, Some(1)).await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_format_message() {
        let message = ReceivedMessage {
            payload: b"Hi\0".to_vec(),
            rssi: -40,
            received_at: tokio::time::Instant::now(),
            address: "02:00:00:00:00:01".to_string(),
        };
        assert_eq!(format_message(&message, false), "Hi");
        assert_eq!(
            format_message(&message, true),
            "Hi (-40 dBm from 02:00:00:00:00:01, 0 ms ago)"
        );

        let binary = ReceivedMessage {
            payload: vec![0xFF, 0x00],
            ..message
        };
        assert_eq!(format_message(&binary, false), "0xff00");
    }
}
