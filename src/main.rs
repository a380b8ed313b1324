use std::process::ExitCode;

use a2p_keygen::{DeviceId, Generator, KeygenError, LicenseKey};
use clap::Parser;
use tracing_subscriber::EnvFilter;

const EXAMPLE: &str = "Example:\n  a2p-keygen 1234ABCD5678";
const BORDER_WIDTH: usize = 40;

/// Generates the license key for an Analyse2Print device.
///
/// The device id is shown on the license activation screen
/// or can be read via serial when the device boots.
#[derive(Parser, Debug)]
#[command(name = "a2p-keygen", version, about, after_help = EXAMPLE)]
struct Args {
    /// The device id to generate a license key for.
    device_id: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args.device_id.as_deref()) {
        Ok((device, key)) => {
            print!("{}", render(&device, &key));
            ExitCode::SUCCESS
        }
        Err(KeygenError::MissingArgument) => {
            println!("Usage: a2p-keygen <device_id>");
            println!();
            println!("{EXAMPLE}");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(device_id: Option<&str>) -> Result<(DeviceId, LicenseKey), KeygenError> {
    let raw = device_id.ok_or(KeygenError::MissingArgument)?;
    let device = DeviceId::parse(raw)?;
    let key = Generator::default().generate(&device);
    tracing::info!(device = %device, "issued license key");
    Ok((device, key))
}

fn render(device: &DeviceId, key: &LicenseKey) -> String {
    let border = "=".repeat(BORDER_WIDTH);
    format!("\n{border}\nDevice ID:    {device}\nLicense Key:  {key}\n{border}\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn missing_device_id_should_fail() {
        assert_eq!(Err(KeygenError::MissingArgument), run(None));
    }

    #[test]
    pub fn short_device_id_should_fail() {
        let result = run(Some("abc"));
        assert!(matches!(result, Err(KeygenError::InvalidDeviceId { min: 8, .. })));
    }

    #[test]
    pub fn error_message_should_name_minimum_length() {
        let err = run(Some("  abc  ")).unwrap_err();
        assert_eq!("Device ID should be at least 8 characters", err.to_string());
    }

    #[test]
    pub fn render_should_print_bordered_block() {
        // Given
        let (device, key) = run(Some(" 1234abcd5678 ")).unwrap();

        // When
        let output = render(&device, &key);

        // Then
        let expected = format!(
            "\n{0}\nDevice ID:    1234ABCD5678\nLicense Key:  8B99-51B8-2928-936B\n{0}\n\n",
            "=".repeat(40)
        );
        assert_eq!(expected, output);
    }

    #[test]
    pub fn args_should_accept_missing_device_id() {
        let args = Args::try_parse_from(["a2p-keygen"]).unwrap();
        assert_eq!(None, args.device_id);
    }

    #[test]
    pub fn args_should_capture_device_id() {
        let args = Args::try_parse_from(["a2p-keygen", "1234ABCD5678"]).unwrap();
        assert_eq!(Some("1234ABCD5678".to_string()), args.device_id);
    }
}
