//! The `encodepassword` management command.
//!
//! Encodes a clear-text password with the configured policy, or with an
//! explicit salt and algorithm, and prints the stored record as JSON.

use async_trait::async_trait;
use warden_auth::PasswordEncoder;
use warden_core::{Settings, WardenError};

use crate::command::{optional_arg, required_arg, ManagementCommand};

/// Encodes a password and prints the resulting record.
pub struct EncodepasswordCommand;

/// Encodes `password` and renders the result as pretty JSON.
pub fn encode_to_json(
    settings: &Settings,
    password: &str,
    salt: Option<&str>,
    algorithm: Option<&str>,
) -> Result<String, WardenError> {
    let encoder = PasswordEncoder::from_settings(&settings.password)?;
    let encoded = encoder.encode(password, salt, algorithm)?;
    Ok(serde_json::to_string_pretty(&encoded)?)
}

#[async_trait]
impl ManagementCommand for EncodepasswordCommand {
    fn name(&self) -> &'static str {
        "encodepassword"
    }

    fn help(&self) -> &'static str {
        "Encode a password and print the stored record as JSON"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("password")
                .long("password")
                .required(true)
                .help("Clear-text password to encode"),
        )
        .arg(
            clap::Arg::new("salt")
                .long("salt")
                .help("Salt to use instead of a generated one"),
        )
        .arg(
            clap::Arg::new("algorithm")
                .long("algorithm")
                .help("Algorithm to use instead of the configured one"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), WardenError> {
        let output = encode_to_json(
            settings,
            required_arg(matches, "password")?,
            optional_arg(matches, "salt"),
            optional_arg(matches, "algorithm"),
        )?;
        println!("{output}");
        Ok(())
    }
}
