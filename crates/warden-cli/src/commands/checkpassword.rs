//! The `checkpassword` management command.
//!
//! Checks a clear-text password against a stored value, salt, and
//! algorithm triple. The current policy plays no part in the comparison.

use async_trait::async_trait;
use warden_auth::{AlgorithmId, EncodedSecret};
use warden_core::{Settings, WardenError};

use crate::command::{optional_arg, required_arg, ManagementCommand};

/// Checks a password against a stored record.
pub struct CheckpasswordCommand;

/// Returns `true` if `password` matches the stored triple.
pub fn check_password(
    password: &str,
    value: &str,
    algorithm: &str,
    salt: Option<&str>,
) -> Result<bool, WardenError> {
    let algorithm: AlgorithmId = algorithm.trim().parse()?;
    let stored = EncodedSecret {
        value: Some(value.to_string()),
        salt: salt.filter(|salt| !salt.is_empty()).map(str::to_string),
        algorithm,
    };
    Ok(stored.matches(password))
}

#[async_trait]
impl ManagementCommand for CheckpasswordCommand {
    fn name(&self) -> &'static str {
        "checkpassword"
    }

    fn help(&self) -> &'static str {
        "Check a password against a stored value"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("password")
                .long("password")
                .required(true)
                .help("Clear-text password to check"),
        )
        .arg(
            clap::Arg::new("value")
                .long("value")
                .required(true)
                .help("Stored encoded value"),
        )
        .arg(
            clap::Arg::new("algorithm")
                .long("algorithm")
                .required(true)
                .help("Algorithm the value was encoded with"),
        )
        .arg(
            clap::Arg::new("salt")
                .long("salt")
                .help("Salt the value was encoded with"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        _settings: &Settings,
    ) -> Result<(), WardenError> {
        let algorithm = required_arg(matches, "algorithm")?;
        let matched = check_password(
            required_arg(matches, "password")?,
            required_arg(matches, "value")?,
            algorithm,
            optional_arg(matches, "salt"),
        )?;
        println!(
            "{}",
            serde_json::json!({ "algorithm": algorithm, "matches": matched })
        );
        Ok(())
    }
}
