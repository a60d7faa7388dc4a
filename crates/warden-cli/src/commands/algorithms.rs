//! The `algorithms` management command.
//!
//! Lists the digest algorithms available for encoding and marks the one
//! configured in settings.

use async_trait::async_trait;
use warden_auth::PasswordEncoder;
use warden_core::{Settings, WardenError};

use crate::command::ManagementCommand;

/// Lists supported password algorithms.
pub struct AlgorithmsCommand;

/// Renders one line per algorithm, prefixing the configured one with `*`.
pub fn render_algorithms(settings: &Settings) -> Result<String, WardenError> {
    let encoder = PasswordEncoder::from_settings(&settings.password)?;
    let policy = encoder.policy();
    let lines: Vec<String> = PasswordEncoder::supported_algorithms()
        .into_iter()
        .map(|algorithm| {
            let marker = if algorithm == policy.algorithm { '*' } else { ' ' };
            format!("{marker} {algorithm}")
        })
        .collect();
    Ok(lines.join("\n"))
}

#[async_trait]
impl ManagementCommand for AlgorithmsCommand {
    fn name(&self) -> &'static str {
        "algorithms"
    }

    fn help(&self) -> &'static str {
        "List supported password algorithms"
    }

    async fn handle(
        &self,
        _matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), WardenError> {
        println!("{}", render_algorithms(settings)?);
        Ok(())
    }
}
