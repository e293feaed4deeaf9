//! Dry-run engine.
//!
//! Renders every built validation as pretty JSON instead of executing it.
//! When asked to really execute it fails, so a binary linked against this
//! engine still runs every artifact and reports each one as skipped.

use crate::adapters::yaml::ValidationConfig;
use crate::core::collaborator::ValidationEngine;
use crate::core::context::ExecutionContext;
use crate::core::error::EngineError;
use parking_lot::Mutex;
use std::io::{self, Write};

/// Engine that only renders configs.
pub struct DryRunEngine<W = io::Stdout> {
    out: Mutex<W>,
}

impl DryRunEngine<io::Stdout> {
    /// Render to standard output.
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for DryRunEngine<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> DryRunEngine<W> {
    /// Render to `writer`.
    pub fn with_writer(writer: W) -> Self {
        Self {
            out: Mutex::new(writer),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn render(&self, configs: &[ValidationConfig]) -> Result<(), anyhow::Error> {
        let mut out = self.out.lock();
        for config in configs {
            let json = serde_json::to_string_pretty(config).map_err(EngineError::from)?;
            writeln!(out, "{}", json)?;
        }
        out.flush()?;
        Ok(())
    }
}

impl<W: Write> ValidationEngine<ValidationConfig> for DryRunEngine<W> {
    fn run(&self, ctx: &ExecutionContext, configs: &[ValidationConfig]) -> anyhow::Result<()> {
        if !ctx.dry_run {
            return Err(EngineError::NotAvailable {
                artifact: ctx.artifact().name(),
            }
            .into());
        }

        log::info!(
            "Dry run of {}: rendering {} validation(s)",
            ctx.artifact().name(),
            configs.len()
        );
        self.render(configs)
    }
}
