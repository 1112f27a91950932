//! `yp config`: inspect the resolved configuration.

use std::io::Write;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use yearplan_core::config::{SuggestConfig, UserConfig};

use super::Context;
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Show resolved or raw configuration
    Show(ShowArgs),
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Show the user config file as written, without defaults
    #[arg(long)]
    raw: bool,
}

#[derive(Debug, Serialize)]
struct ResolvedConfig<'a> {
    config_path: Option<String>,
    config_file_exists: bool,
    data_dir: String,
    output: &'a str,
    milestone_policy: String,
    suggest: &'a SuggestConfig,
    api_key_present: bool,
}

pub fn run_config(args: &ConfigArgs, ctx: &Context) -> Result<()> {
    match &args.command {
        ConfigCommand::Show(show) => run_show(show, ctx),
    }
}

fn run_show(args: &ShowArgs, ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    if args.raw {
        return show_raw(ctx);
    }

    let resolved = ResolvedConfig {
        config_path: config.config_path.as_ref().map(|p| p.display().to_string()),
        config_file_exists: config.config_path.as_ref().is_some_and(|p| p.exists()),
        data_dir: config.data_dir.display().to_string(),
        output: &config.resolved_output,
        milestone_policy: config.user.calendar.milestone_policy.to_string(),
        suggest: &config.user.suggest,
        api_key_present: std::env::var(&config.user.suggest.api_key_env)
            .is_ok_and(|k| !k.trim().is_empty()),
    };
    render_mode(ctx.output, &resolved, render_text, render_human)
}

fn render_text(c: &ResolvedConfig<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "config_path={}", c.config_path.as_deref().unwrap_or("-"))?;
    writeln!(w, "data_dir={}", c.data_dir)?;
    writeln!(w, "output={}", c.output)?;
    writeln!(w, "calendar.milestone_policy={}", c.milestone_policy)?;
    writeln!(w, "suggest.endpoint={}", c.suggest.endpoint)?;
    writeln!(w, "suggest.model={}", c.suggest.model)?;
    writeln!(w, "suggest.api_key_env={}", c.suggest.api_key_env)?;
    writeln!(w, "suggest.timeout_secs={}", c.suggest.timeout_secs)
}

fn render_human(c: &ResolvedConfig<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Configuration")?;
    let path = match (&c.config_path, c.config_file_exists) {
        (Some(p), true) => p.clone(),
        (Some(p), false) => format!("{p} (not present, using defaults)"),
        (None, _) => "none".to_string(),
    };
    pretty_kv(w, "Config file", path)?;
    pretty_kv(w, "Data dir", &c.data_dir)?;
    pretty_kv(w, "Output", c.output)?;
    pretty_kv(w, "Milestones", &c.milestone_policy)?;
    writeln!(w)?;
    pretty_section(w, "Suggestions")?;
    pretty_kv(w, "Endpoint", &c.suggest.endpoint)?;
    pretty_kv(w, "Model", &c.suggest.model)?;
    let key = if c.api_key_present { "set" } else { "missing" };
    pretty_kv(w, "API key", format!("${} ({key})", c.suggest.api_key_env))?;
    pretty_kv(w, "Timeout", format!("{}s", c.suggest.timeout_secs))
}

fn show_raw(ctx: &Context) -> Result<()> {
    let raw = match &ctx.config.config_path {
        Some(path) if path.exists() => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => String::new(),
    };
    if ctx.output.is_json() {
        let parsed: UserConfig = toml::from_str(&raw).context("Failed to parse config")?;
        println!("{}", serde_json::to_string_pretty(&parsed)?);
    } else {
        print!("{raw}");
    }
    Ok(())
}
