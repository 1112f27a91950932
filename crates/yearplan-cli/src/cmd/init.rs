//! `yp init`: create a fresh plan in the state directory.

use anyhow::Result;
use chrono::Datelike;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use tracing::info;
use yearplan_core::error::PlanError;
use yearplan_core::model::AppState;
use yearplan_core::mutate;

use super::Context;
use crate::output::{pretty_kv, render};
use crate::validate::{validate_title, validate_year};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Year to plan. Defaults to the current year.
    #[arg(long)]
    pub year: Option<i32>,

    /// Theme for the year.
    #[arg(long)]
    pub theme: Option<String>,

    /// Replace an existing plan.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct InitReport {
    year: i32,
    theme: String,
    state_file: String,
    replaced: bool,
}

pub fn run_init(args: &InitArgs, ctx: &Context) -> Result<()> {
    let year = validate_year(args.year.unwrap_or_else(|| ctx.today.year()))?;
    let existed = ctx.store.exists();
    if existed && !args.force {
        return Err(PlanError::AlreadyInitialized(ctx.store.dir().to_path_buf()).into());
    }

    let mut state = AppState::new(year);
    if let Some(theme) = &args.theme {
        state.plan = mutate::set_theme(&state.plan, &validate_title(theme)?);
    }
    ctx.store.save(&state)?;
    info!(year, replaced = existed, "initialized plan");

    let report = InitReport {
        year,
        theme: state.plan.theme.clone(),
        state_file: ctx.store.state_path().display().to_string(),
        replaced: existed,
    };
    render(ctx.output, &report, |r, w| {
        writeln!(w, "Started the {} plan.", r.year)?;
        pretty_kv(w, "Theme", &r.theme)?;
        pretty_kv(w, "State", &r.state_file)?;
        writeln!(w)?;
        writeln!(w, "Next: set your anchor with `yp anchor set` and give it a day with `yp mark <DATE> --as anchor`.")
    })
}
