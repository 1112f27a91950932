//! `yp anchor`: the one big challenge of the year.

use std::io::Write;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::info;
use yearplan_core::model::{Anchor, AnchorStatus};
use yearplan_core::mutate::{self, AnchorUpdate, Assignment};
use yearplan_core::suggest::Suggestion;

use super::{Context, describe_day, iso_day};
use crate::output::{pretty_kv, render};
use crate::validate::{parse_day_arg, validate_text, validate_title};

#[derive(Args, Debug)]
pub struct AnchorArgs {
    #[command(subcommand)]
    command: AnchorCommand,
}

#[derive(Subcommand, Debug)]
enum AnchorCommand {
    /// Show the anchor challenge
    Show,
    /// Edit the anchor challenge
    Set(SetArgs),
    /// Ask for an anchor idea based on an interest
    Suggest(SuggestArgs),
}

#[derive(Args, Debug)]
struct SetArgs {
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// planned, in-progress, or completed.
    #[arg(long)]
    status: Option<AnchorStatus>,

    /// Day of the challenge: YYYY-MM-DD or a zero-based day offset.
    #[arg(long)]
    date: Option<String>,
}

#[derive(Args, Debug)]
struct SuggestArgs {
    /// What you are into, e.g. "trail running".
    #[arg(required = true, num_args = 1..)]
    interest: Vec<String>,

    /// Use the suggestion as the anchor's title and description.
    #[arg(long)]
    apply: bool,
}

#[derive(Debug, Serialize)]
struct AnchorOutput {
    title: String,
    description: String,
    status: AnchorStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<u16>,
}

impl AnchorOutput {
    fn new(anchor: &Anchor, year: i32) -> Self {
        Self {
            title: anchor.title.clone(),
            description: anchor.description.clone(),
            status: anchor.status,
            date: anchor.day.and_then(|d| iso_day(year, d)),
            offset: anchor.day,
        }
    }
}

#[derive(Debug, Serialize)]
struct SuggestOutput {
    #[serde(flatten)]
    suggestion: Suggestion,
    applied: bool,
}

pub fn run_anchor(args: &AnchorArgs, ctx: &Context) -> Result<()> {
    match &args.command {
        AnchorCommand::Show => run_show(ctx),
        AnchorCommand::Set(set) => run_set(set, ctx),
        AnchorCommand::Suggest(suggest) => run_suggest(suggest, ctx),
    }
}

fn render_anchor(ctx: &Context, out: &AnchorOutput, year: i32) -> Result<()> {
    render(ctx.output, out, |a, w| {
        let title = if a.title.is_empty() { "(not chosen)" } else { a.title.as_str() };
        pretty_kv(w, "Anchor", title)?;
        pretty_kv(w, "Status", a.status.as_str())?;
        pretty_kv(
            w,
            "Date",
            a.offset
                .map_or_else(|| "not set".to_string(), |d| describe_day(year, d)),
        )?;
        if !a.description.is_empty() {
            writeln!(w)?;
            writeln!(w, "{}", a.description)?;
        }
        Ok(())
    })
}

fn run_show(ctx: &Context) -> Result<()> {
    let state = ctx.load()?;
    let out = AnchorOutput::new(&state.plan.anchor, state.plan.year);
    render_anchor(ctx, &out, state.plan.year)
}

fn run_set(args: &SetArgs, ctx: &Context) -> Result<()> {
    let update = AnchorUpdate {
        title: args.title.as_deref().map(validate_title).transpose()?,
        description: args
            .description
            .as_deref()
            .map(|d| validate_text("description", d))
            .transpose()?,
        status: args.status,
    };

    let (state, ()) = ctx.update(|state| {
        let mut plan = mutate::update_anchor(&state.plan, update);
        if let Some(raw) = &args.date {
            let offset = parse_day_arg(raw, plan.year)?;
            plan = mutate::apply(&plan, offset, Assignment::Anchor)?;
        }
        let mut next = state.clone();
        next.plan = plan;
        Ok((next, ()))
    })?;
    info!(title = %state.plan.anchor.title, day = ?state.plan.anchor.day, "anchor updated");

    let out = AnchorOutput::new(&state.plan.anchor, state.plan.year);
    render_anchor(ctx, &out, state.plan.year)
}

fn run_suggest(args: &SuggestArgs, ctx: &Context) -> Result<()> {
    let interest = validate_text("interest", &args.interest.join(" "))?;
    let theme = ctx.load()?.plan.theme;
    let suggestion = ctx.suggestion_client().suggest_anchor(&interest, &theme);

    if args.apply {
        let update = AnchorUpdate {
            title: Some(suggestion.title.clone()),
            description: Some(suggestion.description.clone()),
            status: None,
        };
        ctx.update(|state| {
            let mut next = state.clone();
            next.plan = mutate::update_anchor(&state.plan, update);
            Ok((next, ()))
        })?;
        info!(title = %suggestion.title, "applied anchor suggestion");
    }

    let out = SuggestOutput {
        suggestion,
        applied: args.apply,
    };
    render(ctx.output, &out, |o, w| write_suggestion(w, &o.suggestion, o.applied))
}

/// Shared human rendering for anchor and milestone suggestions.
pub fn write_suggestion(
    w: &mut dyn Write,
    suggestion: &Suggestion,
    applied: bool,
) -> std::io::Result<()> {
    writeln!(w, "{}", suggestion.title)?;
    writeln!(w, "{}", suggestion.description)?;
    if suggestion.fallback {
        writeln!(w, "(offline suggestion; the generator was unavailable)")?;
    }
    if applied {
        writeln!(w, "Saved to your plan.")?;
    }
    Ok(())
}
