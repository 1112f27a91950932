//! `yp milestone`: the six milestone experiences spread over the year.

use std::io::Write;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::info;
use yearplan_core::error::PlanError;
use yearplan_core::model::{AnnualPlan, MILESTONE_SLOTS};
use yearplan_core::mutate;
use yearplan_core::suggest::Suggestion;

use super::anchor::write_suggestion;
use super::{Context, describe_day, iso_day};
use crate::output::{render, render_mode, render_success};
use crate::validate::{parse_day_arg, validate_slot, validate_text, validate_title};

#[derive(Args, Debug)]
pub struct MilestoneArgs {
    #[command(subcommand)]
    command: MilestoneCommand,
}

#[derive(Subcommand, Debug)]
enum MilestoneCommand {
    /// List all six slots
    List,
    /// Set a slot's title or description
    Set(SetArgs),
    /// Empty a slot and release its days
    Rm(SlotArgs),
    /// Toggle a day in a milestone slot
    Pick(PickArgs),
    /// Ask for a milestone idea based on an interest
    Suggest(SuggestArgs),
}

#[derive(Args, Debug)]
struct SetArgs {
    /// Slot number (1-6).
    slot: usize,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug)]
struct SlotArgs {
    /// Slot number (1-6).
    slot: usize,
}

#[derive(Args, Debug)]
struct PickArgs {
    /// Day to toggle: YYYY-MM-DD or a zero-based day offset.
    day: String,

    /// Slot number (1-6). Defaults to the slot already holding the day,
    /// else the first slot with no days.
    #[arg(long)]
    slot: Option<usize>,
}

#[derive(Args, Debug)]
struct SuggestArgs {
    /// What you are into, e.g. "sailing".
    #[arg(required = true, num_args = 1..)]
    interest: Vec<String>,

    /// Slot to fill with --apply. Defaults to the first slot with no days.
    #[arg(long)]
    slot: Option<usize>,

    /// Use the suggestion as the slot's title and description.
    #[arg(long)]
    apply: bool,
}

#[derive(Debug, Serialize)]
struct SlotView {
    /// 1-based.
    slot: usize,
    title: String,
    description: String,
    dates: Vec<String>,
    days: Vec<u16>,
}

#[derive(Debug, Serialize)]
struct SlotList {
    year: i32,
    slots: Vec<SlotView>,
}

#[derive(Debug, Serialize)]
struct PickOutput {
    slot: usize,
    offset: u16,
    date: Option<String>,
    added: bool,
    days: Vec<u16>,
}

#[derive(Debug, Serialize)]
struct SuggestOutput {
    #[serde(flatten)]
    suggestion: Suggestion,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied_to: Option<usize>,
}

pub fn run_milestone(args: &MilestoneArgs, ctx: &Context) -> Result<()> {
    match &args.command {
        MilestoneCommand::List => run_list(ctx),
        MilestoneCommand::Set(set) => run_set(set, ctx),
        MilestoneCommand::Rm(rm) => run_rm(rm, ctx),
        MilestoneCommand::Pick(pick) => run_pick(pick, ctx),
        MilestoneCommand::Suggest(suggest) => run_suggest(suggest, ctx),
    }
}

fn slot_views(plan: &AnnualPlan) -> Vec<SlotView> {
    (0..MILESTONE_SLOTS)
        .map(|slot| {
            let milestone = plan.milestones[slot].as_ref();
            let days = milestone.map(|m| m.days.clone()).unwrap_or_default();
            SlotView {
                slot: slot + 1,
                title: milestone.map(|m| m.title.clone()).unwrap_or_default(),
                description: milestone.map(|m| m.description.clone()).unwrap_or_default(),
                dates: days.iter().filter_map(|&d| iso_day(plan.year, d)).collect(),
                days,
            }
        })
        .collect()
}

fn render_list_text(list: &SlotList, w: &mut dyn Write) -> std::io::Result<()> {
    for s in &list.slots {
        writeln!(w, "{}\t{}\t{}", s.slot, s.title, s.dates.join(","))?;
    }
    Ok(())
}

fn render_list_human(list: &SlotList, w: &mut dyn Write) -> std::io::Result<()> {
    for s in &list.slots {
        let title = if s.title.is_empty() { "(untitled)" } else { s.title.as_str() };
        writeln!(w, "#{} {title}", s.slot)?;
        if s.days.is_empty() {
            writeln!(w, "    no days yet")?;
        } else {
            for &day in &s.days {
                writeln!(w, "    {}", describe_day(list.year, day))?;
            }
        }
        if !s.description.is_empty() {
            writeln!(w, "    {}", s.description)?;
        }
    }
    Ok(())
}

fn run_list(ctx: &Context) -> Result<()> {
    let state = ctx.load()?;
    let list = SlotList {
        year: state.plan.year,
        slots: slot_views(&state.plan),
    };
    render_mode(ctx.output, &list, render_list_text, render_list_human)
}

fn run_set(args: &SetArgs, ctx: &Context) -> Result<()> {
    let slot = validate_slot(args.slot)?;
    let title = args.title.as_deref().map(validate_title).transpose()?;
    let description = args
        .description
        .as_deref()
        .map(|d| validate_text("description", d))
        .transpose()?;

    let (state, ()) = ctx.update(|state| {
        let mut next = state.clone();
        next.plan = mutate::set_milestone_details(&state.plan, slot, title, description)?;
        Ok((next, ()))
    })?;
    info!(slot, "milestone details updated");

    let view = slot_views(&state.plan).swap_remove(slot);
    render(ctx.output, &view, |v, w| {
        writeln!(w, "Milestone #{} is now \"{}\"", v.slot, v.title)
    })
}

fn run_rm(args: &SlotArgs, ctx: &Context) -> Result<()> {
    let slot = validate_slot(args.slot)?;
    ctx.update(|state| {
        let mut next = state.clone();
        next.plan = mutate::remove_milestone(&state.plan, slot)?;
        Ok((next, ()))
    })?;
    info!(slot, "milestone cleared");
    render_success(ctx.output, &format!("Cleared milestone #{}", slot + 1))
}

fn run_pick(args: &PickArgs, ctx: &Context) -> Result<()> {
    let slot = args.slot.map(validate_slot).transpose()?;
    let (state, (offset, outcome_slot, added)) = ctx.update(|state| {
        let offset = parse_day_arg(&args.day, state.plan.year)?;
        let outcome = mutate::pick_milestone_day(&state.plan, offset, slot)?;
        let mut next = state.clone();
        next.plan = outcome.plan;
        Ok((next, (offset, outcome.slot, outcome.added)))
    })?;
    info!(offset, slot = outcome_slot, added, "milestone day picked");

    let plan = &state.plan;
    let out = PickOutput {
        slot: outcome_slot + 1,
        offset,
        date: iso_day(plan.year, offset),
        added,
        days: plan.milestones[outcome_slot]
            .as_ref()
            .map(|m| m.days.clone())
            .unwrap_or_default(),
    };
    render(ctx.output, &out, |o, w| {
        let day = describe_day(plan.year, o.offset);
        if o.added {
            writeln!(w, "Added {day} to milestone #{}", o.slot)
        } else {
            writeln!(w, "Removed {day} from milestone #{}", o.slot)
        }
    })
}

fn run_suggest(args: &SuggestArgs, ctx: &Context) -> Result<()> {
    let interest = validate_text("interest", &args.interest.join(" "))?;
    let requested = args.slot.map(validate_slot).transpose()?;
    let state = ctx.load()?;
    let suggestion = ctx
        .suggestion_client()
        .suggest_milestone(&interest, &state.plan.theme);

    let applied_to = if args.apply {
        let title = suggestion.title.clone();
        let description = suggestion.description.clone();
        let (_, slot) = ctx.update(|state| {
            let slot = requested
                .or_else(|| state.plan.first_unset_slot())
                .ok_or(PlanError::NoFreeSlot)?;
            let mut next = state.clone();
            next.plan =
                mutate::set_milestone_details(&state.plan, slot, Some(title), Some(description))?;
            Ok((next, slot))
        })?;
        info!(slot, title = %suggestion.title, "applied milestone suggestion");
        Some(slot + 1)
    } else {
        None
    };

    let out = SuggestOutput {
        suggestion,
        applied_to,
    };
    render(ctx.output, &out, |o, w| {
        write_suggestion(w, &o.suggestion, false)?;
        if let Some(slot) = o.applied_to {
            writeln!(w, "Saved to milestone #{slot}.")?;
        }
        Ok(())
    })
}
