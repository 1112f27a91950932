//! `yp mark`: assign a calendar day to one part of the plan.

use std::io::Write;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::info;
use yearplan_core::calendar::CalendarSession;
use yearplan_core::error::ErrorCode;
use yearplan_core::model::DayOwner;
use yearplan_core::mutate::{Assignment, MilestonePolicy};

use super::{Context, describe_day, iso_day};
use crate::output::render;
use crate::validate::{ValidationError, parse_day_arg, validate_slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarkAs {
    Anchor,
    Protected,
    Milestone,
    Clear,
}

#[derive(Args, Debug)]
pub struct MarkArgs {
    /// Day to assign: YYYY-MM-DD or a zero-based day offset.
    pub day: String,

    /// What the day becomes.
    #[arg(long = "as", value_enum)]
    pub assign: MarkAs,

    /// Milestone slot (1-6). Defaults to the first slot with no days.
    #[arg(long)]
    pub slot: Option<usize>,

    /// How a milestone slot grows (accumulate, pair-then-reset).
    /// Defaults to `calendar.milestone_policy` from config.
    #[arg(long)]
    pub policy: Option<MilestonePolicy>,
}

#[derive(Debug, Serialize)]
struct MarkOutput {
    offset: u16,
    date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous: Option<DayOwner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<DayOwner>,
}

fn owner_text(owner: Option<DayOwner>) -> String {
    match owner {
        None => "free".to_string(),
        Some(DayOwner::Anchor) => "anchor".to_string(),
        Some(DayOwner::Protected) => "protected".to_string(),
        Some(DayOwner::Milestone(slot)) => format!("milestone {}", slot + 1),
    }
}

fn assignment_for(args: &MarkArgs) -> Result<Assignment, ValidationError> {
    if args.slot.is_some() && args.assign != MarkAs::Milestone {
        return Err(ValidationError::new(
            "slot",
            args.slot.map(|s| s.to_string()).unwrap_or_default(),
            "only applies to --as milestone",
            "drop --slot or use --as milestone",
            ErrorCode::InvalidInput,
        ));
    }
    Ok(match args.assign {
        MarkAs::Anchor => Assignment::Anchor,
        MarkAs::Protected => Assignment::Protected,
        MarkAs::Clear => Assignment::Clear,
        MarkAs::Milestone => Assignment::Milestone {
            slot: args.slot.map(validate_slot).transpose()?,
        },
    })
}

pub fn run_mark(args: &MarkArgs, ctx: &Context) -> Result<()> {
    let assignment = assignment_for(args)?;
    let policy = args
        .policy
        .unwrap_or(ctx.config.user.calendar.milestone_policy);
    let session = CalendarSession::editing(assignment, policy);

    let (state, (offset, previous)) = ctx.update(|state| {
        let offset = parse_day_arg(&args.day, state.plan.year)?;
        let previous = state.plan.owner_of(offset);
        let mut next = state.clone();
        if let Some(plan) = session.click(&state.plan, offset)? {
            next.plan = plan;
        }
        Ok((next, (offset, previous)))
    })?;

    let plan = &state.plan;
    let out = MarkOutput {
        offset,
        date: iso_day(plan.year, offset),
        previous,
        owner: plan.owner_of(offset),
    };
    info!(offset, ?assignment, "marked day");
    render(ctx.output, &out, |o, w| {
        let day = describe_day(plan.year, o.offset);
        if o.previous == o.owner {
            writeln!(w, "{day}: {} (unchanged)", owner_text(o.owner))
        } else {
            writeln!(
                w,
                "{day}: {} -> {}",
                owner_text(o.previous),
                owner_text(o.owner)
            )
        }
    })
}
