//! `yp status`: one-screen summary of the plan.
//!
//! The first thing to run after `init`. Shows the theme, the anchor and how
//! far away it is, goal progress per category, milestone coverage, the next
//! milestone, protected days, the latest weekly score, and prep progress.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use yearplan_core::calendar::{day_index, next_milestone_from};
use yearplan_core::model::{AppState, Category, MILESTONE_SLOTS};
use yearplan_core::mutate::scheduled_milestones;

use super::{Context, iso_day};
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Debug, Serialize)]
struct AnchorSummary {
    title: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    days_until: Option<i64>,
}

#[derive(Debug, Serialize)]
struct CategorySummary {
    category: &'static str,
    done: usize,
    total: usize,
}

#[derive(Debug, Serialize)]
struct NextMilestone {
    slot: usize,
    title: String,
    date: Option<String>,
    days_until: i64,
}

#[derive(Debug, Serialize)]
struct StatusOutput {
    year: i32,
    theme: String,
    onboarding_complete: bool,
    anchor: AnchorSummary,
    goals: Vec<CategorySummary>,
    milestones_scheduled: usize,
    milestone_slots: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_milestone: Option<NextMilestone>,
    protected_days: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest_score: Option<u8>,
    prep_done: usize,
    prep_total: usize,
}

fn summarize(state: &AppState, ctx: &Context) -> StatusOutput {
    let plan = &state.plan;
    let today_offset = day_index::signed_offset(plan.year, ctx.today);

    let anchor = AnchorSummary {
        title: plan.anchor.title.clone(),
        status: plan.anchor.status.as_str(),
        date: plan.anchor.day.and_then(|d| iso_day(plan.year, d)),
        days_until: plan.anchor.day.map(|d| i64::from(d) - today_offset),
    };

    let goals = Category::ALL
        .iter()
        .map(|&category| {
            let in_category = plan.goals_in(category);
            CategorySummary {
                category: category.as_str(),
                done: in_category.iter().filter(|g| g.completed).count(),
                total: in_category.len(),
            }
        })
        .collect();

    let next_milestone = next_milestone_from(plan, ctx.today).map(|c| NextMilestone {
        slot: c.slot + 1,
        title: c.title,
        date: iso_day(plan.year, c.first_day),
        days_until: c.days_until,
    });

    let (prep_done, prep_total) = state.prep_progress();
    StatusOutput {
        year: plan.year,
        theme: plan.theme.clone(),
        onboarding_complete: state.onboarding_complete,
        anchor,
        goals,
        milestones_scheduled: scheduled_milestones(plan),
        milestone_slots: MILESTONE_SLOTS,
        next_milestone,
        protected_days: plan.protected.len(),
        latest_score: state.latest_score(),
        prep_done,
        prep_total,
    }
}

fn anchor_line(anchor: &AnchorSummary) -> String {
    let title = if anchor.title.is_empty() {
        "(not chosen)"
    } else {
        anchor.title.as_str()
    };
    match (&anchor.date, anchor.days_until) {
        (Some(date), Some(days)) if days > 0 => {
            format!("{title} [{}] on {date}, in {days} days", anchor.status)
        }
        (Some(date), Some(0)) => format!("{title} [{}] on {date}, today", anchor.status),
        (Some(date), _) => format!("{title} [{}] on {date}", anchor.status),
        _ => format!("{title} [{}], no date yet", anchor.status),
    }
}

fn next_line(next: Option<&NextMilestone>) -> String {
    next.map_or_else(
        || "none upcoming".to_string(),
        |n| {
            let title = if n.title.is_empty() { "untitled" } else { n.title.as_str() };
            let date = n.date.as_deref().unwrap_or("?");
            format!("#{} {title} on {date}, in {} days", n.slot, n.days_until)
        },
    )
}

fn render_status_text(s: &StatusOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "year={} theme={:?} onboarding={}", s.year, s.theme, s.onboarding_complete)?;
    writeln!(w, "anchor {}", anchor_line(&s.anchor))?;
    for g in &s.goals {
        writeln!(w, "goals {} {}/{}", g.category, g.done, g.total)?;
    }
    writeln!(w, "milestones {}/{}", s.milestones_scheduled, s.milestone_slots)?;
    writeln!(w, "next {}", next_line(s.next_milestone.as_ref()))?;
    writeln!(w, "protected {}", s.protected_days)?;
    match s.latest_score {
        Some(score) => writeln!(w, "score {score}/10")?,
        None => writeln!(w, "score -")?,
    }
    writeln!(w, "prep {}/{}", s.prep_done, s.prep_total)
}

fn render_status_human(s: &StatusOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("{}: {}", s.year, s.theme))?;
    pretty_kv(w, "Anchor", anchor_line(&s.anchor))?;
    for g in &s.goals {
        pretty_kv(w, g.category, format!("{}/{} done", g.done, g.total))?;
    }
    pretty_kv(
        w,
        "Milestones",
        format!("{}/{} scheduled", s.milestones_scheduled, s.milestone_slots),
    )?;
    pretty_kv(w, "Next", next_line(s.next_milestone.as_ref()))?;
    pretty_kv(w, "Protected", format!("{} days", s.protected_days))?;
    pretty_kv(
        w,
        "Last week",
        s.latest_score
            .map_or_else(|| "no reviews yet".to_string(), |score| format!("{score}/10")),
    )?;
    pretty_kv(w, "Prep", format!("{}/{} done", s.prep_done, s.prep_total))?;

    if !s.onboarding_complete {
        writeln!(w)?;
        writeln!(w, "Setup is not finished:")?;
        if s.anchor.title.is_empty() {
            writeln!(w, "  yp anchor set --title \"...\"        choose the anchor challenge")?;
        }
        if s.anchor.date.is_none() {
            writeln!(w, "  yp mark <DATE> --as anchor         give it a day")?;
        }
        if s.milestones_scheduled < s.milestone_slots {
            writeln!(w, "  yp milestone pick <DATE>           schedule milestone days")?;
        }
        writeln!(w, "  yp finish                          when you are ready")?;
    }
    Ok(())
}

pub fn run_status(ctx: &Context) -> Result<()> {
    let state = ctx.load()?;
    let report = summarize(&state, ctx);
    render_mode(ctx.output, &report, render_status_text, render_status_human)
}
