//! `yp week`: weekly reviews, self-scored on execution and effort.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::info;
use yearplan_core::model::{Category, CategoryWin, WeekStatus, WeeklyWin, new_id};
use yearplan_core::model::weekly::{DEFAULT_SELF_SCORE, week_start_for};
use yearplan_core::mutate;

use super::Context;
use crate::output::{pretty_section, render, render_mode};
use crate::validate::{parse_win_entry, validate_text};

#[derive(Args, Debug)]
pub struct WeekArgs {
    #[command(subcommand)]
    command: WeekCommand,
}

#[derive(Subcommand, Debug)]
enum WeekCommand {
    /// Record a weekly review
    Add(AddArgs),
    /// Show recent reviews, newest first
    List(ListArgs),
}

#[derive(Args, Debug)]
struct AddArgs {
    /// Any day in the week under review (defaults to this week).
    #[arg(long)]
    week: Option<NaiveDate>,

    /// A win for the week as CATEGORY=TASK. Repeatable.
    #[arg(long = "win", value_name = "CATEGORY=TASK")]
    wins: Vec<String>,

    /// Mark the wins in this category as achieved. Repeatable.
    #[arg(long = "done", value_name = "CATEGORY")]
    done: Vec<Category>,

    /// A standard held all week, e.g. "The First 60". Repeatable.
    #[arg(long = "non-negotiable", value_name = "TEXT")]
    non_negotiables: Vec<String>,

    /// How well the week was executed, 1 to 10.
    #[arg(long, default_value_t = DEFAULT_SELF_SCORE, value_parser = clap::value_parser!(u8).range(1..=10))]
    execution: u8,

    /// How hard the week was pushed, 1 to 10.
    #[arg(long, default_value_t = DEFAULT_SELF_SCORE, value_parser = clap::value_parser!(u8).range(1..=10))]
    effort: u8,

    #[arg(long, default_value = "")]
    reflections: String,

    /// planned or completed.
    #[arg(long, default_value = "completed")]
    status: WeekStatus,
}

const DEFAULT_LIMIT: usize = 8;

#[derive(Args, Debug)]
struct ListArgs {
    /// Show at most this many reviews.
    #[arg(long, short = 'n', default_value_t = DEFAULT_LIMIT)]
    limit: usize,
}

#[derive(Debug, Serialize)]
struct WeekList<'a> {
    weeks: &'a [WeeklyWin],
}

pub fn run_week(args: &WeekArgs, ctx: &Context) -> Result<()> {
    match &args.command {
        WeekCommand::Add(add) => run_add(add, ctx),
        WeekCommand::List(list) => run_list(list, ctx),
    }
}

fn build_entries(wins: &[String], done: &[Category]) -> Result<Vec<CategoryWin>> {
    wins.iter()
        .map(|raw| {
            let (category, task) = parse_win_entry(raw)?;
            Ok(CategoryWin {
                category,
                task,
                completed: done.contains(&category),
            })
        })
        .collect()
}

fn run_add(args: &AddArgs, ctx: &Context) -> Result<()> {
    let entries = build_entries(&args.wins, &args.done)?;
    let reflections = validate_text("reflections", &args.reflections)?;
    let week_start = week_start_for(args.week.unwrap_or(ctx.today));
    let non_negotiables = args
        .non_negotiables
        .iter()
        .map(|item| validate_text("non-negotiable", item))
        .collect::<Result<Vec<_>, _>>()?;
    let win = WeeklyWin::new(new_id(), week_start, entries, reflections, args.status)
        .with_non_negotiables(non_negotiables)
        .with_self_score(args.execution, args.effort);

    let (_, win) = ctx.update(|state| Ok((mutate::record_weekly_win(state, win.clone()), win)))?;
    info!(id = %win.id, week = %win.week_start, score = win.score, "weekly review recorded");

    render(ctx.output, &win, |review, w| {
        writeln!(
            w,
            "Week of {}: {}/10 ({} of {} wins)",
            review.week_start.format("%Y-%m-%d"),
            review.score,
            review.completed_entries(),
            review.entries.len()
        )
    })
}

fn render_list_text(list: &WeekList<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    for week in list.weeks {
        writeln!(
            w,
            "{}\t{}\t{}/10\t{}",
            week.week_start.format("%Y-%m-%d"),
            week.status,
            week.score,
            week.id
        )?;
    }
    Ok(())
}

fn render_list_human(list: &WeekList<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    if list.weeks.is_empty() {
        return writeln!(w, "No weekly reviews yet. Record one with `yp week add`.");
    }
    for (i, week) in list.weeks.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        pretty_section(
            w,
            &format!(
                "Week of {}  {}/10  [{}]",
                week.week_start.format("%Y-%m-%d"),
                week.score,
                week.status
            ),
        )?;
        if let (Some(execution), Some(effort)) = (week.execution, week.effort) {
            writeln!(w, "  execution {execution}  effort {effort}")?;
        }
        for standard in &week.non_negotiables {
            writeln!(w, "  * {standard}")?;
        }
        for entry in &week.entries {
            let check = if entry.completed { "x" } else { " " };
            writeln!(w, "  [{check}] {:<12} {}", entry.category, entry.task)?;
        }
        if !week.reflections.is_empty() {
            writeln!(w, "  {}", week.reflections)?;
        }
    }
    Ok(())
}

/// Most recent reviews. Used by the weeks view.
pub fn run_week_list(ctx: &Context) -> Result<()> {
    run_list(
        &ListArgs {
            limit: DEFAULT_LIMIT,
        },
        ctx,
    )
}

fn run_list(args: &ListArgs, ctx: &Context) -> Result<()> {
    let state = ctx.load()?;
    let shown = args.limit.min(state.weekly_wins.len());
    let list = WeekList {
        weeks: &state.weekly_wins[..shown],
    };
    render_mode(ctx.output, &list, render_list_text, render_list_human)
}
