//! `yp goal`: goals in the four life categories.

use std::io::Write;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::info;
use yearplan_core::error::PlanError;
use yearplan_core::model::{AnnualPlan, Category, Goal};
use yearplan_core::mutate::{self, GoalUpdate};

use super::Context;
use crate::output::{pretty_section, render, render_mode, render_success};
use crate::validate::{validate_text, validate_title};

#[derive(Args, Debug)]
pub struct GoalArgs {
    #[command(subcommand)]
    command: GoalCommand,
}

#[derive(Subcommand, Debug)]
enum GoalCommand {
    /// Add a goal
    Add(AddArgs),
    /// List goals, grouped by category
    List(ListArgs),
    /// Edit a goal
    Edit(EditArgs),
    /// Toggle a goal between open and done
    Done(IdArgs),
    /// Delete a goal
    Rm(IdArgs),
}

#[derive(Args, Debug)]
struct AddArgs {
    /// health, wealth, relationship, or self.
    #[arg(long, short)]
    category: Category,

    #[arg(long, short)]
    title: String,

    #[arg(long, short, default_value = "")]
    description: String,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Only this category.
    #[arg(long, short)]
    category: Option<Category>,
}

#[derive(Args, Debug)]
struct EditArgs {
    /// Goal ID, or a unique prefix of one.
    id: String,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    category: Option<Category>,
}

#[derive(Args, Debug)]
struct IdArgs {
    /// Goal ID, or a unique prefix of one.
    id: String,
}

#[derive(Debug, Serialize)]
struct GoalGroup<'a> {
    category: Category,
    goals: Vec<&'a Goal>,
}

#[derive(Debug, Serialize)]
struct GoalList<'a> {
    groups: Vec<GoalGroup<'a>>,
}

pub fn run_goal(args: &GoalArgs, ctx: &Context) -> Result<()> {
    match &args.command {
        GoalCommand::Add(add) => run_add(add, ctx),
        GoalCommand::List(list) => run_list(list, ctx),
        GoalCommand::Edit(edit) => run_edit(edit, ctx),
        GoalCommand::Done(id) => run_done(id, ctx),
        GoalCommand::Rm(id) => run_rm(id, ctx),
    }
}

/// Resolve an exact goal ID or a prefix that matches exactly one goal.
fn resolve_goal_id(plan: &AnnualPlan, raw: &str) -> Result<String, PlanError> {
    let raw = raw.trim();
    if plan.goals.iter().any(|g| g.id == raw) {
        return Ok(raw.to_string());
    }
    let mut matches = plan
        .goals
        .iter()
        .filter(|g| !raw.is_empty() && g.id.starts_with(raw));
    match (matches.next(), matches.next()) {
        (Some(goal), None) => Ok(goal.id.clone()),
        _ => Err(PlanError::GoalNotFound(raw.to_string())),
    }
}

fn goal_line(goal: &Goal) -> String {
    let check = if goal.completed { "x" } else { " " };
    format!("[{check}] {}  {}", goal.id, goal.title)
}

fn run_add(args: &AddArgs, ctx: &Context) -> Result<()> {
    let title = validate_title(&args.title)?;
    let description = validate_text("description", &args.description)?;
    let (_, goal) = ctx.update(|state| {
        let (plan, goal) = mutate::add_goal(&state.plan, args.category, &title, &description)?;
        let mut next = state.clone();
        next.plan = plan;
        Ok((next, goal))
    })?;
    info!(id = %goal.id, category = %goal.category, "goal added");
    render(ctx.output, &goal, |g, w| {
        writeln!(w, "Added {} goal {}: {}", g.category, g.id, g.title)
    })
}

fn render_groups_text(list: &GoalList<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    for group in &list.groups {
        for goal in &group.goals {
            writeln!(w, "{}\t{}", group.category, goal_line(goal))?;
        }
    }
    Ok(())
}

fn render_groups_human(list: &GoalList<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    for (i, group) in list.groups.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        let done = group.goals.iter().filter(|g| g.completed).count();
        pretty_section(
            w,
            &format!("{} ({done}/{})", group.category, group.goals.len()),
        )?;
        if group.goals.is_empty() {
            writeln!(w, "  (none)")?;
        }
        for goal in &group.goals {
            writeln!(w, "  {}", goal_line(goal))?;
            if !goal.description.is_empty() {
                writeln!(w, "      {}", goal.description)?;
            }
        }
    }
    Ok(())
}

fn run_list(args: &ListArgs, ctx: &Context) -> Result<()> {
    let state = ctx.load()?;
    let groups: Vec<GoalGroup<'_>> = Category::ALL
        .iter()
        .filter(|&&c| args.category.is_none_or(|only| only == c))
        .map(|&category| GoalGroup {
            category,
            goals: state.plan.goals_in(category),
        })
        .collect();
    let list = GoalList { groups };
    render_mode(ctx.output, &list, render_groups_text, render_groups_human)
}

/// All goals, every category. Used by the goals view.
pub fn run_goal_list(ctx: &Context) -> Result<()> {
    run_list(&ListArgs { category: None }, ctx)
}

fn run_edit(args: &EditArgs, ctx: &Context) -> Result<()> {
    let update = GoalUpdate {
        title: args.title.as_deref().map(validate_title).transpose()?,
        description: args
            .description
            .as_deref()
            .map(|d| validate_text("description", d))
            .transpose()?,
        category: args.category,
        completed: None,
    };
    let (state, id) = ctx.update(|state| {
        let id = resolve_goal_id(&state.plan, &args.id)?;
        let mut next = state.clone();
        next.plan = mutate::update_goal(&state.plan, &id, update)?;
        Ok((next, id))
    })?;
    info!(%id, "goal edited");
    let goal = state.plan.goals.iter().find(|g| g.id == id);
    render(ctx.output, &goal, |g, w| match g {
        Some(g) => writeln!(w, "Updated {}", goal_line(g)),
        None => Ok(()),
    })
}

fn run_done(args: &IdArgs, ctx: &Context) -> Result<()> {
    let (state, id) = ctx.update(|state| {
        let id = resolve_goal_id(&state.plan, &args.id)?;
        let mut next = state.clone();
        next.plan = mutate::toggle_goal(&state.plan, &id)?;
        Ok((next, id))
    })?;
    let goal = state.plan.goals.iter().find(|g| g.id == id);
    info!(%id, completed = goal.is_some_and(|g| g.completed), "goal toggled");
    render(ctx.output, &goal, |g, w| match g {
        Some(g) if g.completed => writeln!(w, "Done: {}", g.title),
        Some(g) => writeln!(w, "Reopened: {}", g.title),
        None => Ok(()),
    })
}

fn run_rm(args: &IdArgs, ctx: &Context) -> Result<()> {
    let (_, removed) = ctx.update(|state| {
        let id = resolve_goal_id(&state.plan, &args.id)?;
        let title = state
            .plan
            .goals
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.title.clone())
            .unwrap_or_default();
        let mut next = state.clone();
        next.plan = mutate::remove_goal(&state.plan, &id)?;
        Ok((next, (id, title)))
    })?;
    info!(id = %removed.0, "goal removed");
    render_success(ctx.output, &format!("Removed goal {}: {}", removed.0, removed.1))
}
