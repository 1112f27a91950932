//! `yp prep`: the year-preparation checklist.

use std::io::Write;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::info;
use yearplan_core::model::PrepItem;
use yearplan_core::mutate;

use super::Context;
use crate::output::{pretty_rule, render, render_mode};

#[derive(Args, Debug)]
pub struct PrepArgs {
    #[command(subcommand)]
    command: PrepCommand,
}

#[derive(Subcommand, Debug)]
enum PrepCommand {
    /// Show the checklist
    List,
    /// Check or uncheck an item
    Toggle(ToggleArgs),
}

#[derive(Args, Debug)]
struct ToggleArgs {
    /// Item ID, as shown by `yp prep list`.
    id: String,
}

#[derive(Debug, Serialize)]
struct PrepList<'a> {
    done: usize,
    total: usize,
    items: &'a [PrepItem],
}

pub fn run_prep(args: &PrepArgs, ctx: &Context) -> Result<()> {
    match &args.command {
        PrepCommand::List => run_prep_list(ctx),
        PrepCommand::Toggle(toggle) => run_toggle(toggle, ctx),
    }
}

fn render_list_text(list: &PrepList<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    for item in list.items {
        let check = if item.completed { "x" } else { " " };
        writeln!(w, "[{check}] {}\t{}", item.id, item.task)?;
    }
    Ok(())
}

fn render_list_human(list: &PrepList<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "Prep checklist: {}/{} done", list.done, list.total)?;
    pretty_rule(w)?;
    for item in list.items {
        let check = if item.completed { "x" } else { " " };
        writeln!(w, "[{check}] {}  ({})", item.task, item.id)?;
        writeln!(w, "    {}", item.description)?;
    }
    Ok(())
}

pub fn run_prep_list(ctx: &Context) -> Result<()> {
    let state = ctx.load()?;
    let (done, total) = state.prep_progress();
    let list = PrepList {
        done,
        total,
        items: &state.prep,
    };
    render_mode(ctx.output, &list, render_list_text, render_list_human)
}

fn run_toggle(args: &ToggleArgs, ctx: &Context) -> Result<()> {
    let id = args.id.trim();
    let (state, ()) = ctx.update(|state| Ok((mutate::toggle_prep_item(state, id)?, ())))?;
    let item = state.prep.iter().find(|p| p.id == id);
    info!(id, completed = item.is_some_and(|p| p.completed), "prep item toggled");

    let (done, total) = state.prep_progress();
    render(ctx.output, &item, |item, w| match item {
        Some(p) => {
            let verb = if p.completed { "Checked" } else { "Unchecked" };
            writeln!(w, "{verb} \"{}\" ({done}/{total} done)", p.task)
        }
        None => Ok(()),
    })
}
