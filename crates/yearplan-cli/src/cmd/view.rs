//! `yp view` and bare `yp`: the remembered default view.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tracing::debug;

use super::{Context, View, calendar, coach, goal, prep, status, week};
use crate::output::render;

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// View to make the default and show. Omit to print the current one.
    #[arg(value_enum)]
    pub view: Option<View>,
}

#[derive(Debug, Serialize)]
struct ViewOutput {
    view: View,
}

/// Show `view`.
pub fn show(view: View, ctx: &Context) -> Result<()> {
    debug!(view = view.as_str(), "showing view");
    match view {
        View::Status => status::run_status(ctx),
        View::Calendar => calendar::run_calendar(&calendar::CalendarArgs::default(), ctx),
        View::Prep => prep::run_prep_list(ctx),
        View::Goals => goal::run_goal_list(ctx),
        View::Weeks => week::run_week_list(ctx),
        View::Coach => coach::run_coach_view(ctx),
    }
}

fn current(ctx: &Context) -> Result<View> {
    Ok(View::from_stored(ctx.store.load_view()?.as_deref()))
}

pub fn run_stored_view(ctx: &Context) -> Result<()> {
    show(current(ctx)?, ctx)
}

pub fn run_view(args: &ViewArgs, ctx: &Context) -> Result<()> {
    match args.view {
        None => {
            let out = ViewOutput {
                view: current(ctx)?,
            };
            render(ctx.output, &out, |o, w| writeln!(w, "{}", o.view.as_str()))
        }
        Some(view) => {
            ctx.load()?;
            ctx.store.save_view(view.as_str())?;
            show(view, ctx)
        }
    }
}
