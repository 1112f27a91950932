//! `yp protect`: toggle a protected day.

use anyhow::Result;
use clap::Args;
use tracing::info;
use yearplan_core::mutate;

use super::{Context, describe_day};
use crate::output::render_success;
use crate::validate::parse_day_arg;

#[derive(Args, Debug)]
pub struct ProtectArgs {
    /// Day to toggle: YYYY-MM-DD or a zero-based day offset.
    pub day: String,
}

pub fn run_protect(args: &ProtectArgs, ctx: &Context) -> Result<()> {
    let (state, (offset, protected)) = ctx.update(|state| {
        let offset = parse_day_arg(&args.day, state.plan.year)?;
        let (plan, protected) = mutate::toggle_protected(&state.plan, offset)?;
        let mut next = state.clone();
        next.plan = plan;
        Ok((next, (offset, protected)))
    })?;
    info!(offset, protected, "toggled protected day");

    let day = describe_day(state.plan.year, offset);
    let message = if protected {
        format!("Protected {day}")
    } else {
        format!("Released {day}")
    };
    render_success(ctx.output, &message)
}
