//! `yp countdown`: days until the next milestone.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use yearplan_core::calendar::next_milestone_from;

use super::{Context, iso_day};
use crate::output::render;

#[derive(Debug, Serialize)]
struct CountdownOutput {
    /// 1-based slot.
    slot: usize,
    title: String,
    date: Option<String>,
    days_until: i64,
}

pub fn run_countdown(ctx: &Context) -> Result<()> {
    let state = ctx.load()?;
    let plan = &state.plan;
    let next = next_milestone_from(plan, ctx.today).map(|c| CountdownOutput {
        slot: c.slot + 1,
        title: c.title,
        date: iso_day(plan.year, c.first_day),
        days_until: c.days_until,
    });

    render(ctx.output, &next, |next, w| match next {
        None => writeln!(w, "No upcoming milestones. Schedule one with `yp milestone pick <DATE>`."),
        Some(n) => {
            let title = if n.title.is_empty() {
                format!("Milestone {}", n.slot)
            } else {
                n.title.clone()
            };
            let date = n.date.as_deref().unwrap_or("?");
            match n.days_until {
                0 => writeln!(w, "{title} is today ({date})"),
                1 => writeln!(w, "{title} is tomorrow ({date})"),
                days => writeln!(w, "{days} days until {title} ({date})"),
            }
        }
    })
}
