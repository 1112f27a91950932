//! `yp calendar`: month grids of the plan year.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use yearplan_core::calendar::{DayCell, MonthGrid, Paint, YearGrid};

use super::Context;
use crate::output::{pretty_rule, render_mode};

#[derive(Args, Debug, Default)]
pub struct CalendarArgs {
    /// Show only this month (1-12).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
struct CalendarOutput<'a> {
    year: i32,
    months: Vec<&'a MonthGrid>,
}

const WEEKDAY_HEADER: &str = " Mo  Tu  We  Th  Fr  Sa  Su";
const LEGEND: &str = "A anchor  M milestone  P protected  * today  (lowercase or . = past)";

/// One-character marker for a cell.
fn marker(cell: &DayCell) -> char {
    let mark = match cell.paint {
        Paint::Anchor => 'A',
        Paint::Milestone => 'M',
        Paint::Protected => 'P',
        Paint::Today => return '*',
        Paint::Default => ' ',
    };
    match (cell.crossed, mark) {
        (true, ' ') => '.',
        (true, m) => m.to_ascii_lowercase(),
        (false, m) => m,
    }
}

fn write_month(month: &MonthGrid, year: i32, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{} {year}", month.name)?;
    writeln!(w, "{WEEKDAY_HEADER}")?;
    for week in month.weeks() {
        let row: String = week
            .iter()
            .map(|cell| {
                cell.as_ref()
                    .map_or_else(|| "    ".to_string(), |c| format!("{:>3}{}", c.day, marker(c)))
            })
            .collect();
        writeln!(w, "{}", row.trim_end())?;
    }
    Ok(())
}

fn render_calendar_text(out: &CalendarOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    for (i, month) in out.months.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        write_month(month, out.year, w)?;
    }
    Ok(())
}

fn render_calendar_human(out: &CalendarOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    render_calendar_text(out, w)?;
    pretty_rule(w)?;
    writeln!(w, "{LEGEND}")
}

pub fn run_calendar(args: &CalendarArgs, ctx: &Context) -> Result<()> {
    let state = ctx.load()?;
    let grid = YearGrid::build(&state.plan, ctx.today);
    let months = match args.month {
        Some(m) => grid.month(m).into_iter().collect(),
        None => grid.months.iter().collect(),
    };
    let out = CalendarOutput {
        year: grid.year,
        months,
    };
    render_mode(ctx.output, &out, render_calendar_text, render_calendar_human)
}
