//! `yp theme`: show or set the year's theme.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tracing::info;
use yearplan_core::mutate;

use super::Context;
use crate::output::render;
use crate::validate::validate_title;

#[derive(Args, Debug)]
pub struct ThemeArgs {
    /// New theme. Omit to print the current one.
    pub theme: Option<String>,
}

#[derive(Debug, Serialize)]
struct ThemeOutput {
    year: i32,
    theme: String,
    changed: bool,
}

pub fn run_theme(args: &ThemeArgs, ctx: &Context) -> Result<()> {
    let out = match &args.theme {
        None => {
            let state = ctx.load()?;
            ThemeOutput {
                year: state.plan.year,
                theme: state.plan.theme,
                changed: false,
            }
        }
        Some(raw) => {
            let theme = validate_title(raw)?;
            let (state, ()) = ctx.update(|state| {
                let mut next = state.clone();
                next.plan = mutate::set_theme(&state.plan, &theme);
                Ok((next, ()))
            })?;
            info!(theme = %state.plan.theme, "theme updated");
            ThemeOutput {
                year: state.plan.year,
                theme: state.plan.theme,
                changed: true,
            }
        }
    };

    render(ctx.output, &out, |o, w| {
        if o.changed {
            writeln!(w, "Theme for {} is now \"{}\"", o.year, o.theme)
        } else {
            writeln!(w, "{}", o.theme)
        }
    })
}
