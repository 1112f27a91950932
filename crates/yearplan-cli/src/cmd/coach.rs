//! `yp coach`: advice about the plan from the text generator.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use yearplan_core::suggest::FALLBACK_ADVICE;

use super::Context;
use crate::output::render;
use crate::validate::validate_text;

#[derive(Args, Debug)]
pub struct CoachArgs {
    /// Your question.
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CoachOutput {
    query: String,
    advice: String,
    fallback: bool,
}

pub fn run_coach(args: &CoachArgs, ctx: &Context) -> Result<()> {
    let query = validate_text("query", &args.query.join(" "))?;
    let state = ctx.load()?;
    let advice = ctx
        .suggestion_client()
        .coach(&state.plan, &state.weekly_wins, &query);
    let out = CoachOutput {
        fallback: advice == FALLBACK_ADVICE,
        query,
        advice,
    };
    render(ctx.output, &out, |o, w| writeln!(w, "{}", o.advice))
}

#[derive(Debug, Serialize)]
struct CoachView {
    latest_score: Option<u8>,
    reviews: usize,
}

/// The coach as a default view: there is no question yet, so explain how
/// to ask one.
pub fn run_coach_view(ctx: &Context) -> Result<()> {
    let state = ctx.load()?;
    let view = CoachView {
        latest_score: state.latest_score(),
        reviews: state.weekly_wins.len(),
    };
    render(ctx.output, &view, |v, w| {
        match v.latest_score {
            Some(s) => writeln!(w, "Last week scored {s}/10.")?,
            None => writeln!(w, "No weekly reviews yet.")?,
        }
        writeln!(w, "Ask the coach with `yp coach <question>`.")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: CoachArgs,
    }

    #[test]
    fn query_words_are_collected() {
        let w = Wrapper::parse_from(["test", "how", "do", "I", "rest?"]);
        assert_eq!(w.args.query.join(" "), "how do I rest?");
    }

    #[test]
    fn query_is_required() {
        assert!(Wrapper::try_parse_from(["test"]).is_err());
    }
}
