//! `yp finish`: close out setup.

use anyhow::Result;
use tracing::info;
use yearplan_core::mutate;

use super::Context;
use crate::output::render_success;

pub fn run_finish(ctx: &Context) -> Result<()> {
    let (state, already) = ctx.update(|state| {
        let already = state.onboarding_complete;
        Ok((mutate::complete_onboarding(state)?, already))
    })?;
    if !already {
        info!(year = state.plan.year, "setup complete");
    }
    render_success(
        ctx.output,
        &format!("Setup complete. The {} plan is live.", state.plan.year),
    )
}
