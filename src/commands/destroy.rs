//! `destroy` - remove every tracked instance, dependents first

use anyhow::{Result, bail};
use declarative::Driver;

use super::Session;
use crate::Context;
use crate::cli::DestroyArgs;
use crate::engine::{self, Declared, PromptConfirm, RunOptions};
use crate::ui;

pub fn run(ctx: &Context, args: DestroyArgs) -> Result<()> {
    let mut session = Session::load(ctx)?;
    if session.state.is_empty() {
        ui::info("Nothing to destroy: no instances are tracked");
        return Ok(());
    }

    let declared = Declared::nothing();
    let planned = engine::build_plan(&session.provider, &declared, &session.state)?
        .targeted(args.target.as_deref());
    let opts = RunOptions {
        auto_approve: args.auto_approve,
        prompt: "Destroy all tracked instances?".to_string(),
        quiet: ctx.quiet,
        ..RunOptions::default()
    };

    let driver = Driver::new(&session.provider, &session.client);
    let report = engine::run(
        &driver,
        &planned,
        &declared,
        &mut session.state,
        &opts,
        &mut PromptConfirm,
    )?;
    if report.declined {
        return Ok(());
    }

    session.save(ctx)?;

    if !report.summary.is_success() {
        bail!("{} instances could not be destroyed", report.summary.failed);
    }
    Ok(())
}
