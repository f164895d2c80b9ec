//! `apply` - make the service match the manifest

use anyhow::{Result, bail};
use declarative::Driver;

use super::Session;
use crate::Context;
use crate::cli::ApplyArgs;
use crate::engine::{self, PromptConfirm, RunOptions};

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let mut session = Session::load(ctx)?;
    session.refresh(ctx)?;

    let (declared, planned) = session.plan(args.target.as_deref())?;
    let opts = RunOptions {
        auto_approve: args.auto_approve,
        dry_run: args.dry_run,
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

    if args.dry_run || report.declined {
        return Ok(());
    }

    // Written even when some instances failed; the rest did change
    session.save(ctx)?;

    if !report.summary.is_success() {
        bail!("{} instances failed to apply", report.summary.failed);
    }
    Ok(())
}
