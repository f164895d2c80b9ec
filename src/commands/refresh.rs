//! `refresh` - read tracked instances back and record what changed remotely

use anyhow::Result;

use super::Session;
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let mut session = Session::load(ctx)?;
    let before = session.state.len();

    session.refresh(ctx)?;
    session.save(ctx)?;

    let dropped = before - session.state.len();
    if dropped > 0 {
        ui::warn(&format!("{dropped} instances no longer exist and were dropped"));
    }
    if !ctx.quiet {
        ui::success(&format!(
            "Refreshed {} tracked instances",
            session.state.len()
        ));
    }
    Ok(())
}
