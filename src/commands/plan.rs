//! `plan` - show what apply would change without changing anything

use anyhow::Result;

use super::Session;
use crate::Context;
use crate::cli::PlanArgs;
use crate::engine::differ::display_plan;
use crate::ui;

pub fn run(ctx: &Context, args: PlanArgs) -> Result<()> {
    let mut session = Session::load(ctx)?;
    session.refresh(ctx)?;

    let (_, planned) = session.plan(args.target.as_deref())?;
    display_plan(&planned.plan);

    if !planned.plan.is_empty() && !ctx.quiet {
        println!();
        ui::dim("Run 'mockapi-provider apply' to make these changes.");
    }
    Ok(())
}
