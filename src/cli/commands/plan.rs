//! plan command - Show which tarballs an import would process

use anyhow::Result;

use super::shared;
use crate::cli::args::PlanArgs;
use crate::engine::Context;
use crate::source::create_source;

/// Run the plan command.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn plan(ctx: &Context, args: &PlanArgs) -> Result<()> {
    let config = shared::load_config(ctx)?;
    let resolved = shared::resolve(ctx, &args.source, &config)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(plan_async(ctx, args, &resolved))
}

async fn plan_async(ctx: &Context, args: &PlanArgs, resolved: &shared::Resolved) -> Result<()> {
    let cutoff = if args.source.update {
        Some(shared::read_cutoff(&resolved.repo, &resolved.branch)?)
    } else {
        None
    };

    let source = create_source(&resolved.source)?;
    let plan =
        shared::list_and_plan(ctx, source.as_ref(), &resolved.target, cutoff.as_ref()).await?;

    shared::show_plan(ctx, &plan, args.source.json)
}
