use crate::cli::CliContext;
use crate::core::admin;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct UninstallArgs {
    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

pub fn run(ctx: &CliContext, args: UninstallArgs) -> Result<()> {
    let mut store = ctx.open()?;
    let name = store.data().plugin.reserved_name.clone();
    if !ctx.confirm(
        "Remove all attribution tags and pending messages from this site?",
        args.yes,
    )? {
        println!("Aborted");
        return Ok(());
    }

    let report = admin::uninstall(&mut store)?;
    store.save()?;

    println!(
        "Removed {} attribution tag(s) and {} pending message(s).",
        report.tags_removed, report.flash_removed
    );
    println!(
        "{} application passwords were left in place; revoke them with `clawpress revoke` if no longer needed.",
        name
    );
    Ok(())
}
