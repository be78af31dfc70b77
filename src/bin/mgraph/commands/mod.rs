mod labels;
mod prepare;

use labels::run_labels;
use prepare::run_prepare;

use anyhow::Result;

use crate::cli::Command;
use crate::display::Context;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Lipophilicity(args) => run_prepare("lipophilicity", args, ctx),
        Command::Sider(args) => run_prepare("sider", args, ctx),
        Command::Prepare { dataset, args } => run_prepare(&dataset, args, ctx),
        Command::Labels {
            dataset,
            definitions,
        } => run_labels(&dataset, definitions.as_deref()),
    }
}
