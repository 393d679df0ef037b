#![allow(clippy::struct_excessive_bools, clippy::struct_field_names)]
#![forbid(unsafe_code)]

use crate::config::MtrmeterAction;
use clap::Parser;
use config::Args;

mod app;
mod config;
mod print;
mod report;
#[cfg(test)]
mod util;

/// Run the mtrmeter application.
pub fn mtrmeter() -> anyhow::Result<()> {
    let args = Args::parse();
    match MtrmeterAction::from(args)? {
        MtrmeterAction::Mtrmeter(cfg) => app::run_mtrmeter(&cfg)?,
        MtrmeterAction::PrintConfigTemplate => print::print_config_template(),
        MtrmeterAction::PrintShellCompletions(shell) => print::print_shell_completions(shell)?,
        MtrmeterAction::PrintManPage => print::print_man_page()?,
    }
    Ok(())
}
