use clap::{Parser, Subcommand};

use self::auto_play::AutoPlayArg;

mod auto_play;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play games headless with the placement heuristic
    #[command(name = "auto")]
    AutoPlay(#[clap(flatten)] AutoPlayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::AutoPlay(AutoPlayArg::default())) {
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
    }
    Ok(())
}
