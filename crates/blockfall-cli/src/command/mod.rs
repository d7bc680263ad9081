use clap::{ArgAction, Parser, Subcommand};

use crate::util;

use self::{auto_play::AutoPlayArg, show_config::ShowConfigArg};

mod auto_play;
mod show_config;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Let the planner play games and report the results as JSON
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Print the effective engine configuration as JSON
    ShowConfig(#[clap(flatten)] ShowConfigArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    util::init_logging(args.verbose)?;
    match args.mode {
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
        Mode::ShowConfig(arg) => show_config::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_auto_play() {
        let args = CommandArgs::try_parse_from([
            "blockfall",
            "-vv",
            "auto-play",
            "--games",
            "3",
            "--reward",
            "fitness",
            "--seed",
            "000102030405060708090a0b0c0d0e0f",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.mode, Mode::AutoPlay(_)));
    }

    #[test]
    fn test_rejects_bad_seed() {
        let result = CommandArgs::try_parse_from(["blockfall", "auto-play", "--seed", "xyz"]);
        assert!(result.is_err());
    }
}
