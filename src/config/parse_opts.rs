use super::{subcmd_run::Run, ClapSubCommand};
use crate::{error::*, state::AppState};
use clap::command;

pub async fn parse_opts() -> Result<Option<AppState>> {
  let _ = include_str!("../../Cargo.toml");

  let options = command!().subcommand_required(true).subcommand(Run::subcmd());

  let matches = options.get_matches();

  match matches.subcommand() {
    Some(("run", sub_m)) => Run::exec_matches(sub_m).await,
    Some((other, _)) => bail!("Unknown subcommand: {other}"),
    None => bail!("Subcommand must be specified"),
  }
}
