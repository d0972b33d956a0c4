mod parse_opts;
mod subcmd_run;

use crate::{error::Result, state::AppState};
use async_trait::async_trait;
pub use parse_opts::parse_opts;

#[async_trait]
trait ClapSubCommand {
  fn subcmd() -> clap::Command;

  async fn exec_matches(sub_m: &clap::ArgMatches) -> Result<Option<AppState>>;
}
