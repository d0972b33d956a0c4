mod apis;
mod config;
mod constants;
mod entity;
mod error;
mod jwt;
mod log;
mod middleware;
mod passport;
mod role;
mod state;
mod table;
#[cfg(test)]
mod test_utils;

use crate::{constants::*, error::*, log::*, state::AppState};
use config::parse_opts;
use std::sync::Arc;
use tokio::runtime::Builder;

fn main() -> Result<()> {
  init_logger();

  let mut runtime_builder = Builder::new_multi_thread();
  runtime_builder.enable_all();
  runtime_builder.thread_name(THREAD_NAME);
  let runtime = runtime_builder.build()?;

  runtime.block_on(async {
    match parse_opts().await {
      Ok(Some(shared_state)) => {
        if let Err(e) = serve(Arc::new(shared_state)).await {
          error!("Server is down!: {e}");
        }
      }
      Ok(None) => {
        warn!("Nothing to serve");
      }
      Err(e) => {
        error!("{e}");
      }
    };
  });

  Ok(())
}

async fn serve(shared_state: Arc<AppState>) -> Result<()> {
  let addr = shared_state.listen_socket;
  let tcp_listener = tokio::net::TcpListener::bind(&addr).await?;
  info!("Listening on {}", &addr);

  let router = apis::router(shared_state);
  axum::serve(tcp_listener, router).await?;
  Ok(())
}
