use crate::log::*;

pub async fn health_check() -> &'static str {
  debug!("health_check invoked");
  "Works at least as a server. Not checked if the store is reachable."
}
