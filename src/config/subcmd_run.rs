use super::ClapSubCommand;
use crate::{
  constants::*,
  entity::{Password, TryNewEntity},
  error::*,
  jwt::{JwtSettings, TokenCodec},
  log::*,
  role::RoleNameMap,
  state::{AppState, CryptoState, TableState},
  table::setup_sqlite,
};
use async_trait::async_trait;
use clap::{value_parser, Arg, ArgMatches, Command};
use std::{net::SocketAddr, time::Duration};

pub(super) struct Run {}

#[async_trait]
impl ClapSubCommand for Run {
  fn subcmd() -> Command {
    Command::new("run")
      .about("Start the token and role authorization server")
      .arg(
        Arg::new("listen_address")
          .short('l')
          .long("listen-address")
          .value_name("ADDRESS")
          .default_value(DEFAULT_ADDRESS)
          .help("Listen address"),
      )
      .arg(
        Arg::new("port")
          .short('p')
          .long("port")
          .value_name("PORT")
          .default_value(DEFAULT_PORT)
          .help("Listen port"),
      )
      .arg(
        Arg::new("token_issuer")
          .short('t')
          .long("token-issuer")
          .value_name("ISSUER")
          .default_value(DEFAULT_TOKEN_ISSUER)
          .help("Issuer written to and required in every token"),
      )
      .arg(
        Arg::new("customer_secret")
          .long("customer-secret")
          .env(CUSTOMER_SECRET_VAR)
          .hide_env_values(true)
          .value_name("SECRET")
          .required(true)
          .help("HMAC secret of customer access and refresh tokens"),
      )
      .arg(
        Arg::new("admin_secret")
          .long("admin-secret")
          .env(ADMIN_SECRET_VAR)
          .hide_env_values(true)
          .value_name("SECRET")
          .required(true)
          .help("HMAC secret of admin access and refresh tokens. Must differ from the customer secret"),
      )
      .arg(
        Arg::new("access_expires")
          .long("access-expires")
          .env(ACCESS_EXPIRES_VAR)
          .value_name("SECS")
          .default_value(DEFAULT_ACCESS_EXPIRES_SECS)
          .value_parser(value_parser!(u64).range(1..))
          .help("Lifetime of customer access tokens in seconds"),
      )
      .arg(
        Arg::new("refresh_expires")
          .long("refresh-expires")
          .env(REFRESH_EXPIRES_VAR)
          .value_name("SECS")
          .default_value(DEFAULT_REFRESH_EXPIRES_SECS)
          .value_parser(value_parser!(u64).range(1..))
          .help("Lifetime of refresh tokens in seconds, kept across rotations"),
      )
      .arg(
        Arg::new("db_file_path")
          .short('d')
          .long("db-file-path")
          .value_name("PATH")
          .default_value(DB_FILE_PATH)
          .help("SQLite database file path"),
      )
      .arg(
        Arg::new("store_timeout")
          .long("store-timeout")
          .value_name("SECS")
          .default_value(DEFAULT_STORE_TIMEOUT_SECS)
          .value_parser(value_parser!(u64).range(1..))
          .help("Upper bound of a single database operation in seconds"),
      )
      .arg(
        Arg::new("admin_password")
          .long("admin-password")
          .env(ADMIN_PASSWORD_VAR)
          .hide_env_values(true)
          .value_name("PASSWORD")
          .help("Password of the admin created on first start. Generated and printed if not given"),
      )
  }

  async fn exec_matches(sub_m: &ArgMatches) -> Result<Option<AppState>> {
    let Some(address) = sub_m.get_one::<String>("listen_address") else {
      bail!("Listen address must be specified");
    };
    let Some(port) = sub_m.get_one::<String>("port") else {
      bail!("Port must be specified");
    };
    let listen_socket = format!("{}:{}", address, port).parse::<SocketAddr>()?;

    let (Some(customer_secret), Some(admin_secret)) = (
      sub_m.get_one::<String>("customer_secret"),
      sub_m.get_one::<String>("admin_secret"),
    ) else {
      bail!("Both token secrets must be specified");
    };
    let Some(issuer) = sub_m.get_one::<String>("token_issuer") else {
      bail!("Issuer must be specified");
    };
    let (Some(access_lifetime_secs), Some(refresh_lifetime_secs)) = (
      sub_m.get_one::<u64>("access_expires"),
      sub_m.get_one::<u64>("refresh_expires"),
    ) else {
      bail!("Token lifetimes must be specified");
    };
    let codec = TokenCodec::new(&JwtSettings {
      issuer: issuer.to_string(),
      customer_secret: customer_secret.to_string(),
      admin_secret: admin_secret.to_string(),
      access_lifetime_secs: *access_lifetime_secs,
      refresh_lifetime_secs: *refresh_lifetime_secs,
    })?;

    let Some(db_file_path) = sub_m.get_one::<String>("db_file_path") else {
      bail!("Database path must be specified");
    };
    let Some(store_timeout) = sub_m.get_one::<u64>("store_timeout") else {
      bail!("Store timeout must be specified");
    };
    let admin_password = sub_m
      .get_one::<String>("admin_password")
      .map(|p| Password::new(p.as_str()))
      .transpose()?;

    let (user, session, role) = setup_sqlite(
      &format!("sqlite:{}", db_file_path),
      Duration::from_secs(*store_timeout),
      admin_password,
    )
    .await?;
    info!("Database ready at {db_file_path}");

    Ok(Some(AppState {
      listen_socket,
      crypto: CryptoState { codec },
      table: TableState { user, session, role },
      role_names: RoleNameMap::default(),
    }))
  }
}
