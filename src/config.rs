use crate::error::{BadEnvVarSnafu, GatewayResult, ParseNumberSnafu, UnknownStoreBackendSnafu};
use dotenvy::var;
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;
use std::{env::VarError, sync::Arc};

const DEFAULT_SERVER_IP: &str = "127.0.0.1:5000";
const DEFAULT_COLLECTION: &str = "students";
const DEFAULT_MAX_CONNECTIONS: u32 = 15;

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    server_ip: String,
    collection: String,
    store_backend: StoreBackend,
}

#[derive(Clone, Debug)]
pub enum StoreBackend {
    Postgres(Arc<DbConfig>),
    Memory,
}

impl RuntimeConfiguration {
    pub fn new() -> GatewayResult<Self> {
        let store_backend = match optional_env_var("ROLLCALL_STORE")?.as_deref() {
            None | Some("postgres") => StoreBackend::Postgres(Arc::new(DbConfig::new()?)),
            Some("memory") => StoreBackend::Memory,
            Some(found) => {
                return UnknownStoreBackendSnafu { found }.fail();
            }
        };

        Ok(Self {
            server_ip: optional_env_var("ROLLCALL_SERVER_IP")?
                .unwrap_or_else(|| DEFAULT_SERVER_IP.to_string()),
            collection: optional_env_var("ROLLCALL_COLLECTION")?
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            store_backend,
        })
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub const fn store_backend(&self) -> &StoreBackend {
        &self.store_backend
    }
}

#[derive(Debug)]
pub struct DbConfig {
    user: String,
    password: SecretString,
    path: String,
    port: u16,
    database: String,
    max_connections: u32,
}

impl DbConfig {
    pub fn new() -> GatewayResult<Self> {
        let get_env_var = |name| var(name).context(BadEnvVarSnafu { name });

        let max_connections = match optional_env_var("DB_MAX_CONNECTIONS")? {
            Some(raw) => raw.parse().context(ParseNumberSnafu {
                name: "DB_MAX_CONNECTIONS",
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            user: get_env_var("DB_USER")?,
            password: SecretString::from(get_env_var("DB_PASSWORD")?),
            path: get_env_var("DB_PATH")?,
            port: get_env_var("DB_PORT")?
                .parse()
                .context(ParseNumberSnafu { name: "DB_PORT" })?,
            database: get_env_var("DB_NAME")?,
            max_connections,
        })
    }

    pub const fn max_connections(&self) -> u32 {
        self.max_connections
    }

    pub fn get_db_path(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user,
            self.password.expose_secret(),
            self.path,
            self.port,
            self.database
        )
    }
}

/// `Ok(None)` when the variable is unset, an error for anything else that goes wrong reading it.
fn optional_env_var(name: &'static str) -> GatewayResult<Option<String>> {
    match var(name) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
        Err(source) => Err(source).context(BadEnvVarSnafu { name }),
    }
}
