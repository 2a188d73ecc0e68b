//! Server configuration, built once at start-up and never mutated.
//!
//! Reads configuration from environment variables:
//! - `NIFKI_WIKI_DIR`: page store root (default: "wiki")
//! - `NIFKI_INSTANCE_DIR`: directory holding `secret_key` (default: "instance")
//! - `NIFKI_HOST`: listen address (default: "127.0.0.1")
//! - `NIFKI_PORT`: listen port (default: "8080")
//! - `NIFKI_COMPILER`: compiler command line (default: "java -jar compiler.jar")
//! - `NIFKI_BUILD_TIMEOUT_SECS`: kill the compiler after this many seconds
//!   (default: no timeout). Only the compiler process itself is killed; if
//!   it is a wrapper script, the programs it started are left to finish on
//!   their own and their late output is dropped.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nifki_build::{BuildError, BuildOptions, DEFAULT_COMPILER};

/// Name of the key file inside the instance directory.
pub const SECRET_KEY_FILE: &str = "secret_key";

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The key file does not exist. The message says how to create it.
    #[error("Error: Failed to read secret key. Create it with:\n{instructions}")]
    MissingSecretKey { instructions: String },

    #[error("secret key '{path}' must hold at least 32 bytes", path = path.display())]
    ShortSecretKey { path: PathBuf },

    #[error("failed to read '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value for {name}: '{value}'")]
    InvalidVar { name: &'static str, value: String },

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Key for signing per-page form tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        SecretKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Reads the key file. Only the first 32 bytes are used.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::MissingSecretKey {
                    instructions: key_instructions(path),
                })
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let key: [u8; 32] = bytes
            .get(..32)
            .and_then(|head| head.try_into().ok())
            .ok_or_else(|| ConfigError::ShortSecretKey {
                path: path.to_path_buf(),
            })?;
        Ok(SecretKey(key))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

fn key_instructions(path: &Path) -> String {
    let mut msg = String::new();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.is_dir() {
            let dir = shell_quote(&dir.display().to_string());
            msg.push_str(&format!("mkdir -p {dir}\nchmod 0700 {dir}\n"));
        }
    }
    msg.push_str(&format!(
        "head -c 32 /dev/urandom > {}\n",
        shell_quote(&path.display().to_string())
    ));
    msg
}

fn shell_quote(word: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c);
    if !word.is_empty() && word.chars().all(safe) {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\"'\"'"))
    }
}

/// Everything the server needs, passed explicitly into [`crate::state::AppState`].
#[derive(Debug, Clone)]
pub struct Config {
    pub wiki_dir: PathBuf,
    /// `host:port` to listen on.
    pub bind_addr: String,
    pub build: BuildOptions,
    pub secret_key: SecretKey,
}

impl Config {
    /// Builds the configuration from `NIFKI_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let wiki_dir = PathBuf::from(env_or("NIFKI_WIKI_DIR", "wiki"));
        let instance_dir = PathBuf::from(env_or("NIFKI_INSTANCE_DIR", "instance"));
        let host = env_or("NIFKI_HOST", "127.0.0.1");
        let port = env_or("NIFKI_PORT", "8080");
        if port.parse::<u16>().is_err() {
            return Err(ConfigError::InvalidVar {
                name: "NIFKI_PORT",
                value: port,
            });
        }

        let timeout = match std::env::var("NIFKI_BUILD_TIMEOUT_SECS") {
            Ok(value) => match value.parse() {
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    return Err(ConfigError::InvalidVar {
                        name: "NIFKI_BUILD_TIMEOUT_SECS",
                        value,
                    });
                }
            },
            Err(_) => None,
        };
        let compiler = env_or("NIFKI_COMPILER", DEFAULT_COMPILER);
        let build = BuildOptions::from_command_line(&compiler)?.with_timeout(timeout);

        let secret_key = SecretKey::load(&instance_dir.join(SECRET_KEY_FILE))?;

        Ok(Config {
            wiki_dir,
            bind_addr: format!("{host}:{port}"),
            build,
            secret_key,
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
