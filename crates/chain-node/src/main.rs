//! Chameleon-Ledger node binary.
//!
//! Wires together the workspace's library crates and exposes the operator
//! `keystore` CLI (spec §6) on top of `shared_crypto::keystore::KeyProvider`.
//! Everything else the node needs (the redaction engine, the ledger and
//! content store adapters) is consumed as a library by callers that embed
//! it; this binary's own surface is deliberately thin.

use clap::{Parser, Subcommand, ValueEnum};
use shared_crypto::keystore::{EnvKeyProvider, FileKeyProvider, KeyProvider};
use shared_crypto::CryptoError;
use shared_types::{CategorizedError, ErrorCategory};
use std::path::PathBuf;
use tracing::{info, Level};

/// Chameleon-Ledger node: redaction engine host and keystore operator CLI.
#[derive(Parser, Debug)]
#[command(
    name = "chain-node",
    about = "Chameleon-Ledger node binary: redaction engine host and keystore CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Operate the key provider backing content-store envelope encryption.
    Keystore {
        #[command(subcommand)]
        action: KeystoreAction,
    },
}

#[derive(Subcommand, Debug)]
enum KeystoreAction {
    /// List every known key id, active key first.
    List {
        #[command(flatten)]
        provider: ProviderArgs,
    },
    /// Rotate to a new key. The prior active key remains resolvable by kid.
    Rotate {
        #[command(flatten)]
        provider: ProviderArgs,
        /// Use this base64-encoded 32-byte key instead of generating one at random.
        #[arg(long)]
        new_key_base64: Option<String>,
        /// Print the new key's base64 material to stdout after rotating.
        #[arg(long)]
        print_exports: bool,
    },
    /// Print the active key id and the full key id list.
    Show {
        #[command(flatten)]
        provider: ProviderArgs,
    },
    /// Print a single key's base64 material, for operator-driven backup.
    Export {
        #[command(flatten)]
        provider: ProviderArgs,
        /// Key id to export.
        #[arg(long)]
        kid: String,
    },
}

#[derive(clap::Args, Debug)]
struct ProviderArgs {
    /// Key provider backend.
    #[arg(long, value_enum, default_value = "env")]
    provider: ProviderKind,
    /// File-backed keystore path (required when `--provider file`).
    #[arg(long)]
    keystore: Option<PathBuf>,
    /// File-backed keystore passphrase (required when `--provider file`).
    #[arg(long)]
    passphrase: Option<String>,
    /// Environment variable holding the base64 key material (env provider only).
    #[arg(long, default_value = "CHAMELEON_KEYSTORE_KEY")]
    env_var: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ProviderKind {
    File,
    Env,
}

enum AnyProvider {
    File(FileKeyProvider),
    Env(EnvKeyProvider),
}

impl ProviderArgs {
    fn build(&self) -> Result<AnyProvider, CryptoError> {
        match self.provider {
            ProviderKind::Env => Ok(AnyProvider::Env(EnvKeyProvider::from_env(&self.env_var))),
            ProviderKind::File => {
                let path = self.keystore.clone().ok_or_else(|| {
                    CryptoError::InvalidInput("--keystore PATH is required for --provider file".into())
                })?;
                let passphrase = self.passphrase.clone().ok_or_else(|| {
                    CryptoError::InvalidInput("--passphrase STR is required for --provider file".into())
                })?;
                Ok(AnyProvider::File(FileKeyProvider::new(path, passphrase)))
            }
        }
    }
}

impl KeyProvider for AnyProvider {
    fn active_key(&self) -> Result<([u8; 32], String), CryptoError> {
        match self {
            AnyProvider::File(p) => p.active_key(),
            AnyProvider::Env(p) => p.active_key(),
        }
    }

    fn rotate(&mut self, new_key: Option<[u8; 32]>) -> Result<([u8; 32], String), CryptoError> {
        match self {
            AnyProvider::File(p) => p.rotate(new_key),
            AnyProvider::Env(p) => p.rotate(new_key),
        }
    }

    fn resolve(&self, kid: &str) -> Option<[u8; 32]> {
        match self {
            AnyProvider::File(p) => p.resolve(kid),
            AnyProvider::Env(p) => p.resolve(kid),
        }
    }

    fn list_kids(&self) -> Vec<String> {
        match self {
            AnyProvider::File(p) => p.list_kids(),
            AnyProvider::Env(p) => p.list_kids(),
        }
    }
}

fn init_logging() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn decode_key_base64(s: &str) -> Result<[u8; 32], CryptoError> {
    use base64::Engine;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(s)
        .map_err(|e| CryptoError::InvalidInput(format!("malformed base64 key: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidKeyLength { expected: 32, actual: s.len() })
}

fn run(command: Command) -> Result<(), CryptoError> {
    match command {
        Command::Keystore { action } => match action {
            KeystoreAction::List { provider } => {
                let kp = provider.build()?;
                for kid in kp.list_kids() {
                    println!("{kid}");
                }
                Ok(())
            }
            KeystoreAction::Show { provider } => {
                let kp = provider.build()?;
                let (_, active_kid) = kp.active_key()?;
                println!("active: {active_kid}");
                for kid in kp.list_kids() {
                    let marker = if kid == active_kid { "*" } else { " " };
                    println!("{marker} {kid}");
                }
                Ok(())
            }
            KeystoreAction::Export { provider, kid } => {
                let kp = provider.build()?;
                let key = kp
                    .resolve(&kid)
                    .ok_or_else(|| CryptoError::KeyNotFound(kid.clone()))?;
                use base64::Engine;
                println!("{}", base64::engine::general_purpose::STANDARD.encode(key));
                Ok(())
            }
            KeystoreAction::Rotate { provider, new_key_base64, print_exports } => {
                let mut kp = provider.build()?;
                let new_key = new_key_base64.as_deref().map(decode_key_base64).transpose()?;
                let (key, kid) = kp.rotate(new_key)?;
                info!(kid = %kid, "rotated keystore");
                println!("new active kid: {kid}");
                if print_exports {
                    use base64::Engine;
                    println!("{}", base64::engine::general_purpose::STANDARD.encode(key));
                }
                Ok(())
            }
        },
    }
}

fn main() {
    if let Err(e) = init_logging() {
        eprintln!("failed to initialize logging: {e}");
        std::process::exit(ErrorCategory::Fatal.exit_code());
    }

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("error: {e}");
        std::process::exit(e.category().exit_code());
    }
}
