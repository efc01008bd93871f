// crates/shield-cli/src/main.rs
// ============================================================================
// Module: Shield CLI Entry Point
// Description: Command dispatcher for the Shield server, store, and licenses.
// Purpose: Run the management server and perform offline operator tasks.
// Dependencies: clap, shield-api, shield-config, shield-core, thiserror, tokio
// ============================================================================

//! ## Overview
//! The `shield` binary starts the management server, validates configuration,
//! provisions a `SQLite` configuration store, and issues or inspects signed
//! license artifacts. File inputs are untrusted and read with hard size
//! limits; key files are never overwritten.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use shield_api::ShieldServer;
use shield_config::ShieldConfig;
use shield_config::load_seed;
use shield_core::Clock;
use shield_core::ConfigurationSeed;
use shield_core::ConfigurationStore;
use shield_core::Ed25519LicenseDecoder;
use shield_core::LicenseDecoder;
use shield_core::LicenseEvaluator;
use shield_core::LicensePayload;
use shield_core::LicenseSigner;
use shield_core::LicenseSummary;
use shield_core::LicenseType;
use shield_core::NodeLimit;
use shield_core::SystemClock;
use shield_core::encode_key;
use shield_core::format_date;
use shield_core::parse_date;
use shield_core::parse_signing_key;
use shield_core::parse_verifying_key;
use shield_store_sqlite::SqliteConfigurationStore;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a key file.
const MAX_KEY_FILE_BYTES: usize = 4 * 1024;
/// Maximum size of a license artifact file.
const MAX_LICENSE_FILE_BYTES: usize = 64 * 1024;
/// File name of the generated signing key.
const SIGNING_KEY_FILE: &str = "license_signing.key";
/// File name of the generated verifying key.
const VERIFYING_KEY_FILE: &str = "license_verifying.key";
/// Random bytes in a generated license uid.
const UID_BYTES: usize = 8;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "shield", version, about = "Shield security configuration and license tooling")]
struct Cli {
    /// Selected subcommand.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command set.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the management API server.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Configuration store utilities.
    Store {
        /// Selected store subcommand.
        #[command(subcommand)]
        command: StoreCommand,
    },
    /// License key and artifact utilities.
    License {
        /// Selected license subcommand.
        #[command(subcommand)]
        command: LicenseCommand,
    },
}

/// Arguments for `serve`.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to shield.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a config file.
    Check(ConfigCheckCommand),
}

/// Arguments for `config check`.
#[derive(Args, Debug)]
struct ConfigCheckCommand {
    /// Optional config file path (defaults to shield.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Store subcommands.
#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Provision the configured `SQLite` store from the seed directory.
    Init(StoreInitCommand),
}

/// Arguments for `store init`.
#[derive(Args, Debug)]
struct StoreInitCommand {
    /// Optional config file path (defaults to shield.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// License subcommands.
#[derive(Subcommand, Debug)]
enum LicenseCommand {
    /// Generate an Ed25519 signing key pair.
    Keygen(LicenseKeygenCommand),
    /// Sign a license artifact.
    Sign(LicenseSignCommand),
    /// Decode and evaluate a license artifact.
    Inspect(LicenseInspectCommand),
}

/// Arguments for `license keygen`.
#[derive(Args, Debug)]
struct LicenseKeygenCommand {
    /// Output directory for the key files.
    #[arg(long, value_name = "DIR")]
    out: PathBuf,
}

/// Arguments for `license sign`.
#[derive(Args, Debug)]
struct LicenseSignCommand {
    /// Signing key file (raw 32 bytes or base64).
    #[arg(long, value_name = "PATH")]
    key: PathBuf,
    /// License type (for example FULL, TRIAL, SME).
    #[arg(long = "type", value_name = "TYPE")]
    license_type: String,
    /// First valid day (`yyyy-MM-dd`).
    #[arg(long, value_name = "DATE")]
    start: String,
    /// Last valid day (`yyyy-MM-dd`).
    #[arg(long, value_name = "DATE")]
    expiry: String,
    /// Allowed nodes per cluster; unlimited when omitted.
    #[arg(long, value_name = "N")]
    nodes: Option<u32>,
    /// Licensee.
    #[arg(long, value_name = "NAME")]
    issued_to: String,
    /// License identifier; random when omitted.
    #[arg(long, value_name = "UID")]
    uid: Option<String>,
    /// Issuer name.
    #[arg(long, value_name = "NAME", default_value = "shield")]
    issuer: String,
}

/// Arguments for `license inspect`.
#[derive(Args, Debug)]
struct LicenseInspectCommand {
    /// Verifying key file (raw 32 bytes or base64).
    #[arg(long, value_name = "PATH")]
    public_key: PathBuf,
    /// Node count used for evaluation.
    #[arg(long, value_name = "N", default_value_t = 1)]
    cluster_nodes: u32,
    /// License artifact file.
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing failures.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Error message.
    message: String,
}

impl CliError {
    /// Creates a new CLI error.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result type.
type CliResult<T> = Result<T, CliError>;

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

impl ReadLimitError {
    /// Renders the error for `label` at `path`.
    fn describe(&self, label: &str, path: &Path) -> String {
        match self {
            Self::Io(err) => format!("failed to read {label} {}: {err}", path.display()),
            Self::TooLarge {
                size,
                limit,
            } => format!(
                "{label} {} exceeds size limit ({size} > {limit} bytes)",
                path.display()
            ),
        }
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(command) => command_serve(&command).await,
        Commands::Config {
            command: ConfigCommand::Check(command),
        } => command_config_check(&command),
        Commands::Store {
            command: StoreCommand::Init(command),
        } => command_store_init(&command),
        Commands::License {
            command,
        } => match command {
            LicenseCommand::Keygen(command) => command_license_keygen(&command),
            LicenseCommand::Sign(command) => command_license_sign(&command),
            LicenseCommand::Inspect(command) => command_license_inspect(&command),
        },
    }
}

// ============================================================================
// SECTION: Server Commands
// ============================================================================

/// Loads config and runs the management server until it stops.
async fn command_serve(command: &ServeCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let bind = config.server.bind.clone();
    let server = tokio::task::spawn_blocking(move || ShieldServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("server init task failed: {err}")))?
        .map_err(|err| CliError::new(err.to_string()))?;
    write_stderr_line(&format!("shield: listening on {bind}"))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    server.serve().await.map_err(|err| CliError::new(err.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

/// Validates a config file and the collaborators derived from it.
fn command_config_check(command: &ConfigCheckCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    config.permission_map().map_err(|err| CliError::new(err.to_string()))?;
    config.license_decoder().map_err(|err| CliError::new(err.to_string()))?;
    config.cluster_state().map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(&format!(
        "config ok: {} principal(s), {} admin DN(s), store {}",
        config.principals.len(),
        config.admin_allowlist().len(),
        config.store.store_type.as_str()
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Provisions the configured `SQLite` store.
fn command_store_init(command: &StoreInitCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let sqlite = config
        .store
        .sqlite_config()
        .ok_or_else(|| CliError::new("store init requires a sqlite store".to_string()))?;
    let store = SqliteConfigurationStore::new(&sqlite)
        .map_err(|err| CliError::new(format!("failed to open store: {err}")))?;
    if store.is_initialized().map_err(|err| CliError::new(err.to_string()))? {
        return Err(CliError::new(format!(
            "store already initialized: {}",
            sqlite.path.display()
        )));
    }
    let seed = match config.store.seed_dir.as_deref() {
        Some(dir) => load_seed(dir).map_err(|err| CliError::new(err.to_string()))?,
        None => ConfigurationSeed::new(),
    };
    let seeded = seed.len();
    store.initialize(seed).map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(&format!(
        "store initialized: {} ({seeded} seeded document(s))",
        sqlite.path.display()
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads and validates configuration.
fn load_config(path: Option<&Path>) -> CliResult<ShieldConfig> {
    ShieldConfig::load(path).map_err(|err| CliError::new(err.to_string()))
}

// ============================================================================
// SECTION: License Commands
// ============================================================================

/// Generates a signing key pair under the output directory.
fn command_license_keygen(command: &LicenseKeygenCommand) -> CliResult<ExitCode> {
    let signing_path = command.out.join(SIGNING_KEY_FILE);
    let verifying_path = command.out.join(VERIFYING_KEY_FILE);
    for path in [&signing_path, &verifying_path] {
        if path.exists() {
            return Err(CliError::new(format!("refusing to overwrite {}", path.display())));
        }
    }
    fs::create_dir_all(&command.out).map_err(|err| {
        CliError::new(format!("failed to create {}: {err}", command.out.display()))
    })?;

    let mut seed = [0u8; 32];
    getrandom::getrandom(&mut seed)
        .map_err(|err| CliError::new(format!("failed to gather entropy: {err}")))?;
    let signing_key =
        parse_signing_key(&seed).map_err(|err| CliError::new(format!("signing key: {err}")))?;
    let signer = LicenseSigner::new(signing_key);

    write_new_file(&signing_path, &encode_key(&seed))?;
    write_new_file(&verifying_path, &encode_key(&signer.verifying_key().to_bytes()))?;
    write_stdout_line(&format!("signing key: {}", signing_path.display()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line(&format!("verifying key: {}", verifying_path.display()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Signs a license and prints the artifact.
fn command_license_sign(command: &LicenseSignCommand) -> CliResult<ExitCode> {
    let payload = sign_payload(command)?;
    let material = read_bytes_with_limit(&command.key, MAX_KEY_FILE_BYTES)
        .map_err(|err| CliError::new(err.describe("signing key", &command.key)))?;
    let signing_key = parse_signing_key(&material)
        .map_err(|err| CliError::new(format!("signing key: {err}")))?;
    let artifact = LicenseSigner::new(signing_key)
        .sign(&payload)
        .map_err(|err| CliError::new(format!("failed to sign license: {err}")))?;
    write_stdout_line(&artifact).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Builds the license payload from sign arguments.
fn sign_payload(command: &LicenseSignCommand) -> CliResult<LicensePayload> {
    let license_type = LicenseType::parse(&command.license_type).ok_or_else(|| {
        CliError::new(format!("unknown license type: {}", command.license_type))
    })?;
    let start = parse_date(&command.start)
        .map_err(|err| CliError::new(format!("invalid --start: {err}")))?;
    let expiry = parse_date(&command.expiry)
        .map_err(|err| CliError::new(format!("invalid --expiry: {err}")))?;
    if expiry < start {
        return Err(CliError::new(format!(
            "expiry {} is before start {}",
            format_date(expiry),
            format_date(start)
        )));
    }
    if command.issued_to.trim().is_empty() {
        return Err(CliError::new("--issued-to must not be empty".to_string()));
    }
    let uid = match &command.uid {
        Some(uid) => uid.clone(),
        None => random_uid()?,
    };
    Ok(LicensePayload {
        uid,
        license_type: license_type.as_str().to_string(),
        issued_to: command.issued_to.clone(),
        issuer: command.issuer.clone(),
        start_date: format_date(start),
        expiry_date: format_date(expiry),
        allowed_node_count_per_cluster: command
            .nodes
            .map_or(NodeLimit::Unlimited, NodeLimit::Limited),
    })
}

/// Decodes a license artifact and prints its evaluated summary.
fn command_license_inspect(command: &LicenseInspectCommand) -> CliResult<ExitCode> {
    let material = read_bytes_with_limit(&command.public_key, MAX_KEY_FILE_BYTES)
        .map_err(|err| CliError::new(err.describe("verifying key", &command.public_key)))?;
    let verifying_key = parse_verifying_key(&material)
        .map_err(|err| CliError::new(format!("verifying key: {err}")))?;
    let bytes = read_bytes_with_limit(&command.file, MAX_LICENSE_FILE_BYTES)
        .map_err(|err| CliError::new(err.describe("license", &command.file)))?;
    let artifact = std::str::from_utf8(bytes.trim_ascii())
        .map_err(|_| CliError::new("license file must be utf-8".to_string()))?;
    let license = Ed25519LicenseDecoder::new(verifying_key).decode(artifact).map_err(|err| {
        CliError::new(format!("License could not be decoded due to: {err}"))
    })?;
    let evaluation = LicenseEvaluator::evaluate(&license, command.cluster_nodes, SystemClock.today());
    let summary = LicenseSummary::new(&license, &evaluation);
    let rendered = serde_json::to_string_pretty(&summary)
        .map_err(|err| CliError::new(format!("failed to render license: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Generates a random hex license identifier.
fn random_uid() -> CliResult<String> {
    let mut bytes = [0u8; UID_BYTES];
    getrandom::getrandom(&mut bytes)
        .map_err(|err| CliError::new(format!("failed to gather entropy: {err}")))?;
    Ok(bytes.iter().map(|byte| format!("{byte:02x}")).collect())
}

// ============================================================================
// SECTION: File Helpers
// ============================================================================

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Writes `content` plus a newline to a file that must not exist yet.
fn write_new_file(path: &Path, content: &str) -> CliResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|err| CliError::new(format!("failed to create {}: {err}", path.display())))?;
    writeln!(&mut file, "{content}")
        .map_err(|err| CliError::new(format!("failed to write {}: {err}", path.display())))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
