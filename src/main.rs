use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use evm_signer::tx::{recover_sender, TransactionFields, TransactionInput};
use evm_signer::utils::{decode_hex, logging};
use evm_signer::{
    KeyHolder, Operation, OperationSigner, Secp256k1Scheme, SignatureVerifier, SignerConfig, SignerError,
    StructuredDataSigner, TransactionRequest, TransactionSigner, TypedMessage,
};
use serde_json::json;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

/// Sign EIP-712 typed data and EVM transactions, verifying every signature
/// against the signer's own address.
#[derive(Parser, Debug)]
#[command(name = "evm-signer", author, version, about, long_about = None)]
struct Cli {
    /// Hex secp256k1 private key (`0x` optional)
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true, global = true)]
    private_key: Option<String>,

    /// Enable debug logging on stderr
    #[arg(
        long,
        env = "VERBOSE",
        global = true,
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the checksum address of the key
    Address,

    /// Sign a typed-data JSON document read from FILE or stdin
    SignTypedData {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Sign a transaction from a JSON descriptor or raw calldata
    SignTransaction(SignTransactionArgs),

    /// Sign a JSON array of service operations read from FILE or stdin
    SignOperations {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Recover the sender of a signed raw transaction
    RecoverTransaction {
        #[arg(value_name = "HEX")]
        raw: String,
    },
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("payload").required(true).args(["json", "raw"])))]
struct SignTransactionArgs {
    /// Chain id, e.g. `eip155-1` or `137`
    #[arg(long)]
    chain_id: String,

    /// Destination address
    #[arg(long)]
    to: String,

    /// Transaction descriptor as a JSON object
    #[arg(long)]
    json: Option<String>,

    /// Calldata as hex
    #[arg(long)]
    raw: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        logging::enable_debug();
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let report = match e.downcast_ref::<SignerError>() {
                Some(signer_error) => json!(signer_error.report()),
                None => json!({ "code": "io_error", "message": format!("{:#}", e) }),
            };
            eprintln!("{}", report);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Address => {
            let key = key_holder(&cli.private_key, cli.verbose)?;
            println!("{}", key.derive_address());
        }
        Command::SignTypedData { file } => {
            let key = key_holder(&cli.private_key, cli.verbose)?;
            let message = TypedMessage::from_json(&read_input(file.as_ref())?)?;
            let signed = StructuredDataSigner::new(&key).sign(&message)?;
            print_json(&json!({
                "digest": signed.digest_hex(),
                "signature": signed.to_hex(),
                "signer": signed.signer,
            }))?;
        }
        Command::SignTransaction(args) => {
            let key = key_holder(&cli.private_key, cli.verbose)?;
            let input = match (&args.json, &args.raw) {
                (Some(descriptor), _) => {
                    let value: serde_json::Value = serde_json::from_str(descriptor)
                        .map_err(|e| SignerError::invalid_field("transaction", e.to_string()))?;
                    TransactionInput::Structured(TransactionFields::from_json(&value)?)
                }
                (None, Some(raw)) => TransactionInput::raw_hex(raw)?,
                (None, None) => TransactionInput::RawPayload(Vec::new()),
            };

            let request = TransactionRequest::new(args.chain_id, args.to, input);
            let signed = TransactionSigner::new(&key).sign_request(&request)?;
            print_json(&json!({
                "raw": signed.to_hex(),
                "hash": signed.hash_hex(),
                "signer": signed.sender,
            }))?;
        }
        Command::SignOperations { file } => {
            let key = key_holder(&cli.private_key, cli.verbose)?;
            let operations: Vec<Operation> = serde_json::from_str(&read_input(file.as_ref())?)
                .map_err(|e| SignerError::malformed("operations", e.to_string()))?;
            let batch = OperationSigner::new(&key).sign_all(&operations);
            print_json(&batch)?;
        }
        Command::RecoverTransaction { raw } => {
            let bytes = decode_hex(&raw)
                .map_err(|e| SignerError::MalformedTransaction(format!("not hex: {}", e)))?;
            let sender = recover_sender(&bytes, &SignatureVerifier::<Secp256k1Scheme>::default())?;
            println!("{}", sender);
        }
    }
    Ok(())
}

fn key_holder(private_key: &Option<String>, verbose: bool) -> Result<KeyHolder> {
    let key = private_key.as_deref().unwrap_or_default();
    let config = SignerConfig::new(key, verbose)?;
    Ok(config.key_holder()?)
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading stdin")?;
            Ok(buffer)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
