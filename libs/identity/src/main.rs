//! board-identity CLI - generate a board signing identity and sign with it
//!
//! Key material lives only in process memory, so every invocation generates
//! a fresh identity before exporting or signing.

use board_identity::{IdentityCell, IdentityConfig, PublicKey, verify};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "board-identity")]
#[command(about = "Board-bound RSA signing identity", long_about = None)]
#[command(version)]
struct Cli {
    /// Identity configuration file (JSON)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an identity and print its public key
    Show,
    /// Generate an identity and sign a message
    Sign {
        /// Message to sign
        message: String,
    },
    /// Check a signature against a public key
    Verify {
        /// Public exponent (hex)
        #[arg(short = 'e', long)]
        exponent: String,

        /// Modulus (hex)
        #[arg(short = 'n', long)]
        modulus: String,

        /// Signature (hex)
        #[arg(short = 's', long)]
        signature: String,

        /// Message that was signed
        message: String,
    },
    /// Generate, sign, verify, regenerate and confirm the old signature is rejected
    Selftest,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn bootstrap(cell: &IdentityCell, config: &IdentityConfig) -> Result<(), String> {
    cell.generate(config).map_err(|e| {
        if e.is_bootstrap_fatal() {
            format!("Identity bootstrap failed, refusing to continue: {e}")
        } else {
            e.to_string()
        }
    })
}

fn print_public_key(public: &PublicKey) {
    println!("Exponent: {}", public.exponent_hex());
    println!("Modulus:  {}", public.modulus_hex());
}

fn show(cell: &IdentityCell, config: &IdentityConfig) -> Result<(), String> {
    bootstrap(cell, config)?;
    let public = cell.export_public_key().map_err(|e| e.to_string())?;
    print_public_key(&public);
    Ok(())
}

fn sign(cell: &IdentityCell, config: &IdentityConfig, message: &str) -> Result<(), String> {
    bootstrap(cell, config)?;
    let public = cell.export_public_key().map_err(|e| e.to_string())?;
    let signature = cell
        .sign(message.as_bytes())
        .map_err(|e| format!("Message not signed: {e}"))?;

    print_public_key(&public);
    println!("Signature: {signature}");
    Ok(())
}

fn verify_signature(
    exponent: &str,
    modulus: &str,
    signature: &str,
    message: &str,
) -> Result<(), String> {
    let public = PublicKey::from_hex(exponent, modulus).map_err(|e| e.to_string())?;
    let valid = verify(&public, message.as_bytes(), signature).map_err(|e| e.to_string())?;

    if valid {
        println!("✓ Signature valid");
        Ok(())
    } else {
        Err("Signature does not verify".to_string())
    }
}

/// End-to-end check of the whole scheme on this machine
fn selftest(cell: &IdentityCell, config: &IdentityConfig) -> Result<(), String> {
    const MESSAGE: &[u8] = b"ping";

    bootstrap(cell, config)?;
    let first = cell.export_public_key().map_err(|e| e.to_string())?;
    println!("✓ Generated {}-bit identity", config.modulus_bits);

    let signature = cell.sign(MESSAGE).map_err(|e| e.to_string())?;
    if !verify(&first, MESSAGE, signature.as_str()).map_err(|e| e.to_string())? {
        return Err("Fresh signature does not verify".to_string());
    }
    println!("✓ Signature verifies under exported key");

    bootstrap(cell, config)?;
    let second = cell.export_public_key().map_err(|e| e.to_string())?;
    if verify(&second, MESSAGE, signature.as_str()).map_err(|e| e.to_string())? {
        return Err("Stale signature verified under regenerated key".to_string());
    }
    println!("✓ Stale signature rejected after regeneration");

    Ok(())
}

fn run(cli: Cli) -> Result<(), String> {
    let config = IdentityConfig::load(cli.config.as_deref()).map_err(|e| e.to_string())?;
    let cell = IdentityCell::new();

    match cli.command {
        Commands::Show => show(&cell, &config),
        Commands::Sign { message } => sign(&cell, &config, &message),
        Commands::Verify {
            exponent,
            modulus,
            signature,
            message,
        } => verify_signature(&exponent, &modulus, &signature, &message),
        Commands::Selftest => selftest(&cell, &config),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

