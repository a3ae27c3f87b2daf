#![forbid(unsafe_code)]

//! pskc CLI — inspect PSKC key container files and extract secrets.

use clap::{Parser, Subcommand};
use pskc::{Encryption, Error, Key, Mac, Pskc};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(
    name = "pskc",
    about = "pskc — Portable Symmetric Key Container (RFC 6030) tool",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show container and key metadata
    Info {
        /// Input PSKC XML file
        file: PathBuf,
    },

    /// Decrypt and print key secrets as hex
    Secret {
        /// Input PSKC XML file
        file: PathBuf,

        /// Derive the encryption key from this password
        #[arg(short, long)]
        password: Option<String>,

        /// Pre-shared encryption key (hex)
        #[arg(short, long)]
        key: Option<String>,

        /// Only the key at this index (default: all)
        #[arg(short, long)]
        index: Option<usize>,

        /// Skip ValueMAC verification
        #[arg(long = "no-verify")]
        no_verify: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Info { file } => cmd_info(file),

        Commands::Secret {
            file,
            password,
            key,
            index,
            no_verify,
        } => cmd_secret(file, password, key, index, no_verify),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn cmd_info(file: PathBuf) -> Result<(), Error> {
    let container = Pskc::from_file(&file)?;

    println!("Version: {}", container.version.as_deref().unwrap_or("-"));
    if let Some(id) = &container.id {
        println!("Id: {id}");
    }
    if let Some(name) = container.encryption.key_name() {
        println!("Encryption key name: {name}");
    }
    if let Some(algorithm) = &container.mac.algorithm {
        println!("MAC algorithm: {algorithm}");
    }
    println!("Keys: {}", container.keys.len());
    for (i, key) in container.keys.iter().enumerate() {
        println!("Key {i}:");
        print_key(key);
    }
    Ok(())
}

fn print_key(key: &Key) {
    if let Some(id) = &key.id {
        println!("  Id: {id}");
    }
    if let Some(algorithm) = &key.algorithm {
        println!("  Algorithm: {algorithm}");
    }
    if let Some(manufacturer) = &key.manufacturer {
        println!("  Manufacturer: {manufacturer}");
    }
    if let Some(serial) = &key.serial {
        println!("  Serial: {serial}");
    }
    if let Some(issuer) = &key.issuer {
        println!("  Issuer: {issuer}");
    }
    println!("  Secret: {}", if key.has_secret() { "yes" } else { "no" });
}

fn cmd_secret(
    file: PathBuf,
    password: Option<String>,
    key_hex: Option<String>,
    index: Option<usize>,
    no_verify: bool,
) -> Result<(), Error> {
    let mut container = Pskc::from_file(&file)?;

    if let Some(password) = password {
        container.encryption.derive_key(&password)?;
    } else if let Some(hex_str) = key_hex {
        let key = hex::decode(hex_str.trim())
            .map_err(|e| Error::Crypto(format!("invalid hex key: {e}")))?;
        container.encryption.set_key(key);
    }

    let mac = if no_verify { None } else { Some(&container.mac) };
    match index {
        Some(i) => {
            let key = container
                .keys
                .get(i)
                .ok_or_else(|| Error::MissingElement(format!("key index {i}")))?;
            print_secret(i, key, &container.encryption, mac)
        }
        None => {
            for (i, key) in container.keys.iter().enumerate() {
                print_secret(i, key, &container.encryption, mac)?;
            }
            Ok(())
        }
    }
}

fn print_secret(
    index: usize,
    key: &Key,
    encryption: &Encryption,
    mac: Option<&Mac>,
) -> Result<(), Error> {
    match key.secret(encryption, mac)? {
        Some(secret) => println!("{index}: {}", hex::encode(secret)),
        None => println!("{index}: (no secret)"),
    }
    Ok(())
}
