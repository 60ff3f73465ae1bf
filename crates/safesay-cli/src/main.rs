use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use safesay_core::cipher::{normalize_line_endings, transform, Direction};
use safesay_core::paths::state_file_path;
use safesay_core::storage::{load_key_history, save_key_history};
use safesay_core::store::FileStore;
use safesay_core::tag;

#[derive(Parser)]
#[command(name = "safesay")]
#[command(about = "SafeSay text obfuscation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text and print the tagged payload
    Encrypt {
        /// Cipher key
        #[arg(short, long)]
        key: String,

        /// Print raw ciphertext without the wire tag
        #[arg(long)]
        raw: bool,

        text: String,
    },

    /// Decrypt text; accepts tagged or raw ciphertext
    Decrypt {
        /// Cipher key
        #[arg(short, long)]
        key: String,

        text: String,
    },

    /// Manage the persisted key history
    Keys {
        #[command(subcommand)]
        command: KeyCommands,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// List keys, most recently used first
    List,

    /// Remove a key from the history
    Remove { key: String },

    /// Clear the whole history
    Clear,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Encrypt { key, raw, text } => encrypt_command(&key, &text, raw),
        Commands::Decrypt { key, text } => decrypt_command(&key, &text),
        Commands::Keys { command } => keys_command(command),
    }
}

fn encrypt_command(key: &str, text: &str, raw: bool) -> Result<()> {
    if key.is_empty() {
        return Err(anyhow!("key must not be empty"));
    }
    let plain = normalize_line_endings(text);
    let cipher = transform(&plain, key, Direction::Encrypt);
    remember_key(key)?;
    if raw {
        println!("{cipher}");
    } else {
        println!("{}", tag::wrap(&cipher));
    }
    Ok(())
}

fn decrypt_command(key: &str, text: &str) -> Result<()> {
    if key.is_empty() {
        return Err(anyhow!("key must not be empty"));
    }
    let content = normalize_line_endings(text);
    // pasted payloads may still carry the wire tag
    let cipher = tag::strip(&content);
    let plain = transform(cipher, key, Direction::Decrypt);
    remember_key(key)?;
    println!("{plain}");
    Ok(())
}

fn keys_command(command: KeyCommands) -> Result<()> {
    let store = FileStore::load_or_create(state_file_path()?)?;
    let mut history = load_key_history(&store);
    match command {
        KeyCommands::List => {
            for key in history.iter() {
                println!("{key}");
            }
        }
        KeyCommands::Remove { key } => {
            if !history.remove(&key) {
                return Err(anyhow!("key not found in history"));
            }
            save_key_history(&store, &history)?;
        }
        KeyCommands::Clear => {
            save_key_history(&store, &safesay_core::history::KeyHistory::new())?;
        }
    }
    Ok(())
}

fn remember_key(key: &str) -> Result<()> {
    let store = FileStore::load_or_create(state_file_path()?)?;
    let mut history = load_key_history(&store);
    history.touch(key);
    save_key_history(&store, &history)
}
