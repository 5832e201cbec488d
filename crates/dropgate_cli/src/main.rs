use dropgate_client::DropgateClient;
use dropgate_core::catalog::DownloadLocator;
use dropgate_core::registrar::{PASSWORD_PUNCTUATION, validate_password};

use clap::{Parser, Subcommand};
use rand::Rng;
use rand::distr::Alphanumeric;
use rand::prelude::IndexedRandom;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dropgate")]
#[command(about = "Operator CLI for the dropgate file sharing services")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Admin service URL
    #[arg(long, default_value = "http://localhost:8080")]
    admin_url: String,

    /// Public gate URL
    #[arg(long, default_value = "http://localhost:8081")]
    gate_url: String,

    /// Admin bearer token
    #[arg(short, long, env = "DROPGATE_ADMIN_TOKEN")]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file and print its shareable download link
    Upload {
        path: PathBuf,

        /// Folder-like prefix for the object key (e.g. "quarterly")
        #[arg(long)]
        folder: Option<String>,

        /// Download password; must contain an uppercase letter, a digit and
        /// a special character
        #[arg(long)]
        password: String,
    },
    /// List registered assets
    List,
    /// List raw objects in the bucket
    Objects {
        #[arg(long, default_value = "")]
        prefix: String,
    },
    /// Revoke an asset: deletes its object and catalog entry
    Revoke {
        asset_id: String,
    },
    /// Download an asset through the public gate
    Download {
        asset_id: String,

        #[arg(long)]
        token: String,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Generate a random policy-compliant download password
    GeneratePassword,
}

fn generate_password() -> String {
    let mut rng = rand::rng();
    let mut password: String = (&mut rng)
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();

    // Top up the policy's required character classes.
    password.push(rng.random_range('A'..='Z'));
    password.push(rng.random_range('0'..='9'));
    let punctuation: Vec<char> = PASSWORD_PUNCTUATION.chars().collect();
    password.push(*punctuation.choose(&mut rng).unwrap());
    password
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = DropgateClient::new(
        cli.admin_url.clone(),
        cli.gate_url.clone(),
        cli.token.clone(),
    );

    match cli.command {
        Commands::Upload {
            path,
            folder,
            password,
        } => {
            if let Err(e) = validate_password(&password) {
                anyhow::bail!("{e} (try `dropgate generate-password`)");
            }

            let response = client
                .upload_file(&path, folder.as_deref(), &password)
                .await?;

            println!("✅ Registered '{}'", response.asset.file_name);
            println!("   asset id: {}", response.locator.asset_id);
            println!("\nShare this link (it contains the password!):");
            println!("\n  {}\n", response.download_url);
        }
        Commands::List => {
            let assets = client.list_assets().await?;
            if assets.is_empty() {
                println!("No assets registered.");
            }
            for asset in assets {
                println!(
                    "{}  {}  (key: {}, by {} at {})",
                    asset.asset_id,
                    asset.file_name,
                    asset.cos_object_key,
                    asset.created_by,
                    asset.created_at
                );
            }
        }
        Commands::Objects { prefix } => {
            for entry in client.list_objects(&prefix).await? {
                println!("{:>10}  {}", entry.size, entry.key);
            }
        }
        Commands::Revoke { asset_id } => {
            client.revoke(&asset_id).await?;
            println!("✅ Revoked {asset_id}");
        }
        Commands::Download {
            asset_id,
            token,
            output,
        } => {
            println!("Downloading {asset_id}...");

            let locator = DownloadLocator { asset_id, token };
            let data = client.download(&locator).await?;
            if let Some(parent) = output.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&output, data).await?;

            println!("✅ Saved to {output:?}");
        }
        Commands::GeneratePassword => {
            let password = generate_password();
            debug_assert!(validate_password(&password).is_ok());

            println!("🔑 Generated download password:");
            println!("\n    {}\n", password);
            println!("Pass it to `dropgate upload --password ...`.");
        }
    }

    Ok(())
}
