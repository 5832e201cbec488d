//! Public-facing gate: resolves shareable download locators against the
//! shared catalog and streams the bytes back. Shares nothing with the admin
//! service except the object store it points at.

use dropgate_fs::FileSystemStore;
use dropgate_server::GateServer;

use clap::Parser;

#[derive(Parser)]
#[command(name = "dropgate-gate")]
#[command(about = "dropgate public download gate")]
struct Args {
    #[arg(long, env = "DROPGATE_GATE_PORT", default_value = "8081")]
    port: u16,

    /// Root directory of the shared object store. Must point at the same
    /// storage as the admin service.
    #[arg(long, env = "DROPGATE_DATA_DIR", default_value = "./dropgate_data")]
    data_dir: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let storage = FileSystemStore::new(&args.data_dir);
    let app = GateServer.build(storage);

    let addr = format!("0.0.0.0:{}", args.port);
    println!("Gate listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
