//! Admin-side service: uploads files into the shared bucket and registers
//! them in the catalog. Runs against the filesystem backend; S3/OpenDAL
//! deployments wire up [`AdminServer`] from their own binary.

use dropgate_fs::FileSystemStore;
use dropgate_server::auth::StaticTokenAuth;
use dropgate_server::{AdminServer, AdminServerConfig};

use clap::Parser;

#[derive(Parser)]
#[command(name = "dropgate-admin")]
#[command(about = "dropgate admin service")]
struct Args {
    #[arg(long, env = "DROPGATE_ADMIN_PORT", default_value = "8080")]
    port: u16,

    /// Root directory of the shared object store.
    #[arg(long, env = "DROPGATE_DATA_DIR", default_value = "./dropgate_data")]
    data_dir: String,

    /// Bearer token required on every admin request.
    #[arg(long, env = "DROPGATE_ADMIN_TOKEN")]
    admin_token: String,

    /// Identity recorded as `createdBy` on registered assets.
    #[arg(long, env = "DROPGATE_ADMIN_ID", default_value = "admin")]
    admin_id: String,

    /// Base URL of the public gate, for rendering shareable links.
    #[arg(
        long,
        env = "DROPGATE_PUBLIC_BASE_URL",
        default_value = "http://localhost:8081"
    )]
    public_base_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let storage = FileSystemStore::new(&args.data_dir);
    let auth = StaticTokenAuth::new(args.admin_token, args.admin_id);

    let app = AdminServer::new(AdminServerConfig {
        public_base_url: args.public_base_url,
    })
    .build(storage, auth);

    let addr = format!("0.0.0.0:{}", args.port);
    println!("Admin service listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
