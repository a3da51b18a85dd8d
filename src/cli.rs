use clap::Parser;
use endpoint_warden::{PoolIdentity, RuntimeVersion};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "warden")]
#[command(
    about = "Provisions and supervises a host control-plane endpoint for the lifetime of its controlling process"
)]
pub struct Cli {
    /// Name of the endpoint (and the pool it runs in)
    #[arg(short, long)]
    pub name: String,

    /// Port the endpoint binds to (required unless --stop or --watch)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Runtime version for the pool: v2.0 or v4.0
    #[arg(short, long, default_value = "v4.0")]
    pub framework: RuntimeVersion,

    /// Execution identity for the pool
    #[arg(short, long, default_value = "ApplicationPoolIdentity")]
    pub identity: PoolIdentity,

    /// URL path to warm the endpoint up with after start (without host and port)
    #[arg(short, long, value_name = "PATH")]
    pub warmup: Option<String>,

    /// Root path served by the endpoint (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Stop the endpoint and exit
    #[arg(short, long)]
    pub stop: bool,

    /// Exit after provisioning (and warmup) without supervising the endpoint
    #[arg(short = 'x', long)]
    pub exit: bool,

    /// Spawn a detached watcher that stops the endpoint when this process id terminates
    #[arg(long, value_name = "PID", conflicts_with_all = ["stop", "watch"])]
    pub link: Option<u32>,

    /// Internal: run as the linkage watcher for the given process id
    #[arg(long, value_name = "PID", conflicts_with = "stop")]
    pub watch: Option<u32>,

    /// Base URL of the host control-plane API
    #[arg(
        long,
        value_name = "URL",
        env = "WARDEN_HOST_API",
        default_value = "http://localhost:7071"
    )]
    pub host_api: String,

    /// Output debug messages
    #[arg(short, long)]
    pub debug: bool,
}
