mod cli;

use clap::Parser;
use cli::Cli;
use endpoint_warden::host::HttpHost;
use endpoint_warden::{
    linkage, signals, warmup, watchdog, Error as WardenError, HostControlPlane, ProvisionRequest,
    Provisioner, SupervisionSession, WarmupOutcome,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if let Some(warden_error) = e.downcast_ref::<WardenError>() {
            eprintln!("Error: {}", warden_error);
            if let Some(suggestion) = warden_error.suggestion() {
                eprintln!("\nHint: {}", suggestion);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.debug)?;

    // Validate the argument shape before touching the host.
    if !cli.stop && cli.watch.is_none() && cli.port.is_none() {
        anyhow::bail!("--port is required unless --stop or --watch is given");
    }

    let host: Arc<dyn HostControlPlane> = Arc::new(HttpHost::new(&cli.host_api)?);

    if cli.stop {
        return run_stop(host, &cli.name).await;
    }

    if let Some(watched_pid) = cli.watch {
        return run_watch_mode(host, watched_pid, &cli.name, cli.debug).await;
    }

    run_supervise(host, cli).await
}

/// `--stop`: ensure the endpoint is absent from the live set. A stop
/// failure is logged but not fatal; the caller's intent was "ensure
/// stopped" and the exit proceeds normally.
async fn run_stop(host: Arc<dyn HostControlPlane>, name: &str) -> anyhow::Result<()> {
    let session = SupervisionSession::new(host, name);
    match session.stop().await {
        Ok(()) => println!("Endpoint '{}' stopped", name),
        Err(e) => eprintln!("Unable to stop endpoint '{}': {}", name, e),
    }
    Ok(())
}

/// `--watch <pid>`: the watcher side of a linkage request, running in its
/// own detached process. Output goes to stdout so the spawner can relay it.
async fn run_watch_mode(
    host: Arc<dyn HostControlPlane>,
    watched_pid: u32,
    name: &str,
    debug: bool,
) -> anyhow::Result<()> {
    let self_pid = std::process::id();
    if debug {
        println!(
            "{}: watching process {} for endpoint '{}'",
            self_pid, watched_pid, name
        );
    }

    let probe = linkage::HostProcessProbe;
    linkage::run_watcher(
        host,
        &probe,
        watched_pid,
        name,
        linkage::LIVENESS_POLL_INTERVAL,
    )
    .await?;

    if debug {
        println!("{}: endpoint '{}' torn down, exiting", self_pid, name);
    }
    Ok(())
}

/// Default mode: provision, optionally warm up, optionally link, then
/// supervise until the endpoint leaves the live set.
async fn run_supervise(host: Arc<dyn HostControlPlane>, cli: Cli) -> anyhow::Result<()> {
    let Some(port) = cli.port else {
        anyhow::bail!("--port is required unless --stop or --watch is given");
    };
    let root_path = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    // Register before the endpoint exists; a signal arriving early is a
    // no-op because the slot is still empty.
    let slot = signals::new_slot();
    signals::register_shutdown_handler(slot.clone());

    let request = ProvisionRequest {
        name: cli.name.clone(),
        runtime: cli.framework,
        identity: cli.identity,
        root_path,
        port,
    };
    Provisioner::new(host.clone()).provision(&request).await?;
    println!("Endpoint '{}' provisioned on port {}", cli.name, port);

    let session = SupervisionSession::new(host, cli.name.clone());
    *slot.write().await = Some(session.clone());

    if let Some(ref path) = cli.warmup {
        match warmup::warmup(port, path, warmup::DEFAULT_WARMUP_TIMEOUT).await {
            WarmupOutcome::Ready => {
                println!("Warmup succeeded");
            }
            WarmupOutcome::Failed { status, detail } => {
                eprintln!("Warmup failed: {}", detail);
                if let Err(e) = session.stop().await {
                    tracing::warn!("Failed to stop endpoint after warmup failure: {}", e);
                }
                return Err(WardenError::WarmupFailed { status, detail }.into());
            }
        }
    }

    if let Some(link_pid) = cli.link {
        // Fire and forget: the handle is dropped without waiting, the
        // watcher outlives us by design.
        let child = linkage::spawn_watcher(link_pid, &cli.name, &cli.host_api, cli.debug)?;
        println!(
            "Linkage watcher spawned (pid {}) for process {}",
            child.id().map(|p| p.to_string()).unwrap_or_default(),
            link_pid
        );
    }

    if cli.exit {
        return Ok(());
    }

    let departed = watchdog::watch(&session, watchdog::POLL_INTERVAL).await?;
    println!(
        "Endpoint '{}' stopped after leaving the live set ({})",
        cli.name, departed
    );
    Ok(())
}

fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
