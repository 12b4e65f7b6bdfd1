use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use hostwatch::config::Config;
use hostwatch::monitoring::{FileStore, ProbeKind, Registry, Scheduler, prober};
use hostwatch::tui::input::{InputGate, spawn_stdin_reader};
use hostwatch::tui::view::{TerminalView, ViewHeader};

/// Watch a list of hosts from the terminal and add new ones as you go
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/hostwatch/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host list file, one name per line
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Seconds between probes of the same host
    #[arg(short, long)]
    interval: Option<u64>,

    /// Reachability check to use
    #[arg(short, long, value_enum)]
    probe: Option<ProbeKind>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(store) = &self.store {
            config.store_path = store.clone();
        }
        if let Some(interval) = self.interval {
            config.check_interval_secs = interval;
        }
        if let Some(kind) = self.probe {
            config.probe.kind = kind;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_config(cli.config.as_ref()).context("Failed to load config")?;
    cli.apply(&mut config);
    config.validate().context("Invalid command line options")?;

    if cli.print_config {
        print!("{}", config);
        return Ok(());
    }

    logger::init_tracing(Some(config.log_file.as_path()));
    info!(store = %config.store_path.display(), probe = %config.probe.kind, "Starting host monitor");

    let mut registry = Registry::load(FileStore::new(&config.store_path), config.check_interval());
    if registry.seed_defaults(&config.default_targets) {
        info!(count = registry.len(), "Seeded default targets");
        if let Err(e) = registry.save_all() {
            error!("Default targets not persisted: {}", e);
        }
    }

    let prober = prober::from_kind(config.probe.kind, config.probe.timeout_secs, config.probe.tcp_port);
    let view = TerminalView::stdout(ViewHeader {
        check_interval: config.check_interval(),
        store_path: config.store_path.clone(),
    });
    let input = spawn_stdin_reader().context("Failed to start input reader")?;
    let gate = InputGate::new(input, config.input_window());

    let mut scheduler = Scheduler::new(registry, prober, view, gate);

    tokio::select! {
        _ = scheduler.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            println!();
            info!("Shutdown signal received. Stopping host monitor...");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config_file() {
        let cli = Cli::parse_from([
            "hostwatch", "--store", "/tmp/hosts.txt", "--interval", "30", "--probe", "tcp",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.store_path, PathBuf::from("/tmp/hosts.txt"));
        assert_eq!(config.check_interval_secs, 30);
        assert_eq!(config.probe.kind, ProbeKind::Tcp);
        assert_eq!(config.probe.timeout_secs, 2);
    }

    #[test]
    fn test_no_flags_keep_config_file_values() {
        let cli = Cli::parse_from(["hostwatch"]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config, Config::default());
        assert!(!cli.print_config);
    }
}
