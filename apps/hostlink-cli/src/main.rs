use anyhow::Context;
use clap::{Parser, Subcommand};
use hostlink_netcode::{LoopbackLink, SimulationSchedule};
use hostlink_relay::{LocalRelay, normalize_join_code};
use hostlink_session::{GameBootstrap, PlayType, SessionConfig, SessionEvent};
use hostlink_tools::WorldInspector;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hostlink-cli", about = "Host or join a multiplayer session")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Session config file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured play type (client, server, client-and-server)
    #[arg(long, global = true)]
    play_type: Option<PlayType>,

    /// Ticks to simulate after the session is set up
    #[arg(long, default_value = "4", global = true)]
    ticks: u32,

    /// Print every entity of each world after the simulation
    #[arg(long, global = true)]
    entities: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, crate info and the effective config
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Host through the relay and print the join code
    HostRelay {
        #[arg(short, long)]
        max_connections: Option<u32>,
        /// After hosting, join the printed code from a second session in
        /// this process
        #[arg(long)]
        join_self: bool,
    },
    /// Join a relay session by join code
    ///
    /// The CLI runs an in-process relay, so only codes from the same
    /// invocation exist; see `host-relay --join-self`.
    JoinRelay { code: String },
    /// Host over direct UDP
    HostDirect {
        #[arg(short, long)]
        address: Option<String>,
        /// Clamped to 1..=65535
        #[arg(short, long)]
        port: Option<u32>,
    },
    /// Join a direct UDP session
    JoinDirect {
        ip: String,
        /// Clamped to 1..=65535
        #[arg(short, long)]
        port: Option<u32>,
    },
}

fn clamp_port(port: u32) -> u16 {
    port.clamp(1, u16::MAX as u32) as u16
}

fn load_config(cli: &Cli) -> anyhow::Result<SessionConfig> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(play_type) = cli.play_type {
        config.play_type = play_type;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(&cli)?;

    let mut boot = GameBootstrap::new(LocalRelay::default(), config);
    let mut events = boot.subscribe();

    match &cli.command {
        Commands::Info { json } => {
            print_info(boot.config(), *json)?;
            return Ok(());
        }
        Commands::HostRelay {
            max_connections,
            join_self,
        } => {
            let max = max_connections.unwrap_or(boot.config().max_connections);
            let code = boot.start_host_relay(max).await?;
            if *join_self {
                let mut guest =
                    GameBootstrap::new(boot.services().clone(), boot.config().clone());
                guest.join_relay(&code).await?;
                println!("Guest joined with {code}");
                for entry in WorldInspector::registry_report(guest.registry()) {
                    println!("  guest {entry}");
                }
            }
        }
        Commands::JoinRelay { code } => {
            let code = normalize_join_code(code).context("join code")?;
            boot.join_relay(&code).await?;
        }
        Commands::HostDirect { address, port } => {
            let address = address
                .clone()
                .unwrap_or_else(|| boot.config().listen_address.clone());
            let port = clamp_port(port.unwrap_or(boot.config().port as u32));
            boot.start_host_direct(&address, port)?;
        }
        Commands::JoinDirect { ip, port } => {
            if ip.trim().is_empty() {
                anyhow::bail!("IP address must not be empty");
            }
            let port = clamp_port(port.unwrap_or(boot.config().port as u32));
            boot.join_direct(ip, port)?;
        }
    }

    print_events(&mut events);
    simulate(&mut boot, cli.ticks);
    if cli.entities {
        print_entities(&boot);
    }
    Ok(())
}

fn print_events(events: &mut broadcast::Receiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::JoinCodeGenerated(code) => println!("Join code: {code}"),
            SessionEvent::ConnectionComplete(flow) => println!("Connection complete: {flow}"),
        }
    }
}

fn simulate(boot: &mut GameBootstrap<LocalRelay>, ticks: u32) {
    let mut link = LoopbackLink::new();
    let mut schedule = SimulationSchedule::netcode();
    for _ in 0..ticks {
        if let Some(report) = boot.registry_mut().tick(&mut link, &mut schedule) {
            tracing::debug!(
                accepted = report.accepted,
                forwarded = report.forwarded_rpcs,
                "link pumped"
            );
        }
    }

    println!("Worlds after {ticks} ticks:");
    for entry in WorldInspector::registry_report(boot.registry()) {
        println!("  {entry}");
    }
    if let (Some(server), Some(client)) = (
        boot.registry().server_world(),
        boot.registry().client_world(),
    ) {
        let s = WorldInspector::summary(server);
        let c = WorldInspector::summary(client);
        let status = if s.in_game > 0 && c.in_game > 0 {
            "OK"
        } else {
            "PENDING"
        };
        println!("In game: server={} client={} {status}", s.in_game, c.in_game);
    }
}

fn print_entities(boot: &GameBootstrap<LocalRelay>) {
    for (id, world) in boot.registry().iter() {
        println!("{id} {}:", world.name());
        for entity in WorldInspector::list_entities(world) {
            if let Some(info) = WorldInspector::inspect_entity(world, entity) {
                println!("  {info}");
            }
        }
    }
}

fn print_info(config: &SessionConfig, json: bool) -> anyhow::Result<()> {
    let crates = [
        hostlink_common::crate_info(),
        hostlink_ecs::crate_info(),
        hostlink_kernel::crate_info(),
        hostlink_relay::crate_info(),
        hostlink_transport::crate_info(),
        hostlink_netcode::crate_info(),
        hostlink_session::crate_info(),
        hostlink_tools::crate_info(),
    ];
    if json {
        let value = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "crates": crates,
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    println!("hostlink-cli v{}", env!("CARGO_PKG_VERSION"));
    for info in crates {
        println!("  {info}");
    }
    print!("{}", config.to_yaml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_are_clamped() {
        assert_eq!(clamp_port(0), 1);
        assert_eq!(clamp_port(7777), 7777);
        assert_eq!(clamp_port(70_000), 65535);
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["hostlink-cli", "join-direct", "10.0.0.2", "--port", "9000"])
            .unwrap();
        match cli.command {
            Commands::JoinDirect { ip, port } => {
                assert_eq!(ip, "10.0.0.2");
                assert_eq!(port, Some(9000));
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn host_relay_flags() {
        let cli = Cli::try_parse_from([
            "hostlink-cli",
            "--entities",
            "host-relay",
            "--max-connections",
            "2",
            "--join-self",
        ])
        .unwrap();
        assert!(cli.entities);
        match cli.command {
            Commands::HostRelay {
                max_connections,
                join_self,
            } => {
                assert_eq!(max_connections, Some(2));
                assert!(join_self);
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn play_type_override() {
        let cli =
            Cli::try_parse_from(["hostlink-cli", "--play-type", "client", "info"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.play_type, PlayType::Client);
    }
}
