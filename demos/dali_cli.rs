//! CLI application for a simulated DALI bus.
//!
//! Builds a small in-memory bus with three ballasts and two groups, then
//! runs one command against it through the bridge.
//!
//! Run with: cargo run --example dali_cli -- --help

use std::sync::Arc;

use clap::{Parser, Subcommand};
use dali_lamps_rs::{Bridge, BridgeConfig, DeviceNames, MemoryBus, Publication};

#[derive(Parser)]
#[command(name = "dali-cli")]
#[command(about = "Drive simulated DALI lamps through the MQTT bridge", long_about = None)]
struct Cli {
    /// MQTT base topic
    #[arg(short, long, global = true, default_value = "dali2mqtt")]
    base_topic: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the bus and list every lamp and group
    Scan,

    /// Print the cached state of every lamp as JSON
    Status,

    /// Set the brightness of a lamp (0 turns it off)
    Brightness {
        /// Device name, e.g. "desk" or "office"
        device: String,
        /// Requested level, clamped to the lamp's limits
        level: i32,
    },

    /// Turn a lamp off
    Off {
        /// Device name
        device: String,
    },

    /// Print the Home Assistant discovery document of a lamp
    Discovery {
        /// Device name
        device: String,
    },
}

fn simulated_bus() -> MemoryBus {
    MemoryBus::new("MemoryBus")
        .with_ballast(0, 86, 254, 0)
        .with_ballast(1, 100, 254, 180)
        .with_ballast(2, 86, 230, 0)
        .with_group(0, &[0, 1])
        .with_group(1, &[1, 2])
}

fn simulated_names() -> DeviceNames {
    serde_json::from_str(r#"{"0": "Desk", "1": "Shelf", "2": "Window", "group_0": "Office"}"#)
        .unwrap_or_default()
}

fn print_publications(publications: &[Publication]) {
    for p in publications {
        let retain = if p.retain { " (retained)" } else { "" };
        println!("  {} <- {}{}", p.topic, p.payload, retain);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = BridgeConfig {
        base_topic: cli.base_topic,
        ..BridgeConfig::default()
    };
    let mut bridge = Bridge::new(Arc::new(simulated_bus()), config, simulated_names());
    let startup = bridge.initialize()?;

    match cli.command {
        Commands::Scan => {
            println!("Found {} lamp(s):", bridge.lamps().count());
            for lamp in bridge.lamps() {
                println!("  {}", lamp);
            }
            println!("\nStartup messages:");
            print_publications(&startup);
        }

        Commands::Status => {
            println!("{}", serde_json::to_string_pretty(&bridge.statuses())?);
        }

        Commands::Brightness { device, level } => {
            let topic = bridge.topics().brightness_command(&device);
            println!("Setting {} to {}...", device, level);
            let out = bridge.handle_message(&topic, &level.to_string())?;
            if out.is_empty() {
                println!("No change needed");
            } else {
                print_publications(&out);
            }
        }

        Commands::Off { device } => {
            let topic = bridge.topics().command(&device);
            println!("Turning {} OFF...", device);
            print_publications(&bridge.handle_message(&topic, "OFF")?);
        }

        Commands::Discovery { device } => {
            let lamp = bridge
                .lamp(&device)
                .ok_or_else(|| format!("unknown device {device}"))?;
            let config = dali_lamps_rs::DiscoveryConfig::generate(lamp, bridge.topics().base());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
