//! mbrscan CLI - MBR partition discovery for disk images
//!
//! Scans an image for MBR partitions, binds the FAT and ext2 drivers, and dumps
//! partition-relative blocks.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mbrscan_core::{format_size, BlockDevice, Filesystem};
use mbrscan_pipeline::{DeviceConfig, ImageDevice};
use mbrscan_territories::standard_drivers;
use mbrscan_zones::{scan_partitions, DriverSet, ScanReport, ScanResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Largest dump accepted in one invocation
const MAX_DUMP_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "mbrscan")]
#[command(about = "Discover MBR partitions and the filesystems on them", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Block size of the image in bytes
    #[arg(long, default_value_t = 512, global = true)]
    block_size: u32,

    /// Read the image through a file stream instead of a memory map
    #[arg(long, global = true)]
    no_mmap: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// List the partitions of an image and the filesystems bound to them
    Scan {
        image: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Hex dump blocks of one partition
    Dump {
        image: PathBuf,

        /// Partition slot (0-3)
        slot: u8,

        /// First block, relative to the partition start
        block: u64,

        /// Number of blocks to dump
        #[arg(long, default_value_t = 1)]
        blocks: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = DeviceConfig {
        use_mmap: !cli.no_mmap,
        block_size: cli.block_size,
    };

    match cli.command {
        Command::Scan { image, json } => cmd_scan(&image, config, json),
        Command::Dump {
            image,
            slot,
            block,
            blocks,
        } => cmd_dump(&image, config, slot, block, blocks),
    }
}

/// `RUST_LOG` wins unless verbosity was raised on the command line
fn log_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn open_image(path: &Path, config: DeviceConfig) -> Result<Arc<ImageDevice>> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("disk");

    let device = ImageDevice::open(path, name, config)
        .with_context(|| format!("failed to open {}", path.display()))?;
    Ok(Arc::new(device))
}

fn scan_image(
    image: &Path,
    disk: Arc<ImageDevice>,
    drivers: &DriverSet,
    mounted: &mut Vec<Arc<dyn Filesystem>>,
) -> Result<ScanResult> {
    scan_partitions(disk, drivers, mounted)
        .with_context(|| format!("failed to scan {}", image.display()))
}

fn cmd_scan(image: &Path, config: DeviceConfig, json: bool) -> Result<()> {
    let disk = open_image(image, config)?;
    let size = disk.length();

    let mut mounted: Vec<Arc<dyn Filesystem>> = Vec::new();
    let result = scan_image(image, disk, &standard_drivers(), &mut mounted)?;
    let report = result.report();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("=== Partition Table ===");
    println!("Image:       {}", image.display());
    println!("Size:        {}", format_size(size));
    println!("Disk Sig:    0x{:08X}", report.disk_signature);
    println!("Partitions:  {}", report.count);
    println!("Mounted:     {}", mounted.len());
    println!();

    print_partitions(&report);
    Ok(())
}

fn print_partitions(report: &ScanReport) {
    if report.partitions.is_empty() {
        println!("No partitions found.");
        return;
    }

    println!(
        "{:<5} {:<10} {:<12} {:<12} {:<24} {:<10}",
        "Slot", "Device", "Start", "Size", "Type", "Filesystem"
    );
    println!("{}", "-".repeat(78));

    for p in &report.partitions {
        let bytes = p.block_count as u64 * p.block_size as u64;
        println!(
            "{:<5} {:<10} {:<12} {:<12} {:<24} {:<10}",
            p.slot,
            p.name,
            p.start_block,
            format_size(bytes),
            format!("{} (0x{:02X})", p.type_name, p.type_code),
            p.filesystem.as_deref().unwrap_or("-")
        );
        if let Some(volume) = &p.volume {
            println!("{:<5} {}", "", volume);
        }
    }
}

fn cmd_dump(image: &Path, config: DeviceConfig, slot: u8, block: u64, blocks: u64) -> Result<()> {
    let disk = open_image(image, config)?;

    let mut mounted: Vec<Arc<dyn Filesystem>> = Vec::new();
    let result = scan_image(image, disk, &DriverSet::new(), &mut mounted)?;

    let partition = match result.slot(slot) {
        Some(p) => p.device().clone(),
        None => bail!("slot {} of {} is empty", slot, result.parent_name()),
    };

    let block_size = partition.block_size() as u64;
    let len = blocks
        .checked_mul(block_size)
        .filter(|&len| len <= MAX_DUMP_BYTES)
        .with_context(|| format!("cannot dump {} blocks at once", blocks))?;

    let mut buf = vec![0u8; len as usize];
    let n = partition.read(&mut buf, block)?;
    if n < buf.len() {
        tracing::warn!("{}: only {} of {} bytes available", partition.device_name(), n, len);
    }

    println!(
        "=== {} block {} ({} bytes) ===",
        partition.device_name(),
        block,
        n
    );
    let base = block * block_size;
    for line in hexdump(&buf[..n], base) {
        println!("{}", line);
    }
    Ok(())
}

fn hexdump(bytes: &[u8], base: u64) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
            let ascii: String = chunk
                .iter()
                .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                .collect();
            format!("{:08x}  {:<47}  |{}|", base + row as u64 * 16, hex.join(" "), ascii)
        })
        .collect()
}
