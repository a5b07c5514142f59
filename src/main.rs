//! surfacekit command line tool
//!
//! Scans a work surface and contours G-code against the measured heights.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use surfacekit::{
    contour_file, init_logging, list_ports, obtain_height_map, scan_and_cache, Config,
    ConfirmationGate, Error, HeightMap, HeightMapSource, LogProgress, BUILD_DATE, VERSION,
};

#[derive(Parser)]
#[command(name = "surfacekit", version)]
#[command(about = "Surface height mapping and G-code contouring for CNC machines", long_about = None)]
struct Cli {
    /// Config file (.toml or .json); defaults to the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List serial ports that may host the controller or switch
    Ports,
    /// Scan the work surface and cache the height map
    Scan {
        #[command(flatten)]
        connection: ConnectionArgs,
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Contour a G-code file against a cached height map
    Contour {
        /// Height map file, as a path or a name inside the cache directory
        #[arg(long = "load-height-map-file")]
        height_map: PathBuf,
        #[command(flatten)]
        contour: ContourArgs,
    },
    /// Scan (or load a height map), then contour a G-code file
    Run {
        #[command(flatten)]
        connection: ConnectionArgs,
        #[command(flatten)]
        scan: ScanArgs,
        #[command(flatten)]
        contour: ContourArgs,
        /// Skip scanning and load this height map instead
        #[arg(long = "load-height-map-file")]
        height_map: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ConnectionArgs {
    /// Port of the device acting as contact switch
    #[arg(short = 's', long)]
    switch_port: Option<String>,
    /// Port of the CNC controller
    #[arg(short = 'c', long)]
    cnc_port: Option<String>,
    /// Baud rate of the switch device
    #[arg(long)]
    switch_port_baud: Option<u32>,
    /// Baud rate of the CNC controller
    #[arg(long)]
    cnc_port_baud: Option<u32>,
}

#[derive(Args)]
struct ScanArgs {
    /// Contact wait after each step down (s)
    #[arg(short = 'd', long)]
    step_delay: Option<f64>,
    /// X width to calibrate across (mm)
    #[arg(short = 'x', long)]
    x_dim: Option<f64>,
    /// Y width to calibrate across (mm)
    #[arg(short = 'y', long)]
    y_dim: Option<f64>,
    /// Subsections of X calibration
    #[arg(long)]
    x_div: Option<u32>,
    /// Subsections of Y calibration
    #[arg(long)]
    y_div: Option<u32>,
    /// Readings to average per point
    #[arg(short = 'a', long)]
    averages: Option<u32>,
    /// Do not write the height map to the cache
    #[arg(long)]
    disable_height_map_cache: bool,
}

#[derive(Args)]
struct ContourArgs {
    /// G-code file to contour
    #[arg(short = 'i', long = "gcode-input-file")]
    input: PathBuf,
    /// Output file; defaults to the input name with .cgcode appended
    #[arg(long = "gcode-output-file")]
    output: Option<PathBuf>,
    /// Depth to carve below the surface (mm)
    #[arg(long = "gcode-target-z-depth")]
    target_depth: Option<f64>,
}

impl ConnectionArgs {
    fn apply(&self, config: &mut Config) {
        let connection = &mut config.connection;
        if let Some(port) = &self.switch_port {
            connection.switch_port = port.clone();
        }
        if let Some(port) = &self.cnc_port {
            connection.cnc_port = port.clone();
        }
        if let Some(baud) = self.switch_port_baud {
            connection.switch_baud_rate = baud;
        }
        if let Some(baud) = self.cnc_port_baud {
            connection.cnc_baud_rate = baud;
        }
    }
}

impl ScanArgs {
    fn apply(&self, config: &mut Config) {
        let scan = &mut config.scan;
        if let Some(delay) = self.step_delay {
            scan.step_delay_ms = (delay.max(0.0) * 1000.0).round() as u64;
        }
        if let Some(x_dim) = self.x_dim {
            scan.x_dim = Some(x_dim);
        }
        if let Some(y_dim) = self.y_dim {
            scan.y_dim = Some(y_dim);
        }
        if let Some(x_div) = self.x_div {
            scan.x_divisions = x_div;
        }
        if let Some(y_div) = self.y_div {
            scan.y_divisions = y_div;
        }
        if let Some(averages) = self.averages {
            scan.averages = averages;
        }
        if self.disable_height_map_cache {
            config.cache.enabled = false;
        }
    }
}

impl ContourArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(depth) = self.target_depth {
            config.contour.target_depth = depth;
        }
    }
}

/// Prompts on the terminal; an empty line continues, "n" or end of input declines
struct TerminalConfirm;

impl ConfirmationGate for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{} Press Enter to continue (n to abort)... ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => !matches!(answer.trim().to_lowercase().as_str(), "n" | "no" | "q" | "quit"),
        }
    }
}

fn require_scan_setup(config: &Config) -> Result<()> {
    if config.connection.cnc_port.is_empty() || config.connection.switch_port.is_empty() {
        anyhow::bail!("Both --cnc-port and --switch-port are required to scan");
    }
    config
        .scan
        .scan_parameters()
        .context("Both --x-dim and --y-dim are required to scan")?;
    Ok(())
}

fn print_ports() -> Result<()> {
    let ports = list_ports().context("Failed to list serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        match port.usb_ids {
            Some((vid, pid)) => println!(
                "{}\t{}\t[{:04x}:{:04x}]",
                port.port_name, port.description, vid, pid
            ),
            None => println!("{}\t{}", port.port_name, port.description),
        }
    }
    Ok(())
}

fn contour(map: &HeightMap, args: &ContourArgs, config: &Config) -> Result<PathBuf> {
    let output = contour_file(
        map,
        &args.input,
        args.output.as_deref(),
        config.contour.target_depth,
    )
    .with_context(|| format!("Failed to contour {}", args.input.display()))?;
    println!("Contoured G-code written to {}", output.display());
    Ok(output)
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load_or_default(path).context("Failed to load configuration")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    init_logging(level)?;
    tracing::debug!("surfacekit {} (built {})", VERSION, BUILD_DATE);

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Ports => print_ports()?,
        Commands::Scan { connection, scan } => {
            connection.apply(&mut config);
            scan.apply(&mut config);
            config.validate()?;
            require_scan_setup(&config)?;

            let map = scan_and_cache(&config, &mut TerminalConfirm, &mut LogProgress::default())
                .context("Calibration scan failed")?;
            println!("Scanned {} points", map.len());
        }
        Commands::Contour {
            height_map,
            contour: args,
        } => {
            args.apply(&mut config);
            config.validate()?;

            let map = obtain_height_map(
                &config,
                &HeightMapSource::Load(height_map),
                &mut TerminalConfirm,
                &mut LogProgress::default(),
            )?;
            contour(&map, &args, &config)?;
        }
        Commands::Run {
            connection,
            scan,
            contour: args,
            height_map,
        } => {
            connection.apply(&mut config);
            scan.apply(&mut config);
            args.apply(&mut config);
            config.validate()?;
            if !args.input.is_file() {
                return Err(Error::missing_file(&args.input).into());
            }

            let source = match height_map {
                Some(reference) => HeightMapSource::Load(reference),
                None => {
                    require_scan_setup(&config)?;
                    HeightMapSource::Scan
                }
            };
            let map = obtain_height_map(
                &config,
                &source,
                &mut TerminalConfirm,
                &mut LogProgress::default(),
            )?;
            contour(&map, &args, &config)?;
        }
    }

    Ok(())
}
