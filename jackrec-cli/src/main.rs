//! jackrec command line interface
//!
//! Records a fixed number of channels from the JACK audio server to a single
//! audio file until stopped by a signal, by the server, or by a duration limit.

use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn, LevelFilter};

use jackrec_core::{
    output_format, ExitStatus, RecorderConfiguration, RecordingController, ShutdownCoordinator, StopRequest,
    OUTPUT_FORMATS,
};
use jackrec_jack::JackServer;

#[derive(Parser, Debug)]
#[command(name = "jackrec")]
#[command(version)]
#[command(about = "Record audio from JACK to a file", long_about = None)]
struct Cli {
    /// Output file
    #[arg(required_unless_present = "list_formats")]
    file: Option<PathBuf>,

    /// Connect to the first available output ports (the default)
    #[arg(short, long, conflicts_with = "ports")]
    auto_connect: bool,

    /// JACK client name
    #[arg(short = 'n', long, default_value = "jackrec")]
    client_name: String,

    /// Output format (see --list-formats)
    #[arg(short, long, default_value = "aiff")]
    format: String,

    /// Target bitrate in kbit/s [default: 128 per channel]
    #[arg(short, long)]
    bitrate: Option<u32>,

    /// Number of channels to record
    #[arg(short, long, default_value_t = 2)]
    channels: usize,

    /// Recording duration in seconds; 0 records until stopped
    #[arg(short, long, default_value_t = 0)]
    duration: u64,

    /// Ring buffer length in seconds
    #[arg(short = 'R', long, default_value_t = 2.0)]
    buffer_duration: f64,

    /// Comma-separated output ports to connect, in channel order
    #[arg(short, long, value_delimiter = ',')]
    ports: Vec<String>,

    /// Do not start the JACK server if it is not running
    #[arg(short = 'S', long)]
    no_start_server: bool,

    /// Write <FILE>.metadata.json after recording
    #[arg(short, long)]
    metadata: bool,

    /// List the available output formats and exit
    #[arg(short, long)]
    list_formats: bool,

    /// Log debug messages
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        }
    }

    fn into_config(self) -> RecorderConfiguration {
        RecorderConfiguration {
            client_name: self.client_name,
            format: self.format,
            bitrate: self.bitrate,
            channels: self.channels,
            duration_secs: self.duration,
            buffer_duration_secs: self.buffer_duration,
            ports: self.ports,
            start_server: !self.no_start_server,
            output_path: self.file.unwrap_or_default(),
            write_metadata: self.metadata,
        }
    }
}

fn init_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("JACKREC_LOG")
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}  {}",
                record.level(),
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.args()
            )
        })
        .init();
}

fn list_formats() {
    println!("{:<8} Description", "Format");
    for format in OUTPUT_FORMATS {
        println!("{:<8} {}", format.name, format.description);
    }
}

fn install_signal_handler(shutdown: Arc<ShutdownCoordinator>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || match shutdown.request_stop() {
        StopRequest::Graceful => info!("Stop requested; finishing the recording."),
        StopRequest::Forced => {
            warn!("Forced exit.");
            process::exit(ExitStatus::Aborted.code());
        }
    })
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let status = if e.use_stderr() {
                ExitStatus::Usage
            } else {
                ExitStatus::Normal
            };
            process::exit(status.code());
        }
    };

    init_logging(cli.log_level());

    if cli.list_formats {
        list_formats();
        return;
    }

    if output_format(&cli.format).is_none() {
        error!("Unknown output format: {} (see --list-formats)", cli.format);
        process::exit(ExitStatus::Usage.code());
    }

    let config = cli.into_config();
    if let Err(e) = config.validate() {
        error!("{}", e);
        process::exit(ExitStatus::Usage.code());
    }

    let shutdown = Arc::new(ShutdownCoordinator::new());
    if let Err(e) = install_signal_handler(Arc::clone(&shutdown)) {
        error!("Failed to install signal handler: {}", e);
        process::exit(ExitStatus::Aborted.code());
    }

    let controller = RecordingController::new(config, shutdown);
    let status = controller.run(|config| JackServer::connect(&config.client_name, config.start_server));
    process::exit(status.code());
}
