//! Command-line driver for the serial latency tester.

#[cfg(not(unix))]
fn main() {
    eprintln!("serial-latency drives termios serial ports and requires a unix platform");
    std::process::exit(1);
}

#[cfg(unix)]
fn main() -> anyhow::Result<()> {
    unix::run()
}

#[cfg(unix)]
mod unix {
    use std::fs::File;
    use std::io::{self, Write};
    use std::path::PathBuf;

    use anyhow::{bail, Context, Result};
    use clap::Parser;
    use colored::Colorize;
    use tracing_subscriber::EnvFilter;

    use serial_latency::cancel::install_signal_handlers;
    use serial_latency::measurement::{Collector, SerialPort, StopReason};
    use serial_latency::output::{flat, json, terminal};
    use serial_latency::platform;
    use serial_latency::{CancelToken, Config, Report};

    /// Round-trip latency tester for byte-echo serial links.
    #[derive(Parser, Debug)]
    #[command(name = "serial-latency", version, about, long_about = None)]
    struct Cli {
        /// Serial port to run the test on
        #[arg(short, long)]
        port: String,

        /// Baud rate
        #[arg(short, long, default_value_t = 9_600)]
        baud: u32,

        /// Number of samples to take for the measurement
        #[arg(short = 'S', long, default_value_t = 10_000)]
        samples: usize,

        /// Payload bytes per sample
        #[arg(short = 'n', long = "bytes", default_value_t = 1)]
        bytes: usize,

        /// Time interval between measurements in milliseconds
        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        wait: f64,

        /// Use a random interval between wait and 2*wait
        #[arg(short, long)]
        random_wait: bool,

        /// Use realtime (SCHED_FIFO) scheduling
        #[arg(short = 'R', long)]
        realtime: bool,

        /// Scheduling priority, use with --realtime
        #[arg(short = 'P', long)]
        priority: Option<i32>,

        /// Write raw samples to a file, one latency per line
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report as JSON instead of a bar chart
        #[arg(long)]
        json: bool,
    }

    impl Cli {
        /// Clamp out-of-range values: warn and continue rather than
        /// refuse to run.
        fn into_config(self) -> (Config, CliOutput) {
            let mut samples = self.samples;
            if samples == 0 {
                tracing::warn!("sample count must be positive; taking 1 sample");
                samples = 1;
            }

            let mut payload_size = self.bytes;
            if payload_size == 0 {
                tracing::warn!("payload size must be positive; sending 1 byte");
                payload_size = 1;
            }

            let mut wait_ms = self.wait;
            if wait_ms < 0.0 {
                tracing::warn!("wait time is negative; using zero");
                wait_ms = 0.0;
            }

            let config = Config {
                samples,
                payload_size,
                wait_ms,
                random_wait: self.random_wait,
                ..Config::default()
            };
            let output = CliOutput {
                port: self.port,
                baud: self.baud,
                realtime: self.realtime,
                priority: self.priority,
                output: self.output,
                json: self.json,
            };
            (config, output)
        }
    }

    /// The CLI options that are not part of the sampling config.
    struct CliOutput {
        port: String,
        baud: u32,
        realtime: bool,
        priority: Option<i32>,
        output: Option<PathBuf>,
        json: bool,
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn enable_realtime(priority: Option<i32>) {
        let max = platform::max_fifo_priority();
        let min = platform::min_fifo_priority();
        let mut priority = priority.unwrap_or(max);
        if priority > max {
            tracing::warn!("priority {} above SCHED_FIFO maximum; clamping to {}", priority, max);
            priority = max;
        } else if priority < min {
            tracing::warn!("priority {} below SCHED_FIFO minimum; clamping to {}", priority, min);
            priority = min;
        }

        print!("> set_realtime_priority(SCHED_FIFO, {}).. ", priority);
        let _ = io::stdout().flush();
        match platform::set_realtime_priority(priority) {
            Ok(()) => println!("done."),
            Err(err) => {
                println!("failed.");
                tracing::warn!("sched_setscheduler: {err}");
            }
        }
    }

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    fn enable_realtime(_priority: Option<i32>) {
        tracing::warn!("realtime scheduling is not supported on this platform");
    }

    pub fn run() -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with_writer(io::stderr)
            .init();

        let (config, cli) = Cli::parse().into_config();

        println!("> {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        if let Some(desc) = platform::system_description() {
            println!("> running on {}", desc);
        }

        let mut port = SerialPort::open(&cli.port, cli.baud)
            .with_context(|| format!("unable to start the test on {}", cli.port))?;

        if cli.realtime {
            enable_realtime(cli.priority);
        }

        println!("\n> sampling {} latency values - please wait ...", config.samples);
        println!("> press Ctrl+C to abort test");

        let cancel = CancelToken::new();
        install_signal_handlers(&cancel);

        // Live progress: overwrite in place, keep a line whenever a new
        // worst case shows up.
        let mut worst_so_far = 0.0f64;
        let outcome = Collector::new(&config).collect_with(&mut port, &cancel, |sample, _stats| {
            if sample.value > worst_so_far {
                worst_so_far = sample.value;
                println!("{:6}; {:10.2}; {:10.2}", sample.index, sample.value, worst_so_far);
            } else {
                print!("{:6}; {:10.2}; {:10.2}\r", sample.index, sample.value, worst_so_far);
                let _ = io::stdout().flush();
            }
        });

        match &outcome.stop {
            StopReason::Completed => println!("\n> {}", "done.".green()),
            StopReason::Cancelled => println!("\n> {}", "aborted by user".yellow()),
            StopReason::Transport(err) => {
                println!("\n> {}: {}", "sampling aborted".red(), err);
            }
        }

        let report = match Report::from_recording(&outcome.recording) {
            Some(report) => report,
            None => bail!("(no measurements)"),
        };

        if report.max_ms == 0.0 {
            bail!("no delay was measured; clock has too low resolution");
        }

        println!();
        if cli.json {
            println!("{}", json::to_json_pretty(&report)?);
        } else {
            print!("{}", terminal::format_report(&report));
        }

        if let Some(path) = &cli.output {
            let mut file = File::create(path)
                .with_context(|| format!("unable to create {}", path.display()))?;
            flat::write_samples(&mut file, outcome.recording.samples())
                .with_context(|| format!("unable to write {}", path.display()))?;
            println!("\n> wrote {} samples to {}", report.samples, path.display());
        }

        Ok(())
    }
}
