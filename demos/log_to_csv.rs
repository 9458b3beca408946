//! Log TrackIR 6DOF samples as CSV.
//!
//! Usage: cargo run --example log_to_csv [output.csv]
//! Writes to stdout when no path is given. Press Ctrl+C to stop.
//!
//! Settings come from `TRACKIR_*` environment variables (see `Config::from_env`).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use trackir::csv::CsvWriter;
use trackir::protocol::NpResult;
use trackir::{Client, Config, PollLoop, TrackIrError};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        if e.np_code() == Some(NpResult::AlreadyRegistered) {
            eprintln!("  (the previous session did not shut down; restart the TrackIR software)");
        }
        std::process::exit(1);
    }
}

fn run() -> trackir::Result<()> {
    let config = Config::from_env();

    let out: Box<dyn Write> = match std::env::args_os().nth(1) {
        Some(path) => {
            eprintln!("Writing CSV to {}", path.to_string_lossy());
            Box::new(BufWriter::new(File::create(path)?))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut csv = CsvWriter::new(out, config.timestamp);

    let mut client = Client::open_from_config(&config)?;
    eprintln!("DLL:     {}", client.signature().dll);
    eprintln!("Window:  {}", client.hwnd());

    let poller = PollLoop::new(config.poll_interval());
    let stop = poller.stop_handle();
    ctrlc::set_handler(move || stop.stop())
        .map_err(|e| TrackIrError::Io(io::Error::other(e)))?;

    eprintln!("Logging (Ctrl+C to stop)...");
    csv.write_header()?;
    let stats = poller.run(&mut client, |sample, elapsed| csv.write_sample(sample, elapsed))?;
    client.stop()?;

    eprintln!("num_logged_frames: {}", stats.logged_frames);
    eprintln!("num_missed_frames: {}", stats.missed_frames);
    eprintln!("Total time: {:.0} s", stats.elapsed.as_secs_f64());
    eprintln!("Rate: {:.0} hz", stats.rate_hz());
    Ok(())
}
