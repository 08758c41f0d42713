//! Layout worker process entry point.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
	use std::{process, str::FromStr};

	use clap::Parser;
	use log::{LevelFilter, error, info};

	use depgraph_layout::cli::{self, Args};

	let args = Args::parse();

	let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
		eprintln!("Invalid log level: {}. Using 'warn' instead.", args.log_level);
		LevelFilter::Warn
	});

	cli::init_logging(log_level);

	info!(log_level:?; "Starting layout worker");

	if let Err(err) = cli::run(&args) {
		error!(kind = err.kind(); "{err}");
		process::exit(1);
	}
}

#[cfg(target_arch = "wasm32")]
fn main() {}
