//! Process-level worker: newline-delimited JSON over stdin/stdout.
//!
//! Each input line is one layout request; each output line is either a
//! layout response or `{"error": {"kind": ..., "message": ...}}`. A bad line
//! never stops the stream.

use std::fs;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{LevelFilter, debug, info, warn};
use serde::Serialize;

use crate::error::{LayoutError, Result};
use crate::layout::{LayoutConfig, LayoutRequest, layout_with_stats};

/// Command-line arguments for the layout worker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
	/// Read a single (possibly multi-line) request from this file instead of stdin
	#[arg(short, long)]
	pub input: Option<PathBuf>,

	/// Path to a TOML file with layout configuration
	#[arg(short, long)]
	pub config: Option<PathBuf>,

	/// Override the configured tick count
	#[arg(long)]
	pub ticks: Option<usize>,

	/// Pretty-print responses
	#[arg(long)]
	pub pretty: bool,

	/// Log level (off, error, warn, info, debug, trace)
	#[arg(long, default_value = "warn")]
	pub log_level: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
	kind: &'static str,
	message: &'a str,
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
	error: ErrorBody<'a>,
}

/// Installs the stderr logger at `level`. Stdout carries responses only.
pub fn init_logging(level: LevelFilter) {
	env_logger::Builder::from_env(env_logger::Env::default())
		.filter_level(level)
		.init();
}

/// Loads the base configuration: the TOML file if given, else defaults,
/// then the `--ticks` override.
pub fn load_config(args: &Args) -> Result<LayoutConfig> {
	let mut config = match &args.config {
		Some(path) => load_config_file(path)?,
		None => {
			debug!("No configuration file given, using defaults");
			LayoutConfig::default()
		}
	};
	if let Some(ticks) = args.ticks {
		config.ticks = ticks;
	}
	config.validate()?;
	Ok(config)
}

fn load_config_file(path: &Path) -> Result<LayoutConfig> {
	info!(path = path.display().to_string(); "Loading configuration");
	let content = fs::read_to_string(path)?;
	toml::from_str(&content)
		.map_err(|e| LayoutError::invalid_input(format!("failed to parse {}: {e}", path.display())))
}

/// Runs the worker until its input is exhausted.
pub fn run(args: &Args) -> Result<()> {
	let config = load_config(args)?;
	let stdout = io::stdout();
	let mut out = BufWriter::new(stdout.lock());

	match &args.input {
		Some(path) => {
			let input = fs::read_to_string(path)?;
			let line = respond(&input, &config, args.pretty)?;
			writeln!(out, "{line}")?;
		}
		None => {
			let mut served = 0usize;
			for line in io::stdin().lock().lines() {
				let line = line?;
				if line.trim().is_empty() {
					continue;
				}
				let reply = respond(&line, &config, args.pretty)?;
				writeln!(out, "{reply}")?;
				out.flush()?;
				served += 1;
			}
			info!(requests = served; "Input exhausted");
		}
	}
	out.flush()?;
	Ok(())
}

/// Produces the output line for one request. Layout failures become error
/// responses; only serialization problems are returned as `Err`.
pub fn respond(input: &str, config: &LayoutConfig, pretty: bool) -> Result<String> {
	match LayoutRequest::from_json(input).and_then(|request| layout_with_stats(&request, config)) {
		Ok((response, stats)) => {
			debug!(ticks = stats.ticks, converged = stats.converged; "Request served");
			to_json(&response, pretty)
		}
		Err(err) => {
			warn!(kind = err.kind(); "Layout request failed: {err}");
			let message = err.to_string();
			to_json(
				&ErrorResponse {
					error: ErrorBody {
						kind: err.kind(),
						message: &message,
					},
				},
				pretty,
			)
		}
	}
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
	let json = if pretty {
		serde_json::to_string_pretty(value)
	} else {
		serde_json::to_string(value)
	};
	json.map_err(|e| LayoutError::Io(io::Error::other(e)))
}

#[cfg(test)]
mod tests {
	use serde_json::Value;

	use super::*;
	use crate::layout::LayoutResponse;

	#[test]
	fn respond_lays_out_a_valid_line() {
		let line = respond(
			r#"{"nodes":[{"id":"a"},{"id":"b"}],"edges":[{"source":"a","target":"b"}],"width":800,"height":600}"#,
			&LayoutConfig::default(),
			false,
		)
		.unwrap();
		let response: LayoutResponse = serde_json::from_str(&line).unwrap();
		assert_eq!(response.nodes.len(), 2);
	}

	#[test]
	fn respond_reports_errors_inline() {
		let line = respond("{not json", &LayoutConfig::default(), false).unwrap();
		let value: Value = serde_json::from_str(&line).unwrap();
		assert_eq!(value["error"]["kind"], "invalid_input");
		assert!(value["error"]["message"].as_str().unwrap().contains("invalid layout input"));
	}

	#[test]
	fn ticks_flag_overrides_defaults() {
		let args = Args::parse_from(["depgraph-layout", "--ticks", "25"]);
		assert_eq!(load_config(&args).unwrap().ticks, 25);
	}
}
