//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

/// Muxarr - batch muxing for anime episode releases
#[derive(Debug, Parser)]
#[command(name = "muxarr")]
#[command(author, about, long_about = None)]
pub struct Cli {
    /// Episodes to mux (e.g. "1", "1-5,7", "OVA1,NCOP", "all")
    pub episodes: String,

    /// Output directory
    #[arg(default_value = "muxed")]
    pub outdir: PathBuf,

    /// Release flag used in output naming and the subtitle track name
    /// (defaults to the configured flag)
    #[arg(short, long)]
    pub flag: Option<String>,

    /// Release version number; v2 and up are appended to the output name
    #[arg(short = 'v', long, default_value_t = 1)]
    pub version: u32,

    /// Parse the selection and check subtitles only, without muxing
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Explicit config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
