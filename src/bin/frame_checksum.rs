//! LIS1-A frame checksum calculator.
//!
//! Usage:
//!   frame_checksum '<STX>1H|\^&<CR><ETX>'
//!   frame_checksum < frame.txt
//!
//! The frame is written in beautified notation (`<STX>`, `<CR>`, ...). Prints the
//! checksum, then the completed frame (trailer rewritten) as hex and beautified.

use anyhow::Context;
use astm_records::dump::hex_string;
use astm_records::frame::{beautify, checksum_with, complete_frame, unbeautify, FrameMarkers};
use clap::Parser;
use std::io::{self, Read};

#[derive(Parser, Debug)]
#[command(name = "frame_checksum")]
#[command(about = "Compute and complete LIS1-A frame checksums")]
struct Args {
    /// Frame in beautified notation; reads stdin when omitted.
    frame: Option<String>,

    /// Only print the checksum.
    #[arg(long, short)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("astm_records=warn".parse().context("log directive")?),
        )
        .init();

    let args = Args::parse();
    let text = match args.frame {
        Some(frame) => frame,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading frame from stdin")?;
            text.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string()
        }
    };

    let markers = FrameMarkers::default();
    let frame = unbeautify(&text);
    println!("{}", checksum_with(&frame, &markers));
    if args.quiet {
        return Ok(());
    }
    let completed = complete_frame(&frame, &markers).context("completing frame")?;
    println!("{}", hex_string(&completed));
    println!("{}", beautify(&completed));
    Ok(())
}
