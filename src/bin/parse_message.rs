//! Parse ASTM / HL7 message files and print every value with its address.
//!
//! Usage:
//!   parse_message [OPTIONS] [FILE ...]
//!   parse_message < message.txt
//!
//! Each record prints as `address:value` lines followed by a blank line. With
//! `--trans-map` addresses are replaced by the map's tokens; `--table` prints a
//! Markdown table per record instead.

use anyhow::Context;
use astm_records::dump::{content_table, mapped_content_table};
use astm_records::{ExtractOptions, MapDirection, Message, TranslationMap};
use clap::Parser;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "parse_message")]
#[command(about = "Print the addressed content of ASTM / HL7 messages")]
struct Args {
    /// Message files; reads stdin when none are given.
    files: Vec<PathBuf>,

    /// Translation map (`ADDRESS:TOKEN` per line).
    #[arg(long = "trans-map")]
    trans_map: Option<PathBuf>,

    /// Only print values whose address is in the translation map.
    #[arg(long)]
    only_mapped: bool,

    /// Skip composite values; print only values that do not split further.
    #[arg(long)]
    leaves_only: bool,

    /// Append `_Type`, `_Delimiters` and `_MsgType` to each record.
    #[arg(long)]
    metadata: bool,

    /// Print Markdown tables instead of `address:value` lines.
    #[arg(long)]
    table: bool,
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
    let map = args
        .trans_map
        .as_ref()
        .map(|path| TranslationMap::load(path, MapDirection::Forward));
    let options = ExtractOptions {
        only_mapped: args.only_mapped,
        suppress_ambiguous_top_level: args.leaves_only,
        include_metadata: args.metadata,
        ..ExtractOptions::default()
    };

    let inputs: Vec<(String, String)> = if args.files.is_empty() {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("reading message from stdin")?;
        vec![("<stdin>".to_string(), text)]
    } else {
        args.files
            .iter()
            .map(|path| {
                std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))
                    .map(|text| (path.display().to_string(), text))
            })
            .collect::<anyhow::Result<_>>()?
    };

    for (index, (name, text)) in inputs.iter().enumerate() {
        if index > 0 {
            println!();
        }
        let message = Message::parse(text, &options).with_context(|| format!("parsing {}", name))?;
        // tables show address and token side by side, so remap there instead
        let extract_map = if args.table { None } else { map.as_ref() };
        for record in message.extract(extract_map, &options) {
            if args.table {
                let table = match &map {
                    Some(map) => {
                        let rows: Vec<(String, String)> = record
                            .content
                            .into_iter()
                            .filter(|(key, _)| !args.only_mapped || map.contains_key(key))
                            .collect();
                        mapped_content_table(&rows, map)
                    }
                    None => content_table(&record.content),
                };
                println!("{}", table);
            } else {
                for (key, value) in &record.content {
                    println!("{}:{}", key, value);
                }
                println!();
            }
        }
    }
    Ok(())
}
