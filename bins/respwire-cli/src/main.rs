// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! respwire CLI entrypoint.
//!
//! Developer tooling over the wire codec:
//!
//! ```text
//! respwire decode --kind input-item message.json
//! respwire stream events.sse
//! respwire config --write
//! ```
//!
//! Decoded documents go to stdout in canonical encoding. Diagnostics and logs
//! go to stderr. The process exits non-zero on the first error.
#![forbid(unsafe_code)]
// The CLI is expected to print to stdout/stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use respwire_codec::config::CODEC_CONFIG_KEY;
use respwire_codec::{ConfigService, Decoded, TaggedUnion, WireCodec};
use respwire_config_fs::FsConfigStore;
use respwire_schema::{
    Annotation, InputContent, InputItem, MessageItem, OutputItem, Response, ResponseCreateParams, SequenceToken,
    StreamDispatcher, Tool,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode and inspect Responses wire documents")]
struct Args {
    /// Directory holding `codec.json` (defaults to the platform config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
    /// More log output on stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode one document and print its canonical encoding
    Decode {
        /// Shape of the document
        #[arg(long, value_enum)]
        kind: DocumentKind,
        /// Input file, or `-` for stdin
        path: Option<PathBuf>,
    },
    /// Decode an event stream, one event per line
    Stream {
        /// Input file, or `-` for stdin
        path: Option<PathBuf>,
    },
    /// Print the effective codec configuration
    Config {
        /// Persist the effective configuration
        #[arg(long)]
        write: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DocumentKind {
    InputItem,
    OutputItem,
    Message,
    Response,
    Request,
    Event,
    Content,
    Annotation,
    Tool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = ConfigService::new(open_store(args.config_dir.as_deref())?);
    let codec = WireCodec::new(config.codec_config().context("load codec config")?);
    tracing::debug!(codec_config = ?codec.config(), "effective codec config");

    match args.cmd {
        Command::Decode { kind, path } => {
            let bytes = read_input(path.as_deref())?;
            decode(kind, &codec, &bytes)
        }
        Command::Stream { path } => stream(StreamDispatcher::new(codec), path.as_deref()),
        Command::Config { write } => {
            if write {
                config.save(CODEC_CONFIG_KEY, codec.config()).context("save codec config")?;
            }
            print_json(&codec, codec.config())
        }
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn open_store(dir: Option<&Path>) -> Result<FsConfigStore> {
    let store = match dir {
        Some(dir) => FsConfigStore::at(dir),
        None => FsConfigStore::new(),
    };
    store.context("open config store")
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) if path != Path::new("-") => {
            fs::read(path).with_context(|| format!("read {}", path.display()))
        }
        _ => {
            let mut bytes = Vec::new();
            io::stdin().read_to_end(&mut bytes).context("read stdin")?;
            Ok(bytes)
        }
    }
}

fn decode(kind: DocumentKind, codec: &WireCodec, bytes: &[u8]) -> Result<()> {
    match kind {
        DocumentKind::InputItem => report(codec, codec.decode::<InputItem>(bytes)?),
        DocumentKind::OutputItem => report(codec, codec.decode::<OutputItem>(bytes)?),
        DocumentKind::Message => report(codec, codec.decode::<MessageItem>(bytes)?),
        DocumentKind::Response => report(codec, codec.decode::<Response>(bytes)?),
        DocumentKind::Request => report(codec, codec.decode::<ResponseCreateParams>(bytes)?),
        DocumentKind::Content => report(codec, codec.decode::<InputContent>(bytes)?),
        DocumentKind::Annotation => report(codec, codec.decode::<Annotation>(bytes)?),
        DocumentKind::Tool => report(codec, codec.decode::<Tool>(bytes)?),
        DocumentKind::Event => report(codec, StreamDispatcher::new(codec.clone()).decode(bytes)?),
    }
}

fn report<T: Serialize>(codec: &WireCodec, decoded: Decoded<T>) -> Result<()> {
    let (value, diagnostics) = decoded.into_parts();
    for diagnostic in &diagnostics {
        eprintln!("diagnostic: {}", serde_json::to_string(diagnostic)?);
    }
    print_json(codec, &value)
}

fn print_json<T: Serialize>(codec: &WireCodec, value: &T) -> Result<()> {
    write_json(codec, value, &mut io::stdout().lock())
}

/// Pretty-prints the codec's encoding of `value`, so named fields replace
/// colliding extension keys exactly as on the wire.
fn write_json<T: Serialize>(codec: &WireCodec, value: &T, out: &mut impl Write) -> Result<()> {
    let encoded = codec.encode_value(value)?;
    serde_json::to_writer_pretty(&mut *out, &encoded)?;
    writeln!(out)?;
    Ok(())
}

fn stream(dispatcher: StreamDispatcher, path: Option<&Path>) -> Result<()> {
    let reader: Box<dyn BufRead> = match path {
        Some(path) if path != Path::new("-") => Box::new(BufReader::new(
            fs::File::open(path).with_context(|| format!("open {}", path.display()))?,
        )),
        _ => Box::new(io::stdin().lock()),
    };
    let mut out = io::stdout().lock();
    let mut last: Option<SequenceToken> = None;
    let mut events = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("read stream line")?;
        let Some(decoded) = dispatcher
            .decode_line(&line)
            .with_context(|| format!("line {}", index + 1))?
        else {
            continue;
        };
        for diagnostic in &decoded.diagnostics {
            eprintln!("diagnostic: {}", serde_json::to_string(diagnostic)?);
        }
        let event = decoded.value;
        if let (Some(prev), Some(seq)) = (last, event.sequence) {
            if seq <= prev {
                tracing::warn!(%prev, %seq, "sequence number did not increase");
            }
        }
        last = event.sequence.or(last);
        events += 1;
        let seq = event.sequence.map_or_else(|| "-".to_owned(), |s| s.to_string());
        writeln!(out, "{seq}\t{}", event.event.tag())?;
    }
    tracing::info!(events, "stream finished");
    Ok(())
}
