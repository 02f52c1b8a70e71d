//! `plysplat` command-line front end.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use plysplat_core::UncompressedSplat;
use plysplat_io::{DecodeOptions, PlySplatReader, SplatReader};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and pack Gaussian splat PLY files")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the decoded header.
    Info {
        file: PathBuf,
    },
    /// Print the first canonical splats.
    Dump {
        file: PathBuf,
        /// Number of splats to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,
        /// Harmonics degree to decode (clamped to what the file provides).
        #[arg(long, default_value_t = 0)]
        sh_degree: u8,
    },
    /// Write the packed splat buffer to a file.
    Pack {
        file: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value_t = 0)]
        sh_degree: u8,
        /// Serialize rows on multiple threads.
        #[arg(long)]
        parallel: bool,
    },
}

impl Cli {
    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

/// Runs `cli`, writing human-readable output to `out`.
pub fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    match &cli.command {
        Command::Info { file } => info(file, out),
        Command::Dump {
            file,
            rows,
            sh_degree,
        } => dump(file, *rows, *sh_degree, out),
        Command::Pack {
            file,
            output,
            sh_degree,
            parallel,
        } => pack(file, output, *sh_degree, *parallel, out),
    }
}

fn open(file: &Path) -> anyhow::Result<PlySplatReader> {
    PlySplatReader::open(file).with_context(|| format!("failed to read {}", file.display()))
}

fn info(file: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let reader = open(file)?;
    let header = reader.header();
    writeln!(out, "file:           {}", file.display())?;
    writeln!(out, "format:         {}", header.encoding.name())?;
    writeln!(out, "splats:         {}", header.record_count)?;
    writeln!(out, "record stride:  {} bytes", header.bytes_per_record)?;
    writeln!(out, "header length:  {} bytes", header.header_byte_length)?;
    writeln!(out, "sh degree:      {}", header.sh_degree)?;
    writeln!(out, "properties:")?;
    for property in &header.properties {
        let marker = if plysplat_io::FieldId::from_name(&property.name).is_some() {
            ""
        } else {
            " (ignored)"
        };
        writeln!(
            out,
            "  {:>4}  {:<8} {}{}",
            property.offset,
            format!("{:?}", property.ty),
            property.name,
            marker
        )?;
    }
    let expected = header.expected_total_length();
    if reader.data().len() != expected {
        writeln!(
            out,
            "warning: file is {} bytes, header describes {}",
            reader.data().len(),
            expected
        )?;
    }
    Ok(())
}

fn dump(file: &Path, rows: usize, sh_degree: u8, out: &mut impl Write) -> anyhow::Result<()> {
    let reader = open(file)?;
    let options = DecodeOptions::new().with_sh_degree(sh_degree);
    let splats = reader
        .read_splats(&options)
        .with_context(|| format!("failed to decode {}", file.display()))?;
    for (i, splat) in splats.iter().take(rows).enumerate() {
        write_splat(out, i, splat)?;
    }
    if splats.splat_count() > rows {
        writeln!(out, "... {} more", splats.splat_count() - rows)?;
    }
    Ok(())
}

fn write_splat(out: &mut impl Write, index: usize, splat: &UncompressedSplat) -> anyhow::Result<()> {
    let [x, y, z] = splat.position;
    let [sx, sy, sz] = splat.scale;
    let [qx, qy, qz, qw] = splat.rotation;
    let [r, g, b, a] = splat.rgba();
    writeln!(
        out,
        "{index}: pos ({x}, {y}, {z}) scale ({sx}, {sy}, {sz}) rot ({qx}, {qy}, {qz}, {qw}) rgba ({r}, {g}, {b}, {a})"
    )?;
    if !splat.harmonics.is_empty() {
        writeln!(out, "   sh {:?}", splat.harmonics)?;
    }
    Ok(())
}

fn pack(
    file: &Path,
    output: &Path,
    sh_degree: u8,
    parallel: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let reader = open(file)?;
    let options = DecodeOptions::new()
        .with_sh_degree(sh_degree)
        .with_parallel(parallel);
    let packed = reader
        .read_packed(&options)
        .with_context(|| format!("failed to decode {}", file.display()))?;
    fs::write(output, &packed).with_context(|| format!("failed to write {}", output.display()))?;
    log::info!("Wrote {} bytes to {}", packed.len(), output.display());
    writeln!(
        out,
        "packed {} splats ({} bytes) into {}",
        reader.splat_count(),
        packed.len(),
        output.display()
    )?;
    Ok(())
}
