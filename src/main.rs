use clap::{Parser, Subcommand};
use seqconv::convert::{self, ConvertOptions};
use seqconv::{ByteOrder, Family, Header, Version};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "seqconv", about = "Audio sequence container converter")]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-encode a CSEQ/FSEQ container
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Output family: f (FSEQ) or c (CSEQ); defaults to the input's
        #[arg(short, long)]
        family: Option<Family>,
        /// Output byte order: big or little; defaults to the family's
        #[arg(short, long)]
        endian: Option<ByteOrder>,
        /// Output version, e.g. 2.1.0 (default 1.0.0)
        #[arg(long)]
        version: Option<Version>,
        /// Write <stem>Labels.txt next to the output
        #[arg(long)]
        export_labels: bool,
    },
    /// Show header fields of any supported sequence file
    Info {
        input: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the label table as `name: offset` lines
    Labels {
        input: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match cli.command {

        // ── Convert ──────────────────────────────────────────────────────────
        Commands::Convert { input, output, family, endian, version, export_labels } => {
            let opts = ConvertOptions { family, byte_order: endian, version, export_labels };
            let report = convert::convert(&input, &output, &opts)?;
            println!("Wrote: {} ({} B)", report.output.display(), report.bytes_written);
            if let Some(path) = report.labels_path {
                println!("Labels: {}", path.display());
            }
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input, json } => {
            let header = convert::inspect(&input)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&header)?);
            } else {
                print_header(&input, &header);
            }
        }

        // ── Labels ───────────────────────────────────────────────────────────
        Commands::Labels { input } => {
            let container = convert::load(&input)?;
            print!("{}", seqconv::label::to_text(&container.labels));
        }
    }

    Ok(())
}

fn print_header(input: &Path, header: &Header) {
    println!("── Sequence header ─────────────────────────────────────");
    println!("  Path           {}", input.display());
    println!("  Kind           {:?}", header.kind);
    println!("  Magic          {} ({})", header.magic_str(), hex::encode(header.magic));
    println!("  Byte order     {}", header.byte_order);
    println!("  Version        {}", header.version);
    println!("  File size      {} B", header.file_size);
    println!("  Header size    0x{:X}", header.header_size);
    println!("  Blocks ({}):", header.blocks.len());
    for b in &header.blocks {
        let tag = b.block_type.map(|t| format!("0x{t:04X}")).unwrap_or_else(|| "-".into());
        println!("    type {:<6}  offset 0x{:08X}  size 0x{:X}", tag, b.offset, b.size);
    }
}
