//! # FastCharset CLI - Charset Detection and Conversion
//!
//! Command-line interface for sniffing the encoding of files of unknown
//! origin and converting them between charsets.

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use tracing::{debug, info};
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use fast_charset::bom::BOM_TABLE;
#[cfg(feature = "cli")]
use fast_charset::{
    ConversionOptions, Detection, EncodingDetector, Error as CharsetError, Transcoder, Utf8Validator, ValidatorState,
};

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// FastCharset: charset detection and conversion
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "fast-charset")]
#[command(version, about, long_about = None)]
#[command(author = "FastCharset Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Convert a file between charsets
    Convert(ConvertArgs),

    /// Detect the charset of a file
    Detect(DetectArgs),

    /// Show the byte order mark of a charset
    Bom(BomArgs),

    /// Check that a file is strictly valid UTF-8
    Validate(ValidateArgs),
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ConvertArgs {
    /// Source charset (detected when omitted)
    #[arg(short = 'f', long = "from")]
    from: Option<String>,

    /// Target charset
    #[arg(short = 't', long = "to")]
    to: String,

    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Convert in-place (overwrite input file)
    #[arg(long, conflicts_with = "output")]
    in_place: bool,

    /// Fail on the first illegal sequence instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Strip the source charset's BOM from the input
    #[arg(long)]
    strip_bom: bool,

    /// Add the target charset's BOM to the output
    #[arg(long)]
    add_bom: bool,

    /// Conversion options as JSON, e.g. '{"strict": true}'
    #[arg(long)]
    options: Option<String>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct DetectArgs {
    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Maximum bytes to read for detection (whole input if not specified)
    #[arg(long)]
    sample_size: Option<usize>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct BomArgs {
    /// Charset to look up
    #[arg(required_unless_present = "all")]
    charset: Option<String>,

    /// List every registered signature in match order
    #[arg(long)]
    all: bool,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ValidateArgs {
    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ConversionReport<'a> {
    success: bool,
    from: &'a str,
    to: &'a str,
    detected: Option<&'a Detection>,
    options: ConversionOptions,
    bytes_processed: usize,
    bytes_written: usize,
    processing_time_ms: u64,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct DetectionReport<'a> {
    #[serde(flatten)]
    detection: Option<&'a Detection>,
    error: Option<String>,
    sample_size: usize,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct BomEntry<'a> {
    charset: &'a str,
    bom: String,
    length: usize,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert(ref args) => convert_command(args, &cli)?,
        Commands::Detect(ref args) => detect_command(args, &cli)?,
        Commands::Bom(ref args) => bom_command(args, &cli)?,
        Commands::Validate(ref args) => validate_command(args, &cli)?,
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` takes precedence over `--verbose`
#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(feature = "cli")]
fn read_input(input: Option<&PathBuf>) -> Result<Vec<u8>> {
    if let Some(input_path) = input {
        debug!(path = %input_path.display(), "reading input file");
        fs::read(input_path)
            .with_context(|| format!("Failed to read input file: {}", input_path.display()))
    } else {
        debug!("reading from stdin");
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    }
}

#[cfg(feature = "cli")]
fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Merge `--options` JSON with the individual flags; flags only ever switch
/// an option on
#[cfg(feature = "cli")]
fn conversion_options(args: &ConvertArgs) -> Result<ConversionOptions> {
    let mut options = match args.options {
        Some(ref json) => serde_json::from_str::<ConversionOptions>(json)
            .with_context(|| format!("Invalid conversion options: {}", json))?,
        None => ConversionOptions::default(),
    };
    options.strict |= args.strict;
    options.handle_from_bom |= args.strip_bom;
    options.handle_to_bom |= args.add_bom;
    Ok(options)
}

#[cfg(feature = "cli")]
fn convert_command(args: &ConvertArgs, cli: &Cli) -> Result<()> {
    let start_time = std::time::Instant::now();
    let input_data = read_input(args.input.as_ref())?;
    let options = conversion_options(args)?;

    // Without --from this is the "open a file" path: detect, and drop any BOM found
    let (from, detected) = match args.from {
        Some(ref from) => (from.clone(), None),
        None => {
            let detection = fast_charset::detect(&input_data).context("Failed to detect the source charset")?;
            info!(charset = %detection.charset, had_bom = detection.had_bom, "detected source charset");
            (detection.charset.clone(), Some(detection))
        }
    };
    let body = &input_data[detected.as_ref().map_or(0, Detection::bom_len)..];

    let transcoder = Transcoder::new(&from, &args.to, options)
        .with_context(|| format!("Failed to create transcoder from {} to {}", from, args.to))?;
    let output_data = transcoder.convert(body).context("Conversion failed")?;

    if args.in_place {
        let Some(ref input_path) = args.input else {
            anyhow::bail!("Cannot use --in-place without input file");
        };
        fs::write(input_path, &output_data)
            .with_context(|| format!("Failed to write to input file: {}", input_path.display()))?;
        info!(path = %input_path.display(), "updated file in-place");
    } else if let Some(ref output_path) = args.output {
        fs::write(output_path, &output_data)
            .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;
        info!(path = %output_path.display(), "wrote output file");
    } else {
        io::stdout()
            .write_all(&output_data)
            .context("Failed to write to stdout")?;
    }

    let processing_time = start_time.elapsed();
    info!(
        bytes_in = input_data.len(),
        bytes_out = output_data.len(),
        elapsed = ?processing_time,
        "conversion finished"
    );

    match cli.format {
        OutputFormat::Json => {
            let report = ConversionReport {
                success: true,
                from: &from,
                to: &args.to,
                detected: detected.as_ref(),
                options,
                bytes_processed: input_data.len(),
                bytes_written: output_data.len(),
                processing_time_ms: processing_time.as_millis() as u64,
            };
            // Keep stdout clean when it carries the converted bytes
            let rendered = serde_json::to_string_pretty(&report)?;
            if args.output.is_some() || args.in_place {
                println!("{}", rendered);
            } else {
                eprintln!("{}", rendered);
            }
        }
        OutputFormat::Text => {
            if cli.verbose || args.output.is_some() {
                eprintln!("✓ Converted {} -> {}", from, args.to);
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn detect_command(args: &DetectArgs, cli: &Cli) -> Result<()> {
    let input_data = read_input(args.input.as_ref())?;
    let limit = args.sample_size.unwrap_or(input_data.len());
    let sample_size = limit.min(input_data.len());

    let result = EncodingDetector::new().detect_sample(&input_data, limit);

    match cli.format {
        OutputFormat::Json => {
            let report = DetectionReport {
                detection: result.as_ref().ok(),
                error: result.as_ref().err().map(ToString::to_string),
                sample_size,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => match result {
            Ok(ref detection) => {
                println!("Detected encoding: {}", detection.charset);
                println!("BOM detected: {}", if detection.had_bom { "Yes" } else { "No" });
                println!("Method: {:?}", detection.method);
                println!("Sample size: {} bytes", sample_size);
            }
            Err(ref e) => eprintln!("✗ {}", e),
        },
    }

    if let Err(CharsetError::DetectionFailed) = result {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn bom_command(args: &BomArgs, cli: &Cli) -> Result<()> {
    let entries: Vec<BomEntry> = if args.all {
        BOM_TABLE
            .iter()
            .map(|sig| BomEntry {
                charset: sig.charset,
                bom: hex(sig.bytes),
                length: sig.len(),
            })
            .collect()
    } else {
        let charset = args.charset.as_deref().unwrap_or_default();
        let bom = fast_charset::bom(charset);
        vec![BomEntry {
            charset,
            bom: hex(bom),
            length: bom.len(),
        }]
    };

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            for entry in &entries {
                if entry.length == 0 {
                    println!("{:10} (none)", entry.charset);
                } else {
                    println!("{:10} {}", entry.charset, entry.bom);
                }
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn validate_command(args: &ValidateArgs, cli: &Cli) -> Result<()> {
    let input_data = read_input(args.input.as_ref())?;

    let mut validator = Utf8Validator::new();
    let state = validator.feed(&input_data);
    let valid = validator.is_valid();

    match cli.format {
        OutputFormat::Json => {
            let result = serde_json::json!({
                "valid": valid,
                "truncated": state == ValidatorState::Incomplete,
                "bytes": input_data.len(),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Text => match state {
            ValidatorState::Accept => println!("✓ Input is valid UTF-8"),
            ValidatorState::Incomplete => println!("✗ Input ends inside a UTF-8 sequence"),
            ValidatorState::Reject => println!("✗ Input is not valid UTF-8"),
        },
    }

    if !valid {
        std::process::exit(1);
    }

    Ok(())
}
