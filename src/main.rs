use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use lsrm_spe::export::{ExportFormat, export_file, output_path};
use lsrm_spe::{ByteOrder, CodePage, SpeOptions, load_file_with_options};

#[derive(Parser)]
#[command(
    name = "lsrm-spe",
    version,
    about = "Convert LSRM .spe gamma spectra to text, JSON or CSV"
)]
struct Cli {
    /// One or more .spe files.
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Output file (single input only).  Defaults to the input path with the
    /// format's extension.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Output format.  Inferred from --output when omitted, else txt.
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Header code page (any single-byte WHATWG label).
    #[arg(long, default_value = "windows-1251")]
    encoding: String,

    /// Byte order of the channel counts.
    #[arg(long, value_enum, default_value = "little")]
    byte_order: ByteOrderArg,

    /// Print the decoded header to stdout.
    #[arg(long)]
    print_header: bool,

    /// More log output (-v info, -vv debug, -vvv trace).  RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Txt,
    Json,
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Txt => ExportFormat::Txt,
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ByteOrderArg {
    Little,
    Big,
    Native,
}

impl From<ByteOrderArg> for ByteOrder {
    fn from(arg: ByteOrderArg) -> Self {
        match arg {
            ByteOrderArg::Little => ByteOrder::LittleEndian,
            ByteOrderArg::Big => ByteOrder::BigEndian,
            ByteOrderArg::Native => ByteOrder::Native,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            log::error!("{failed} of {} file(s) failed", cli.inputs.len());
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Convert every input; returns the number of files that failed.
fn run(cli: &Cli) -> Result<usize> {
    if cli.output.is_some() && cli.inputs.len() > 1 {
        bail!("--output can only be used with a single input file");
    }

    let code_page = CodePage::for_label(&cli.encoding)
        .with_context(|| format!("invalid --encoding {:?}", cli.encoding))?;
    let options = SpeOptions::default()
        .with_code_page(code_page)
        .with_byte_order(cli.byte_order.into());

    let format = cli
        .format
        .map(ExportFormat::from)
        .or_else(|| cli.output.as_deref().and_then(ExportFormat::from_path))
        .unwrap_or_default();

    let mut failed = 0;
    for input in &cli.inputs {
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| output_path(input, format));
        if let Err(e) = convert(input, &output, format, &options, cli.print_header) {
            log::error!("{}: {e:#}", input.display());
            failed += 1;
        }
    }
    Ok(failed)
}

fn convert(
    input: &Path,
    output: &Path,
    format: ExportFormat,
    options: &SpeOptions,
    print_header: bool,
) -> Result<()> {
    if input == output {
        bail!("output path is the same as the input");
    }

    let spectrum = load_file_with_options(input, options)
        .with_context(|| format!("reading {}", input.display()))?;

    if print_header {
        if let Some(info) = &spectrum.info {
            print!("{}", info.header_listing());
        }
    }

    export_file(&spectrum, output, format)?;
    log::info!(
        "{} → {} ({} channels)",
        input.display(),
        output.display(),
        spectrum.len()
    );
    Ok(())
}
