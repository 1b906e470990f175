//! topdf CLI - document to PDF conversion with a JSON result envelope

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};

use topdf::tool::timeout_from_secs;
use topdf::{
    compress_pdf, CapabilityRegistry, CompressOptions, CompressionEngine, CompressionLevel,
    ConversionRequest, ConvertOptions, Converter,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "topdf")]
#[command(version)]
#[command(about = "Convert documents to PDF; prints a JSON result on stdout", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Base64 document content, or "-" to read it from stdin
    #[arg(value_name = "BASE64")]
    content: Option<String>,

    /// Declared MIME type of the document
    #[arg(value_name = "MIME_TYPE")]
    mime: Option<String>,

    /// Original file name of the document
    #[arg(value_name = "FILE_NAME")]
    file_name: Option<String>,

    /// Compress the converted PDF (light, medium, high)
    #[arg(long, value_name = "LEVEL")]
    compress: Option<CompressionLevel>,

    #[command(flatten)]
    tools: ToolArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct ToolArgs {
    /// Compression engine (gs, qpdf)
    #[arg(long, value_name = "ENGINE", default_value = "gs", global = true)]
    engine: CompressionEngine,

    /// RTF filter binary
    #[arg(long, value_name = "PATH", env = "TOPDF_PANDOC", global = true)]
    pandoc: Option<PathBuf>,

    /// Ghostscript binary
    #[arg(long, value_name = "PATH", env = "TOPDF_GS", global = true)]
    gs: Option<PathBuf>,

    /// qpdf binary
    #[arg(long, value_name = "PATH", env = "TOPDF_QPDF", global = true)]
    qpdf: Option<PathBuf>,

    /// Time limit for each external tool, in seconds
    #[arg(long, value_name = "SECS", env = "TOPDF_TOOL_TIMEOUT_SECS", global = true)]
    timeout: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compress an existing PDF
    Compress {
        /// Base64 PDF content, or "-" to read it from stdin
        #[arg(value_name = "BASE64")]
        content: String,

        /// Compression level (light, medium, high)
        #[arg(value_name = "LEVEL", default_value = "medium")]
        level: CompressionLevel,
    },

    /// Show which formats can be converted
    Capabilities,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => Ok(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => Err(e.to_string()),
    };

    let (envelope, code) = run(cli);
    println!("{}", envelope);
    code
}

/// Execute a parsed command line and build the stdout envelope.
fn run(cli: Result<Cli, String>) -> (Value, ExitCode) {
    let result: CliResult<Value> = cli.map_err(Into::into).and_then(|cli| dispatch(&cli));
    match result {
        Ok(value) => (value, ExitCode::SUCCESS),
        Err(e) => {
            let message = e.to_string();
            let message = message.trim();
            log::error!("{}", message);
            (json!({ "success": false, "error": message }), ExitCode::FAILURE)
        }
    }
}

fn dispatch(cli: &Cli) -> CliResult<Value> {
    match &cli.command {
        Some(Commands::Compress { content, level }) => cmd_compress(content, *level, &cli.tools),
        Some(Commands::Capabilities) => cmd_capabilities(&cli.tools),
        None => match (&cli.content, &cli.mime, &cli.file_name) {
            (Some(content), Some(mime), Some(file_name)) => {
                cmd_convert(content, mime, file_name, cli.compress, &cli.tools)
            }
            _ => Err("expected arguments: <BASE64> <MIME_TYPE> <FILE_NAME>".into()),
        },
    }
}

fn cmd_convert(
    content: &str,
    mime: &str,
    file_name: &str,
    compress: Option<CompressionLevel>,
    tools: &ToolArgs,
) -> CliResult<Value> {
    let bytes = decode_payload(content)?;
    let converter = Converter::with_options(convert_options(tools)?);
    let mut result = converter.convert(ConversionRequest::new(bytes, mime, file_name))?;

    if let Some(level) = compress {
        let compressed = compress_pdf(&result.pdf_bytes, &compress_options(level, tools)?)?;
        result = result.with_pdf_bytes(compressed.pdf_bytes);
    }

    Ok(json!({
        "success": true,
        "pdf_base64": STANDARD.encode(&result.pdf_bytes),
        "original_size": result.original_size,
        "pdf_size": result.output_size,
    }))
}

fn cmd_compress(content: &str, level: CompressionLevel, tools: &ToolArgs) -> CliResult<Value> {
    let pdf = decode_payload(content)?;
    let result = compress_pdf(&pdf, &compress_options(level, tools)?)?;
    Ok(json!({
        "success": true,
        "compressed_pdf": STANDARD.encode(&result.pdf_bytes),
        "original_size": result.original_size,
        "compressed_size": result.compressed_size,
    }))
}

fn cmd_capabilities(tools: &ToolArgs) -> CliResult<Value> {
    let registry = match &tools.pandoc {
        Some(pandoc) => CapabilityRegistry::probe(pandoc),
        None => CapabilityRegistry::global().clone(),
    };
    Ok(serde_json::to_value(registry.entries())?)
}

/// Decode a base64 argument; "-" reads the payload from stdin.
fn decode_payload(arg: &str) -> CliResult<Vec<u8>> {
    let encoded = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        arg.to_string()
    };
    let compact: String = encoded.split_whitespace().collect();
    STANDARD
        .decode(compact)
        .map_err(|e| format!("invalid base64 content: {}", e).into())
}

fn tool_timeout(tools: &ToolArgs) -> CliResult<Option<Duration>> {
    Ok(tools.timeout.map(timeout_from_secs).transpose()?)
}

fn convert_options(tools: &ToolArgs) -> CliResult<ConvertOptions> {
    let mut options = ConvertOptions::new();
    if let Some(pandoc) = &tools.pandoc {
        options = options.with_pandoc(pandoc);
    }
    if let Some(timeout) = tool_timeout(tools)? {
        options = options.with_tool_timeout(timeout);
    }
    Ok(options)
}

fn compress_options(level: CompressionLevel, tools: &ToolArgs) -> CliResult<CompressOptions> {
    let mut options = CompressOptions::new()
        .with_level(level)
        .with_engine(tools.engine);
    if let Some(gs) = &tools.gs {
        options = options.with_gs(gs);
    }
    if let Some(qpdf) = &tools.qpdf {
        options = options.with_qpdf(qpdf);
    }
    if let Some(timeout) = tool_timeout(tools)? {
        options = options.with_timeout(timeout);
    }
    Ok(options)
}
