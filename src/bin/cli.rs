//! LitContest CLI Client
//!
//! Command-line interface for talking to a contest server.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::{Parser, Subcommand, ValueEnum};
use litcontest::contest::PayloadKind;
use litcontest::format::DOCX_CONTENT_TYPE;
use litcontest::network::client;
use litcontest::protocol::{ClientResponse, Request};
use serde_json::json;

/// LitContest CLI
#[derive(Parser, Debug)]
#[command(name = "litcontest-cli")]
#[command(about = "CLI for the LitContest server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Client identifier sent as X-Client-Id
    #[arg(short, long)]
    client_id: Option<String>,

    /// Socket timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show contest windows and the server clock
    Status,

    /// Fetch your review assignments
    Assignments {
        #[arg(short, long, value_enum, default_value = "json")]
        format: DownloadFormat,

        /// Where to write workbook or archive downloads
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Submit a story from a UTF-8 text file as JSON
    Submit {
        /// Story title
        title: String,

        /// Text file with the story
        file: PathBuf,
    },

    /// Upload a .txt or .docx file as-is
    Upload {
        file: PathBuf,

        /// Story title (X-Story-Title)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Send a story the way the mail gateway does
    Mail {
        /// Message subject
        subject: String,

        /// Attachment (.txt, .doc or .docx)
        file: PathBuf,
    },

    /// Upload a storyId,score CSV
    Reviews { file: PathBuf },

    /// Fetch the ranking
    Results,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DownloadFormat {
    Json,
    Xlsx,
    Zip,
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<i32, Box<dyn std::error::Error>> {
    let request = match &args.command {
        Commands::Status => Request::new("GET", "/status"),
        Commands::Results => Request::new("GET", "/results"),
        Commands::Assignments { format, .. } => {
            let path = match format {
                DownloadFormat::Json => "/assignments",
                DownloadFormat::Xlsx => "/assignments.xlsx",
                DownloadFormat::Zip => "/assignments.zip",
            };
            Request::new("GET", path)
        }
        Commands::Submit { title, file } => {
            let text = fs::read_to_string(file)?;
            Request::new("POST", "/submit")
                .with_header("Content-Type", "application/json")
                .with_body(json!({ "title": title, "text": text }).to_string())
        }
        Commands::Upload { file, title } => {
            let content_type = match PayloadKind::from_file_name(&file_name(file)) {
                Some(PayloadKind::PlainText) => "text/plain; charset=utf-8",
                Some(PayloadKind::Document) => DOCX_CONTENT_TYPE,
                None => return Err("upload needs a .txt, .doc or .docx file".into()),
            };
            let mut request = Request::new("PUT", "/submission")
                .with_header("Content-Type", content_type)
                .with_body(fs::read(file)?);
            if let Some(title) = title {
                request = request.with_header("X-Story-Title", title.as_str());
            }
            request
        }
        Commands::Mail { subject, file } => {
            let body = json!({
                "subject": subject,
                "fileName": file_name(file),
                "content": STANDARD.encode(fs::read(file)?),
            });
            Request::new("POST", "/mail")
                .with_header("Content-Type", "application/json")
                .with_body(body.to_string())
        }
        Commands::Reviews { file } => Request::new("PUT", "/reviews")
            .with_header("Content-Type", "text/csv")
            .with_body(fs::read(file)?),
    };

    let request = match &args.client_id {
        Some(id) => request.with_header("X-Client-Id", id.as_str()),
        None => request,
    };

    let timeout = Some(Duration::from_secs(args.timeout.max(1)));
    let response = client::send(&args.server, &request, timeout)?;

    if let Commands::Assignments { out: Some(out), format, .. } = &args.command {
        if !matches!(format, DownloadFormat::Json) && response.status == 200 {
            fs::write(out, &response.body)?;
            println!("Saved {} bytes to {}", response.body.len(), out.display());
            return Ok(0);
        }
    }

    print_response(&response);
    Ok(if response.status < 400 { 0 } else { 1 })
}

fn print_response(response: &ClientResponse) {
    println!("{} {}", response.status, response.reason);
    match response.json() {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", value),
        },
        Err(_) => println!(
            "({} bytes of {})",
            response.body.len(),
            response.header("content-type").unwrap_or("unknown content")
        ),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
