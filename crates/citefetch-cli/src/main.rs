use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use citefetch_core::agent::{self, CitationRow, PageAgent};
use citefetch_core::cache::{CitationCache, DEFAULT_TTL};
use citefetch_core::config_file::load_config;
use citefetch_core::protocol;
use citefetch_core::service::CitationService;
use citefetch_scholar::{ScholarClient, extract_citation_count};

mod output;

use output::ColorMode;

/// arXiv citation counter - look up Google Scholar citation counts for arXiv papers
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up the citation count for an arXiv abstract page
    Count {
        /// arXiv abstract URL or bare identifier (e.g. 1706.03762)
        page: String,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Path to output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Cache TTL in seconds
        #[arg(long)]
        ttl: Option<u64>,

        /// Override the browser-like User-Agent sent to Scholar
        #[arg(long)]
        user_agent: Option<String>,
    },

    /// Extract a citation count from a saved Scholar results page
    Parse {
        /// Path to an HTML file
        file: PathBuf,
    },

    /// Answer fetchCitations requests as JSON lines on stdin/stdout
    Serve {
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Cache TTL in seconds
        #[arg(long)]
        ttl: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Diagnostics go to stderr so stdout stays clean for `serve` replies
    // and redirected output.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Count {
            page,
            no_color,
            output,
            timeout,
            ttl,
            user_agent,
        } => count(page, no_color, output, timeout, ttl, user_agent).await,
        Command::Parse { file } => parse(file),
        Command::Serve { timeout, ttl } => serve(timeout, ttl).await,
    }
}

/// Resolved settings: CLI flags > env vars > config file > defaults.
struct Settings {
    ttl: Duration,
    timeout: Duration,
    max_body_bytes: Option<usize>,
    user_agent: Option<String>,
    scholar_base: Option<String>,
}

fn resolve_settings(
    ttl_flag: Option<u64>,
    timeout_flag: Option<u64>,
    user_agent_flag: Option<String>,
) -> Settings {
    let file = load_config();
    let fetch = file.fetch.unwrap_or_default();

    let env_u64 = |name: &str| -> Option<u64> {
        std::env::var(name).ok().and_then(|v| v.parse().ok())
    };

    let ttl_secs = ttl_flag
        .or_else(|| env_u64("CITEFETCH_TTL"))
        .or(fetch.ttl_secs)
        .unwrap_or(DEFAULT_TTL.as_secs());
    let timeout_secs = timeout_flag
        .or_else(|| env_u64("CITEFETCH_TIMEOUT"))
        .or(fetch.timeout_secs)
        .unwrap_or(10);
    let user_agent = user_agent_flag
        .or_else(|| std::env::var("CITEFETCH_USER_AGENT").ok())
        .or(fetch.user_agent);

    Settings {
        ttl: Duration::from_secs(ttl_secs),
        timeout: Duration::from_secs(timeout_secs),
        max_body_bytes: fetch.max_body_bytes,
        user_agent,
        scholar_base: file.scholar.and_then(|s| s.base_url),
    }
}

fn build_service(settings: &Settings) -> CitationService {
    let mut client = ScholarClient::new().with_timeout(settings.timeout);
    if let Some(ua) = &settings.user_agent {
        client = client.with_user_agent(ua.clone());
    }
    if let Some(max) = settings.max_body_bytes {
        client = client.with_max_body_bytes(max);
    }

    let cache = Arc::new(CitationCache::new(settings.ttl));
    let mut service = CitationService::new(Arc::new(client), cache);
    if let Some(base) = &settings.scholar_base {
        service = service.with_scholar_base(base.clone());
    }
    service
}

/// Accept a full abstract URL or a bare arXiv id like `1706.03762`.
fn abstract_url(page: &str) -> String {
    if page.starts_with("http://") || page.starts_with("https://") {
        page.to_string()
    } else {
        format!("https://arxiv.org/abs/{}", page.trim())
    }
}

async fn count(
    page: String,
    no_color: bool,
    output: Option<PathBuf>,
    timeout: Option<u64>,
    ttl: Option<u64>,
    user_agent: Option<String>,
) -> anyhow::Result<()> {
    let settings = resolve_settings(ttl, timeout, user_agent);
    let service = build_service(&settings);
    let page_url = abstract_url(&page);

    let use_color = !no_color && output.is_none();
    let color = ColorMode(use_color);

    let mut writer: Box<dyn Write> = if let Some(ref output_path) = output {
        Box::new(std::fs::File::create(output_path)?)
    } else {
        Box::new(std::io::stdout())
    };

    // The loading placeholder: a spinner on a tty, nothing when writing to
    // a file.
    let spinner = if use_color {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template("{spinner} {msg}").expect("static template"));
        pb.set_message(CitationRow::loading().to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let http = reqwest::Client::new();
    let html = agent::fetch_abstract_page(&http, &page_url, settings.timeout).await?;

    let mut page_agent = PageAgent::new(&service);
    let row = page_agent.run(&page_url, &html).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match row {
        Some(row) => {
            output::print_citation_row(&mut writer, &row, color)?;
            Ok(())
        }
        None => anyhow::bail!("{} did not produce a citation row", page_url),
    }
}

fn parse(file: PathBuf) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(&file)?;
    let count = extract_citation_count(&html);
    println!("{}", count);
    Ok(())
}

async fn serve(timeout: Option<u64>, ttl: Option<u64>) -> anyhow::Result<()> {
    let settings = resolve_settings(ttl, timeout, None);
    let service = build_service(&settings);

    tracing::info!(
        ttl_secs = settings.ttl.as_secs(),
        timeout_secs = settings.timeout.as_secs(),
        "serving fetchCitations requests on stdin"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = protocol::handle_line(&service, &line).await;
        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}
