use anyhow::Result;
use clap::{Parser, Subcommand};
use warden_client::Method;

mod commands;

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Encrypted-payload client for the license admin API", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Admin API base URL
    #[arg(long, env = "WARDEN_API_URL", default_value = warden_client::config::DEFAULT_BASE_URL)]
    api_url: String,

    /// Base64-encoded 32-byte payload key
    #[arg(long, env = "WARDEN_PAYLOAD_KEY", hide_env_values = true)]
    payload_key: Option<String>,

    /// Send request bodies unencrypted (degraded mode)
    #[arg(long)]
    plaintext: bool,

    /// Reject envelope-shaped responses that are not flagged as encrypted
    #[arg(long)]
    strict: bool,

    /// Session cookie to send with requests, e.g. "access_token=..."
    #[arg(long, env = "WARDEN_SESSION_COOKIE", hide_env_values = true)]
    session_cookie: Option<String>,

    /// Logging level
    #[arg(long, env = "WARDEN_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a freshly generated payload key
    Keygen,

    /// Seal a JSON document into an envelope
    Seal {
        /// Input JSON file (use '-' for stdin)
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Output file for the envelope (use '-' for stdout)
        #[arg(short, long, default_value = "-")]
        output: String,
    },

    /// Open an envelope back into JSON
    Open {
        /// Input envelope JSON file (use '-' for stdin)
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Output file for the JSON (use '-' for stdout)
        #[arg(short, long, default_value = "-")]
        output: String,
    },

    /// Send one request to the admin API and print the decoded response
    Request {
        /// HTTP method
        #[arg(value_enum)]
        method: MethodArg,

        /// Request path under the API base URL, starting with /, e.g. /users?page=1
        path: String,

        /// JSON body file (use '-' for stdin)
        #[arg(short, long)]
        body: Option<String>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum MethodArg {
    #[value(name = "GET", alias = "get")]
    Get,
    #[value(name = "POST", alias = "post")]
    Post,
    #[value(name = "PATCH", alias = "patch")]
    Patch,
    #[value(name = "DELETE", alias = "delete")]
    Delete,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Get => Method::GET,
            MethodArg::Post => Method::POST,
            MethodArg::Patch => Method::PATCH,
            MethodArg::Delete => Method::DELETE,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(&cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Warden CLI starting");

    match cli.command {
        Commands::Keygen => commands::keygen::execute()?,
        Commands::Seal { input, output } => {
            commands::seal::execute(cli.payload_key.as_deref(), &input, &output)?;
        }
        Commands::Open { input, output } => {
            commands::open::execute(cli.payload_key.as_deref(), &input, &output)?;
        }
        Commands::Request { method, path, body } => {
            let options = commands::request::Options {
                api_url: &cli.api_url,
                payload_key: cli.payload_key.as_deref(),
                plaintext: cli.plaintext,
                strict: cli.strict,
                session_cookie: cli.session_cookie.as_deref(),
            };
            commands::request::execute(&options, method.into(), &path, body.as_deref()).await?;
        }
    }

    Ok(())
}
