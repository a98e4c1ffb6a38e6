use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use razorpay_session::application::adapter::PaymentSessionAdapter;
use razorpay_session::config::AdapterConfig;
use razorpay_session::domain::session::SessionState;
use razorpay_session::domain::signature;
use razorpay_session::interfaces::webhook::{
    SIGNATURE_HEADER, WebhookHeaders, WebhookPayload,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Razorpay API key id
    #[arg(long, env = "RAZORPAY_KEY_ID", global = true)]
    key_id: Option<String>,

    /// Razorpay API key secret
    #[arg(long, env = "RAZORPAY_KEY_SECRET", global = true, hide_env_values = true)]
    key_secret: Option<String>,

    /// Secret used to sign webhook deliveries. Verification is skipped if unset.
    #[arg(long, env = "RAZORPAY_WEBHOOK_SECRET", global = true, hide_env_values = true)]
    webhook_secret: Option<String>,

    /// Override the API base URL (e.g. for a local mock).
    #[arg(long, env = "RAZORPAY_API_BASE_URL", global = true)]
    api_base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the checkout signature for an order/payment pair
    Sign {
        #[arg(long)]
        order_id: String,
        #[arg(long)]
        payment_id: String,
    },
    /// Verify and decode a webhook body, printing the outcome as JSON
    Webhook {
        /// File holding the raw request body
        body: PathBuf,
        /// Value of the x-razorpay-signature header
        #[arg(long)]
        signature: Option<String>,
    },
    /// Ask the gateway for the current status of a session
    Status {
        #[arg(long)]
        order_id: String,
        #[arg(long, requires = "signature")]
        payment_id: Option<String>,
        #[arg(long, requires = "payment_id")]
        signature: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AdapterConfig {
        key_id: cli.key_id,
        key_secret: cli.key_secret,
        webhook_secret: cli.webhook_secret,
        api_base_url: cli.api_base_url,
        ..AdapterConfig::default()
    };

    match cli.command {
        Command::Sign {
            order_id,
            payment_id,
        } => {
            let credentials = config.credentials().into_diagnostic()?;
            let signed = signature::sign_checkout(&credentials.key_secret, &order_id, &payment_id)
                .into_diagnostic()?;
            println!("{signed}");
        }
        Command::Webhook { body, signature } => {
            let adapter = PaymentSessionAdapter::connect(&config).into_diagnostic()?;
            let bytes = std::fs::read(body).into_diagnostic()?;

            let mut headers = WebhookHeaders::new();
            if let Some(signature) = signature {
                headers.insert(SIGNATURE_HEADER.to_string(), signature.as_str().into());
            }

            let outcome = adapter.handle_webhook(&WebhookPayload::Raw(bytes), &headers);
            println!("{}", serde_json::to_string(&outcome).into_diagnostic()?);
        }
        Command::Status {
            order_id,
            payment_id,
            signature,
        } => {
            let adapter = PaymentSessionAdapter::connect(&config).into_diagnostic()?;
            let state = SessionState {
                order_id: Some(order_id),
                payment_id,
                signature,
                ..SessionState::default()
            };
            println!("{}", adapter.get_status(&state).await.as_str());
        }
    }

    Ok(())
}
