//! Tanzania Social Analyzer CLI.
//!
//! This is the entry point for the `tzsocial` binary.

mod render;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tanzania_social_auth::{
    FirebaseAuthClient, FirebaseConfig, FirebaseSession, SessionProvider, StaticSession,
    DEFAULT_IDENTITY_URL, DEFAULT_SECURE_TOKEN_URL,
};
use tanzania_social_gateway::{
    Dashboard, FirestoreConfig, FirestoreHistory, FunctionsConfig, HistoryStore, NoopHistory,
    RequestGateway, DEFAULT_FIRESTORE_URL, DEFAULT_REGION,
};

/// Tanzania Social Analyzer - search, analyze and get recommendations for
/// social content.
#[derive(Parser, Debug)]
#[command(name = "tzsocial")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Web API key.
    #[arg(long, env = "FIREBASE_API_KEY", default_value = "")]
    api_key: String,

    /// Auth domain.
    #[arg(long, env = "FIREBASE_AUTH_DOMAIN", default_value = "")]
    auth_domain: String,

    /// Project ID.
    #[arg(long, env = "GCP_PROJECT_ID", default_value = "")]
    project_id: String,

    /// Storage bucket.
    #[arg(long, env = "GCP_STORAGE_BUCKET", default_value = "")]
    storage_bucket: String,

    /// Messaging sender ID.
    #[arg(long, env = "FIREBASE_MESSAGING_SENDER_ID", default_value = "")]
    messaging_sender_id: String,

    /// App ID.
    #[arg(long, env = "FIREBASE_APP_ID", default_value = "")]
    app_id: String,

    /// Region the cloud functions are deployed to.
    #[arg(long, env = "GCP_REGION", default_value = DEFAULT_REGION)]
    region: String,

    /// Cloud functions base URL (emulator).
    #[arg(long, env = "TZSOCIAL_FUNCTIONS_URL")]
    functions_url: Option<String>,

    /// Identity Toolkit base URL (emulator).
    #[arg(long, env = "TZSOCIAL_IDENTITY_URL", default_value = DEFAULT_IDENTITY_URL)]
    identity_url: String,

    /// Secure Token base URL (emulator).
    #[arg(long, env = "TZSOCIAL_SECURE_TOKEN_URL", default_value = DEFAULT_SECURE_TOKEN_URL)]
    secure_token_url: String,

    /// Firestore base URL (emulator).
    #[arg(long, env = "TZSOCIAL_FIRESTORE_URL", default_value = DEFAULT_FIRESTORE_URL)]
    firestore_url: String,

    /// ID token minted elsewhere.
    #[arg(long, env = "TZSOCIAL_ID_TOKEN", hide_env_values = true)]
    id_token: Option<String>,

    /// Refresh token from an earlier sign-in.
    #[arg(long, env = "TZSOCIAL_REFRESH_TOKEN", hide_env_values = true)]
    refresh_token: Option<String>,

    /// Email for password sign-in.
    #[arg(long, env = "TZSOCIAL_EMAIL", requires = "password")]
    email: Option<String>,

    /// Password for password sign-in.
    #[arg(long, env = "TZSOCIAL_PASSWORD", hide_env_values = true, requires = "email")]
    password: Option<String>,

    /// Do not read or write search history.
    #[arg(long, default_value = "false")]
    no_history: bool,

    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search social content.
    Search {
        /// Free-text query.
        query: String,
    },
    /// Analyze a social-media post.
    Analyze {
        /// Link to the post.
        url: String,
    },
    /// Show content recommendations.
    Recommendations,
    /// Show recent searches.
    History,
}

impl Args {
    fn firebase_config(&self) -> FirebaseConfig {
        FirebaseConfig {
            api_key: self.api_key.clone(),
            auth_domain: self.auth_domain.clone(),
            project_id: self.project_id.clone(),
            storage_bucket: self.storage_bucket.clone(),
            messaging_sender_id: self.messaging_sender_id.clone(),
            app_id: self.app_id.clone(),
            identity_base_url: self.identity_url.clone(),
            secure_token_base_url: self.secure_token_url.clone(),
        }
    }

    fn functions_config(&self) -> FunctionsConfig {
        let config = FunctionsConfig::new(&self.region, &self.project_id);
        match &self.functions_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }

    fn firestore_config(&self) -> FirestoreConfig {
        FirestoreConfig {
            base_url: self.firestore_url.clone(),
            ..FirestoreConfig::new(&self.project_id)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.debug {
        EnvFilter::new(
            "tzsocial=debug,tanzania_social_gateway=debug,tanzania_social_auth=debug,warn",
        )
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let session = open_session(&args).await?;

    let gateway = RequestGateway::new(args.functions_config(), Arc::clone(&session));
    let history: Arc<dyn HistoryStore> = if args.no_history {
        Arc::new(NoopHistory::new())
    } else {
        Arc::new(FirestoreHistory::new(args.firestore_config(), session))
    };
    let dashboard = Dashboard::new(gateway, history);

    let output = match &args.command {
        Command::Search { query } => dashboard
            .search(query)
            .await
            .map(|results| render::search_results(&results)),
        Command::Analyze { url } => dashboard
            .analyze(url)
            .await
            .map(|analysis| render::analysis(&analysis)),
        Command::Recommendations => dashboard
            .recommendations()
            .await
            .map(|recs| render::recommendations(&recs)),
        Command::History => dashboard
            .history()
            .await
            .map(|queries| render::history(&queries)),
    };

    match output {
        Ok(text) => {
            println!("{text}");
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            anyhow::bail!(render::error_message(&e))
        }
    }
}

/// Build the session from whichever credential was supplied.
///
/// With no credential at all the session is signed out and every command
/// reports that sign-in is required.
async fn open_session(args: &Args) -> anyhow::Result<Arc<dyn SessionProvider>> {
    if let Some(token) = &args.id_token {
        let session = StaticSession::from_id_token(token.as_str())
            .context("Failed to read the supplied ID token")?;
        return Ok(Arc::new(session));
    }

    let session = FirebaseSession::new(FirebaseAuthClient::new(args.firebase_config()));

    if let Some(refresh_token) = &args.refresh_token {
        let user = session
            .restore(refresh_token)
            .await
            .context("Failed to restore session")?;
        tracing::debug!(user_id = %user, "Session restored");
    } else if let (Some(email), Some(password)) = (&args.email, &args.password) {
        let user = session
            .sign_in_with_password(email, password)
            .await
            .context("Sign-in failed")?;
        tracing::debug!(user_id = %user, "Signed in");
    }

    Ok(Arc::new(session))
}
