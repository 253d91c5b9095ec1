//! giga: runs a streamed GigaChat conversation from a prompt script or
//! standard input, executing the model's function calls locally.
//!
//! Credentials come from `GIGACHAT_RQ_UID` and `GIGACHAT_AUTH_KEY`. Every
//! failure is fatal and mapped to a distinct exit code.

mod cli;

use std::process::ExitCode;
use std::time::Duration;

use giga_ai::prompts::PromptSource;
use giga_ai::{
    build_http_client, cancellable, GigaChatClient, GigaChatConfig, LinePrompts, OAuthClient,
    OAuthConfig, ScriptedPrompts, SessionDriver, TokenProvider, ToolDispatcher, TrustBundle,
};
use giga_common::{GigaError, SessionId};
use giga_config::schema::PromptMode;
use giga_config::{Credentials, GigaConfig};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_DIRECTIVE: &str = "giga=info";

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let config = giga_config::load_config_with(args.config.as_deref(), |config| {
        args.apply_overrides(config)
    });

    let directive = match config {
        Ok(ref config) => config.logging.level.clone(),
        Err(_) => args
            .log_level
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_DIRECTIVE.to_string()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| directive.as_str().into()),
        )
        .init();

    let result = match config {
        Ok(config) if args.dump_config => {
            println!("{}", giga_config::config_to_json(&config));
            Ok(())
        }
        Ok(config) => run(config).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(config: GigaConfig) -> Result<(), GigaError> {
    info!("giga v{} starting", env!("CARGO_PKG_VERSION"));

    let credentials = Credentials::from_env()?;
    let bundle = TrustBundle::load(&config.tls.ca_files)?;
    let http = build_http_client(
        &bundle,
        Duration::from_secs(config.tls.connect_timeout_secs),
        Duration::from_secs(config.tls.read_timeout_secs),
    )?;

    let cancel = CancellationToken::new();
    let watcher = spawn_cancel_watcher(cancel.clone(), config.run.deadline_secs);

    let result = converse(&config, credentials, http, cancel).await;
    watcher.abort();
    result
}

async fn converse(
    config: &GigaConfig,
    credentials: Credentials,
    http: reqwest::Client,
    cancel: CancellationToken,
) -> Result<(), GigaError> {
    let oauth = OAuthClient::new(
        http.clone(),
        OAuthConfig::new(credentials.rq_uid, credentials.auth_key)
            .with_url(config.auth.url.clone())
            .with_scope(config.auth.scope.clone()),
    );
    let token = cancellable(&cancel, oauth.access_token()).await?;

    let session_id = SessionId::new();
    info!(session = %session_id, model = %config.chat.model, "session started");
    let client = GigaChatClient::new(
        http,
        GigaChatConfig::new(token.token)
            .with_base_url(config.chat.base_url.clone())
            .with_session_id(session_id),
    );

    let mut prompts: Box<dyn PromptSource> = match config.prompts.mode {
        PromptMode::Scripted => Box::new(ScriptedPrompts::new(config.prompts.resolve_script()?)),
        PromptMode::Interactive => Box::new(LinePrompts::stdin()),
    };

    let mut driver = SessionDriver::new(config.chat.model, config.chat.system_prompt.clone())
        .with_tools(ToolDispatcher::builtin())
        .with_cancellation(cancel);
    if let Some(max) = config.chat.max_tool_rounds {
        driver = driver.with_max_tool_rounds(max);
    }

    let summary = driver.run(&client, prompts.as_mut()).await?;
    info!(
        prompts = summary.prompts,
        turns = summary.turns,
        tool_calls = summary.tool_calls,
        history = summary.history_len,
        "run complete"
    );
    Ok(())
}

/// Cancel the run on Ctrl-C or when the deadline passes (0 = no deadline).
fn spawn_cancel_watcher(cancel: CancellationToken, deadline_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let deadline = async {
            if deadline_secs == 0 {
                std::future::pending::<()>().await;
            } else {
                tokio::time::sleep(Duration::from_secs(deadline_secs)).await;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => warn!("interrupted, cancelling run"),
            _ = deadline => warn!(deadline_secs, "run deadline reached, cancelling"),
        }
        cancel.cancel();
    })
}
