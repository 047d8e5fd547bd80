use super::interactive;
use super::print::{print_config, print_counts, print_messages, print_profile, print_shelf};
use super::setup::{Cli, Commands};
use bookshelf::api::{CmdResult, ConfigAction, ShelfApi, ShelfPaths};
use bookshelf::backend::rest::RestBackend;
use bookshelf::config::{SessionCache, ShelfConfig};
use bookshelf::error::{Result, ShelfError};
use bookshelf::model::BookStatus;
use bookshelf::session::{require_user, AuthSession, SessionHandle, User};
use clap::Parser;
use colored::Colorize;
use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const ENV_HOME: &str = "SHELF_HOME";

struct AppContext {
    paths: ShelfPaths,
    config: ShelfConfig,
    cached: Option<SessionCache>,
}

/// A signed-in user plus everything needed to talk to the backend for them.
struct Connection {
    backend: Arc<RestBackend>,
    session: SessionHandle,
    user: User,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = init_context()?;

    match cli.command {
        Some(Commands::Login { email, password }) => handle_login(&ctx, &email, &password).await,
        Some(Commands::Logout) => handle_logout(&ctx).await,
        Some(Commands::Whoami) => handle_whoami(&ctx),
        Some(Commands::List) | None => handle_list(&ctx).await,
        Some(Commands::Move { book, column }) => handle_move(&ctx, &book, column).await,
        Some(Commands::Stats { sync }) => handle_stats(&ctx, sync).await,
        Some(Commands::Profile { user_id }) => handle_profile(&ctx, user_id).await,
        Some(Commands::Interactive) => handle_interactive(&ctx).await,
        Some(Commands::Config { key, value }) => handle_config(&ctx, key, value),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "bookshelf=debug,shelf=debug"
    } else {
        "bookshelf=warn,shelf=warn"
    };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(ENV_HOME) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "bookshelf", "shelf")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            ShelfError::Config(format!(
                "could not determine a config directory; set {}",
                ENV_HOME
            ))
        })
}

fn init_context() -> Result<AppContext> {
    let paths = ShelfPaths::new(config_dir()?);
    debug!(config_dir = %paths.config_dir.display(), "loading configuration");

    let config = ShelfConfig::load(&paths.config_dir)?.with_env_overrides();
    let cached = SessionCache::load(&paths.config_dir)?;

    Ok(AppContext {
        paths,
        config,
        cached,
    })
}

impl AppContext {
    fn rest_backend(&self) -> Result<RestBackend> {
        let (url, key) = self.config.backend_credentials()?;
        RestBackend::new(url, key, Duration::from_secs(self.config.timeout_secs))
    }

    fn session(&self) -> SessionHandle {
        match &self.cached {
            Some(cache) => SessionHandle::signed_in(cache.user.clone()),
            None => SessionHandle::signed_out(),
        }
    }

    /// Check the session first so a signed-out user never reaches the network.
    fn connect(&self) -> Result<Connection> {
        let session = self.session();
        let user = require_user(&session)?;
        let token = self
            .cached
            .as_ref()
            .map(|cache| cache.access_token.clone())
            .ok_or(ShelfError::NotSignedIn)?;

        let backend = Arc::new(self.rest_backend()?.with_access_token(token.clone()));
        let session = session.with_remote(Arc::clone(&backend), token);

        Ok(Connection {
            backend,
            session,
            user,
        })
    }
}

impl Connection {
    /// Fetch the user's shelf. Stops the command when the load failed.
    async fn loaded_api(&self) -> Result<ShelfApi<RestBackend>> {
        let mut api = ShelfApi::from_shared(Arc::clone(&self.backend));
        let result = api.load().await?;
        finish(&result);
        Ok(api)
    }
}

/// Print the messages and exit non-zero if any of them is an error.
fn finish(result: &CmdResult) {
    print_messages(&result.messages);
    if result.has_errors() {
        std::process::exit(1);
    }
}

async fn handle_login(ctx: &AppContext, email: &str, password: &str) -> Result<()> {
    let backend = ctx.rest_backend()?;
    let grant = backend.sign_in_with_password(email, password).await?;

    let name = grant.user.email.clone().unwrap_or_else(|| grant.user.id.clone());
    SessionCache {
        access_token: grant.access_token,
        user: grant.user,
    }
    .save(&ctx.paths.config_dir)?;

    println!("{}", format!("Signed in as {}", name).green());
    Ok(())
}

async fn handle_logout(ctx: &AppContext) -> Result<()> {
    if ctx.cached.is_none() {
        println!("{}", "Not signed in.".dimmed());
        return Ok(());
    }

    match ctx.connect() {
        Ok(conn) => conn.session.sign_out().await?,
        // No backend configured: forgetting the local session is all there is to do.
        Err(e) => debug!(error = %e, "signing out locally only"),
    }
    SessionCache::clear(&ctx.paths.config_dir)?;

    println!("{}", "Signed out.".green());
    Ok(())
}

fn handle_whoami(ctx: &AppContext) -> Result<()> {
    let user = require_user(&ctx.session())?;
    match &user.email {
        Some(email) => println!("{} {}", email.bold(), format!("({})", user.id).dimmed()),
        None => println!("{}", user.id.bold()),
    }
    Ok(())
}

async fn handle_list(ctx: &AppContext) -> Result<()> {
    let conn = ctx.connect()?;
    let api = conn.loaded_api().await?;

    let result = api.list();
    print_shelf(&result.listed_books, result.counts);
    Ok(())
}

async fn handle_move(ctx: &AppContext, book: &str, column: BookStatus) -> Result<()> {
    let conn = ctx.connect()?;
    let mut api = conn.loaded_api().await?;

    let result = api.move_book(&conn.user, book, column).await?;
    finish(&result);
    Ok(())
}

async fn handle_stats(ctx: &AppContext, sync: bool) -> Result<()> {
    let conn = ctx.connect()?;
    let api = conn.loaded_api().await?;

    print_counts(&api.recalculate());
    if sync {
        let result = api.sync_stats(&conn.user).await?;
        finish(&result);
    }
    Ok(())
}

async fn handle_profile(ctx: &AppContext, user_id: Option<String>) -> Result<()> {
    let conn = ctx.connect()?;
    let api = ShelfApi::from_shared(Arc::clone(&conn.backend));
    let user_id = user_id.unwrap_or_else(|| conn.user.id.clone());

    let result = api.profile(Some(&conn.user), &user_id).await?;
    if let Some(view) = &result.profile {
        print_profile(view);
    }
    finish(&result);
    Ok(())
}

async fn handle_interactive(ctx: &AppContext) -> Result<()> {
    let conn = ctx.connect()?;
    let api = conn.loaded_api().await?;

    let signed_out = interactive::run(api, &conn.session, conn.user.clone()).await?;
    if signed_out {
        SessionCache::clear(&ctx.paths.config_dir)?;
    }
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);

    let result = bookshelf::api::config(&ctx.paths, action)?;
    if show_all {
        if let Some(config) = &result.config {
            print_config(config);
        }
    }
    finish(&result);
    Ok(())
}
