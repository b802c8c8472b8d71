use anyhow::{Context, Result};
use clap::Parser;
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use newsdesk::api::{ApiClient, ProfileUpdate};
use newsdesk::app::{App, AppEvent};
use newsdesk::config::Config;
use newsdesk::keybindings::KeybindingRegistry;
use newsdesk::menu::tree;
use newsdesk::session::{resolve_token, Session, TokenStore, TOKEN_ENV_VAR};
use newsdesk::ui;
use newsdesk::util::read_password;

/// Get the config directory path (~/.config/newsdesk/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("newsdesk");
    Ok(config_dir)
}

#[derive(Parser, Debug)]
#[command(
    name = "newsdesk",
    about = "Terminal admin console for a news CMS: menu builder, lead news and categories"
)]
struct Args {
    /// Config file (default: ~/.config/newsdesk/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the API base URL from the config
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Sign in (the password is prompted for without echo) and store the token
    #[arg(long, value_name = "EMAIL")]
    login: Option<String>,

    /// Sign out and remove the stored token
    #[arg(long, conflicts_with = "login")]
    logout: bool,

    /// Print the menu as clean JSON and exit
    #[arg(long, conflicts_with_all = ["login", "logout"])]
    export_menu: bool,

    /// Update the signed-in user's profile and exit
    #[arg(long, conflicts_with_all = ["login", "logout", "export_menu"])]
    update_profile: bool,

    /// New display name (with --update-profile)
    #[arg(long, requires = "update_profile")]
    name: Option<String>,

    /// New email address (with --update-profile)
    #[arg(long, value_name = "EMAIL", requires = "update_profile")]
    email: Option<String>,

    /// New profile picture URL (with --update-profile)
    #[arg(long, value_name = "URL", requires = "update_profile")]
    profile_pic: Option<String>,

    /// Also change the password; prompts for it twice (with --update-profile)
    #[arg(long, requires = "update_profile")]
    change_password: bool,
}

impl Args {
    /// Commands that print and exit log to stderr; the TUI logs to a file.
    fn is_interactive(&self) -> bool {
        !self.logout && !self.export_menu && !self.update_profile
    }
}

/// Create the config directory with user-only permissions.
fn prepare_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
        eprintln!("Created config directory: {}", config_dir.display());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(config_dir)
            .context("Failed to read config directory metadata")?
            .permissions();
        perms.set_mode(0o700);
        if let Err(e) = std::fs::set_permissions(config_dir, perms) {
            eprintln!(
                "Warning: could not set {} permissions to 0700: {}",
                config_dir.display(),
                e
            );
        }
    }

    Ok(())
}

/// Log to `newsdesk.log` in the config dir while the TUI owns the terminal,
/// otherwise to stderr.
fn init_tracing(config_dir: &Path, interactive: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if interactive {
        let log_path = config_dir.join("newsdesk.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

/// Read a password off the async runtime's worker threads.
async fn prompt_password(prompt: &'static str) -> Result<SecretString> {
    let password = tokio::task::spawn_blocking(move || read_password(prompt))
        .await
        .context("Password prompt task failed")?
        .context("Failed to read password")?;
    if password.expose_secret().is_empty() {
        anyhow::bail!("Password cannot be empty");
    }
    Ok(password)
}

/// Token from the environment, config or token file, if any.
fn stored_session(config: &Config, store: &TokenStore) -> Result<Option<Session>> {
    let resolved = resolve_token(
        std::env::var(TOKEN_ENV_VAR).ok(),
        config.api_token.as_deref(),
        store,
    )
    .context("Failed to read stored token")?;

    Ok(resolved.map(|(token, source)| {
        tracing::info!(?source, "Using API token");
        Session::new(token)
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    prepare_config_dir(&config_dir)?;
    init_tracing(&config_dir, args.is_interactive())?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(url) = &args.api_url {
        config.api_base_url = url.clone();
    }
    tracing::debug!(?config, "Loaded configuration");

    let client = ApiClient::new(&config.api_base_url, config.request_timeout_secs)
        .context("Failed to create API client")?;
    let store = TokenStore::new(&config_dir);

    // Handle --logout
    if args.logout {
        if let Some(session) = stored_session(&config, &store)? {
            if let Err(e) = client.logout(&session).await {
                tracing::warn!(error = %e, "Logout request failed, clearing local token anyway");
            }
        }
        store.clear().context("Failed to remove stored token")?;
        println!("Signed out.");
        return Ok(());
    }

    // Handle --export-menu
    if args.export_menu {
        let session = stored_session(&config, &store)?;
        let items = client
            .fetch_menu(session.as_ref())
            .await
            .context("Failed to fetch menu")?;
        let json = serde_json::to_string_pretty(&tree::export(&items))
            .context("Failed to serialize menu")?;
        println!("{json}");
        return Ok(());
    }

    // Handle --update-profile
    if args.update_profile {
        let session = stored_session(&config, &store)?
            .context("Not signed in. Run `newsdesk --login EMAIL` first")?;
        let user = client
            .current_user(&session)
            .await
            .context("Failed to load profile")?;

        let mut update = ProfileUpdate::from_user(&user);
        if let Some(name) = &args.name {
            update.name = name.clone();
        }
        if let Some(email) = &args.email {
            update.email = email.clone();
        }
        if let Some(url) = &args.profile_pic {
            update.profile_pic = Some(url.clone());
        }
        if args.change_password {
            let password = prompt_password("New password: ").await?;
            let confirmation = prompt_password("Confirm new password: ").await?;
            update = update.with_password(password, confirmation)?;
        }

        client
            .update_profile(&session, &update)
            .await
            .context("Profile update failed")?;
        if update.changes_password() {
            println!("Profile and password updated.");
        } else {
            println!("Profile updated.");
        }
        return Ok(());
    }

    // Handle --login, otherwise fall back to a stored token
    let session = match &args.login {
        Some(email) => {
            let password = prompt_password("Password: ").await?;
            let session = client
                .login(email, &password)
                .await
                .context("Login failed")?;
            store
                .save(session.token())
                .context("Failed to store API token")?;
            eprintln!("Signed in as {}", session.display_name());
            Some(session)
        }
        None => stored_session(&config, &store)?,
    };

    let mut keybindings = KeybindingRegistry::new();
    let warnings = keybindings.apply_overrides(&config.keybindings);
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    let mut app = App::new(
        &config,
        client,
        session,
        keybindings,
        config_dir.join("menu-export.json"),
    );
    if let Some(first) = warnings.first() {
        app.set_status(format!("Keybinding config: {first}"));
    }

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    if app.has_unsaved_changes() {
        eprintln!("Exited with unsaved changes.");
    }
    Ok(())
}
