pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod formatters;
pub mod fuzzy;
pub mod mcp;
pub mod models;
pub mod scripts;
pub mod settings;

use anyhow::Result;
use cache::UsageCache;
use cli::{Cli, Commands, GlobalArgs, InstallArgs, OutputFormat};
use client::UsageClient;
use config::Config;
use error::LimitsError;
use is_terminal::IsTerminal;
use models::Usage;
use scripts::Script;
use settings::{Settings, SettingsScope};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

pub async fn run(cli: Cli) -> Result<()> {
    let query = cli.query().map(str::to_owned);
    match cli.command {
        None | Some(Commands::Limits { .. }) => show_limits(&cli.global, query.as_deref()).await,
        Some(Commands::Serve) => serve().await,
        Some(Commands::InstallScript(args)) => run_install_script(&args),
    }
}

async fn show_limits(global: &GlobalArgs, query: Option<&str>) -> Result<()> {
    let color = use_color(global.no_color);
    let usage = get_usage_with_cache(Duration::from_secs(global.cache)).await?;

    if let Some(query) = query {
        let entry = usage.lookup(query)?;
        debug!("Matched {:?} to {}", query, entry.path);
        println!("{}", formatters::format_value(&entry, color));
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            println!("{}", formatters::format_json(&usage)?);
        }
        OutputFormat::Table => {
            let config = Config::load_or_default(global.config.as_deref());
            formatters::print_table(&usage, color, &config.resolved_formats())?;
        }
    }

    Ok(())
}

/// Color only when writing to a terminal and not disabled by flag
fn use_color(no_color: bool) -> bool {
    let color = !no_color && std::io::stdout().is_terminal();
    if !color {
        colored::control::set_override(false);
    }
    color
}

/// Returns cached usage when fresh, otherwise fetches and refreshes the
/// cache. A zero `ttl` bypasses the cache entirely.
pub async fn get_usage_with_cache(ttl: Duration) -> Result<Usage> {
    let cache = UsageCache::new();

    if !ttl.is_zero() {
        match cache.read(ttl) {
            Ok(usage) => {
                debug!("Using cached data from {}", cache.file().display());
                return Ok(usage);
            }
            Err(e) => debug!("Cache miss: {}", e),
        }
    }

    let client = authenticated_client()?;
    let usage = client.get_usage().await?;

    if !ttl.is_zero() {
        if let Err(e) = cache.write(&usage) {
            warn!("Failed to write cache: {}", e);
        }
    }

    Ok(usage)
}

fn authenticated_client() -> Result<UsageClient> {
    let creds = credentials::load(None)?;
    debug!(
        "Using Claude Code credentials (subscription: {})",
        creds.subscription()
    );
    if creds.is_expired() {
        warn!("Access token may be expired; run Claude Code to refresh it");
    }
    Ok(UsageClient::new(creds.access_token)?)
}

async fn serve() -> Result<()> {
    let client = authenticated_client()?;
    info!("Starting MCP server");
    mcp::serve(client).await?;
    Ok(())
}

fn run_install_script(args: &InstallArgs) -> Result<()> {
    if args.list {
        println!("Available scripts:");
        for name in scripts::list() {
            if let Some(script) = scripts::get(name) {
                println!("  {:<12} {}", script.name, script.description);
            }
        }
        return Ok(());
    }

    let (Some(name), Some(path)) = (args.name.as_deref(), args.path.as_deref()) else {
        anyhow::bail!("install-script requires <name> and <path>");
    };
    let script = scripts::get(name).ok_or_else(|| LimitsError::UnknownScript(name.to_string()))?;

    let scope = if args.project {
        SettingsScope::Project
    } else {
        SettingsScope::User
    };
    let settings_path = scope.default_path()?;
    let dest = PathBuf::from(shellexpand::tilde(path).into_owned());

    install_script(script, &dest, &settings_path, scope, args.force)?;
    println!("Installed {} to {}", script.filename, dest.display());
    println!(
        "Configured statusLine in {} settings ({})",
        scope,
        settings_path.display()
    );
    Ok(())
}

/// Writes `script` to `dest` and points the statusLine in `settings_path`
/// at it. Both conflicts are checked before anything is written.
pub fn install_script(
    script: &Script,
    dest: &Path,
    settings_path: &Path,
    scope: SettingsScope,
    force: bool,
) -> error::Result<()> {
    if dest.exists() && !force {
        return Err(LimitsError::FileExists(dest.to_path_buf()));
    }

    let mut settings = Settings::load(settings_path)?;
    if settings.has_status_line() && !force {
        return Err(LimitsError::StatusLineExists {
            scope: scope.to_string(),
            path: settings_path.to_path_buf(),
        });
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, script.content)?;
    set_script_permissions(dest, script.executable)?;
    debug!("Wrote {} to {}", script.name, dest.display());

    settings.set_status_line(&dest.to_string_lossy(), force, scope, settings_path)?;
    settings.save(settings_path)?;
    Ok(())
}

#[cfg(unix)]
fn set_script_permissions(path: &Path, executable: bool) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = if executable { 0o755 } else { 0o644 };
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_script_permissions(_path: &Path, _executable: bool) -> std::io::Result<()> {
    Ok(())
}
