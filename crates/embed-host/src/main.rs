//! Embedded player host: entry point.
//!
//! This binary computes the embedding surface for a set of options and prints
//! it, or, with `--simulate`, runs a full session against a simulated remote
//! player and prints the state the session ends up caching.
//!
//! # Usage
//!
//! ```text
//! embed-host [OPTIONS]
//!
//! Options:
//!   --config      <FILE>    TOML file with [host] and [options] tables
//!   --channel     <NAME>    Channel login name
//!   --channel-id  <ID>      Numeric channel id
//!   --video       <ID>      Video id
//!   --collection  <ID>      Collection id
//!   --width       <SIZE>    Surface width (pixels or CSS length)
//!   --height      <SIZE>    Surface height (pixels or CSS length)
//!   --parent      <DOMAIN>  Allowed parent domain (repeatable)
//!   --kind        <KIND>    embed | player [default: embed]
//!   --page-domain <DOMAIN>  Domain of the host page
//!   --referrer    <URL>     URL of the host page
//!   --storage-access        Page supports the storage-access API
//!   --simulate              Run a session against a simulated surface
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable            | Description                    |
//! |---------------------|--------------------------------|
//! | `EMBED_CONFIG`      | Config file path               |
//! | `EMBED_CHANNEL`     | Channel login name             |
//! | `EMBED_VIDEO`       | Video id                       |
//! | `EMBED_KIND`        | Surface kind                   |
//! | `EMBED_PAGE_DOMAIN` | Domain of the host page        |
//!
//! CLI args take precedence over environment variables, which take
//! precedence over the config file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use embed_core::{listener, EmbedEvent};
use embed_host::application::{EmbedEnvironment, EmbedSession};
use embed_host::domain::{Dimension, EmbedOptions, HostConfig};
use embed_host::infrastructure::{
    load_config, FileConfig, IframeBuilder, MemoryDocument, PageWindow, SimulatedSurface,
    SurfaceBuilder, SurfaceKind,
};

/// Element id the simulated page attaches the surface to.
const TARGET_ID: &str = "twitch-embed";

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Embedded player host.
///
/// Prints the embedding surface for the given options, or runs a simulated
/// session with `--simulate`.
#[derive(Debug, Parser)]
#[command(
    name = "embed-host",
    about = "Build and drive an embedded remote player surface",
    version
)]
struct Cli {
    /// Optional TOML config file.  Flags override its values.
    #[arg(long, env = "EMBED_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "EMBED_CHANNEL")]
    channel: Option<String>,

    #[arg(long)]
    channel_id: Option<String>,

    #[arg(long, env = "EMBED_VIDEO")]
    video: Option<String>,

    #[arg(long)]
    collection: Option<String>,

    /// Surface width: a pixel count or any CSS length.
    #[arg(long)]
    width: Option<String>,

    /// Surface height: a pixel count or any CSS length.
    #[arg(long)]
    height: Option<String>,

    /// Domain allowed to embed the surface.  May be given more than once.
    #[arg(long = "parent")]
    parents: Vec<String>,

    /// Surface kind: `embed` (player and chat) or `player`.
    #[arg(long, default_value = "embed", env = "EMBED_KIND")]
    kind: SurfaceKind,

    /// Domain of the host page.
    #[arg(long, env = "EMBED_PAGE_DOMAIN")]
    page_domain: Option<String>,

    /// URL of the host page.
    #[arg(long)]
    referrer: Option<String>,

    /// The host page supports the storage-access API.
    #[arg(long)]
    storage_access: bool,

    /// Run a session against a simulated remote surface.
    #[arg(long)]
    simulate: bool,
}

impl Cli {
    /// Merges the config file (if any) with the flags.
    ///
    /// # Errors
    ///
    /// Returns an error if `--config` names a file that cannot be read or
    /// parsed.
    fn into_settings(self) -> anyhow::Result<(HostConfig, EmbedOptions)> {
        let FileConfig {
            host: mut config,
            mut options,
        } = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config file '{}'", path.display()))?,
            None => FileConfig::default(),
        };

        if let Some(domain) = self.page_domain {
            config.page_domain = Some(domain);
        }
        if let Some(referrer) = self.referrer {
            config.referrer = referrer;
        }
        config.storage_access_api |= self.storage_access;

        options.channel = self.channel.or(options.channel);
        options.channel_id = self.channel_id.or(options.channel_id);
        options.video = self.video.or(options.video);
        options.collection = self.collection.or(options.collection);
        options.width = self.width.as_deref().map(parse_dimension).or(options.width);
        options.height = self.height.as_deref().map(parse_dimension).or(options.height);
        options.parent.extend(self.parents);

        Ok((config, options))
    }
}

fn parse_dimension(raw: &str) -> Dimension {
    raw.parse::<u32>()
        .map(Dimension::Pixels)
        .unwrap_or_else(|_| Dimension::Css(raw.to_string()))
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. `tracing_subscriber` is initialised.  The log level is controlled by
///    the `RUST_LOG` environment variable (e.g., `RUST_LOG=debug`).
/// 2. CLI arguments are parsed and merged with the optional config file.
/// 3. The options are validated.
/// 4. Either the surface is printed, or a simulated session is run.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let kind = cli.kind;
    let simulate = cli.simulate;
    let (config, options) = cli.into_settings()?;
    options.validate().context("invalid embed options")?;

    let builder = IframeBuilder::new(config);
    if simulate {
        run_simulation(builder, kind, options).await
    } else {
        let surface = builder.build(&options, kind);
        println!("{}", serde_json::to_string_pretty(&surface)?);
        Ok(())
    }
}

/// Runs one session against a simulated surface and prints the final cached
/// state.
async fn run_simulation(
    builder: IframeBuilder,
    kind: SurfaceKind,
    options: EmbedOptions,
) -> anyhow::Result<()> {
    let page = Arc::new(PageWindow::new());
    let document = Arc::new(MemoryDocument::new());
    document.insert_element(TARGET_ID);
    let env = EmbedEnvironment::new(page.clone(), document, Arc::new(builder));

    let session = EmbedSession::new(kind, Some(TARGET_ID.into()), options, env)
        .context("failed to create embed session")?;
    for event in EmbedEvent::ALL {
        session.add_event_listener(
            event.as_str(),
            listener(move |params: &Value| info!(%event, %params, "player event")),
        );
    }

    let window = session
        .surface()
        .context("session has no surface after rendering")?
        .content_window;
    let simulator = SimulatedSurface::spawn(Arc::clone(&page), window);

    session.set_volume(0.5);
    session.set_muted(true);
    session.play();
    session.seek(30.0);
    session.pause();

    simulator.stop().await.context("simulated surface task failed")?;
    info!(
        paused = session.is_paused(),
        volume = session.volume(),
        muted = session.muted(),
        "simulation finished"
    );
    println!("{}", serde_json::to_string_pretty(&*session.player_state())?);

    session.destroy();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        // Arrange / Act
        let cli = Cli::parse_from(["embed-host"]);

        // Assert
        assert_eq!(cli.kind, SurfaceKind::Embed);
        assert!(!cli.simulate);
        assert!(cli.parents.is_empty());
    }

    #[test]
    fn test_cli_kind_override() {
        let cli = Cli::parse_from(["embed-host", "--kind", "player"]);
        assert_eq!(cli.kind, SurfaceKind::Player);
    }

    #[test]
    fn test_cli_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["embed-host", "--kind", "video"]).is_err());
    }

    #[test]
    fn test_cli_parent_is_repeatable() {
        let cli = Cli::parse_from(["embed-host", "--parent", "a.com", "--parent", "b.com"]);
        assert_eq!(cli.parents, vec!["a.com", "b.com"]);
    }

    #[test]
    fn test_into_settings_applies_flags() {
        // Arrange
        let cli = Cli::parse_from([
            "embed-host",
            "--video",
            "123",
            "--width",
            "640",
            "--height",
            "100%",
            "--page-domain",
            "example.com",
            "--storage-access",
        ]);

        // Act
        let (config, options) = cli.into_settings().unwrap();

        // Assert
        assert_eq!(config.page_domain.as_deref(), Some("example.com"));
        assert!(config.storage_access_api);
        assert_eq!(options.video.as_deref(), Some("123"));
        assert_eq!(options.width, Some(Dimension::Pixels(640)));
        assert_eq!(options.height, Some(Dimension::Css("100%".to_string())));
    }

    #[test]
    fn test_into_settings_flags_override_config_file() {
        let path = std::env::temp_dir().join(format!("embed-host-cli-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "[host]\nreferrer = \"https://file.example/\"\n[options]\nchannel = \"from-file\"\nparent = \"file.example\"\n",
        )
        .unwrap();
        let cli = Cli::parse_from([
            "embed-host",
            "--config",
            path.to_str().unwrap(),
            "--channel",
            "from-flag",
            "--parent",
            "flag.example",
        ]);

        let (config, options) = cli.into_settings().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.referrer, "https://file.example/");
        assert_eq!(options.channel.as_deref(), Some("from-flag"));
        assert_eq!(options.parent, vec!["file.example", "flag.example"]);
    }

    #[test]
    fn test_into_settings_missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["embed-host", "--config", "/nonexistent/embed-host.toml"]);
        assert!(cli.into_settings().is_err());
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension("480"), Dimension::Pixels(480));
        assert_eq!(parse_dimension("50vw"), Dimension::Css("50vw".to_string()));
    }
}
