//! Application context: unified state passed to every command handler.
//!
//! `AppContext` owns the production collaborators (registry, listener probe,
//! filesystem, paths, config store) and the shared pool handle, so command
//! handlers only borrow from it.

use anyhow::Result;

use crate::application::ports::{ConfigStore, ProgressReporter};
use crate::application::services::{PoolHandle, SiteContext};
use crate::domain::{SiteSettings, SitehostConfig};
use crate::infra::config::YamlConfigStore;
use crate::infra::fs::{LocalFs, SitePaths};
use crate::infra::host_registry::FileHostRegistry;
use crate::infra::network::SystemListenerProbe;
use crate::output::reporter::SilentReporter;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `SITEHOST_YES` env vars).
    pub yes: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// When `true`, skip interactive prompts and use defaults.
    pub non_interactive: bool,
    /// Configuration file access.
    pub config_store: YamlConfigStore,
    /// Loaded configuration.
    pub config: SitehostConfig,
    /// Orchestrator settings resolved from `config`.
    pub settings: SiteSettings,
    /// Data root layout.
    pub paths: SitePaths,
    /// Host registry document.
    pub host: FileHostRegistry,
    /// OS listener probe.
    pub listeners: SystemListenerProbe,
    /// Local filesystem.
    pub fs: LocalFs,
    /// The shared pool.
    pub pool: PoolHandle,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or the data root
    /// cannot be determined.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("SITEHOST_YES").is_ok();
        let non_interactive = flags.behaviour.yes || ci_env;

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        let config_store = YamlConfigStore;
        let config = config_store.load()?;
        let settings = SiteSettings::from(&config);
        let paths = SitePaths::from_config(config.sites.root.as_deref())?;
        let host = FileHostRegistry::with_path(paths.registry_file());
        tracing::debug!(root = %paths.root().display(), "data root");

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            mode,
            non_interactive,
            config_store,
            config,
            settings,
            paths,
            host,
            listeners: SystemListenerProbe,
            fs: LocalFs,
            pool: PoolHandle::default(),
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Progress reporter for the current output mode.
    #[must_use]
    pub fn reporter(&self) -> Reporter<'_> {
        match self.mode {
            OutputMode::Human => Reporter::Terminal(TerminalReporter::new(&self.output)),
            OutputMode::Json => Reporter::Silent(SilentReporter),
        }
    }

    /// Collaborators for the site orchestration services.
    #[must_use]
    pub fn sites(&self) -> SiteContext<'_, FileHostRegistry, SystemListenerProbe, SitePaths, LocalFs> {
        SiteContext {
            host: &self.host,
            listeners: &self.listeners,
            paths: &self.paths,
            fs: &self.fs,
            pool: &self.pool,
            settings: &self.settings,
        }
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true` (CI, `--yes` flag, or `SITEHOST_YES`
    /// env), returns `default` immediately without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}

/// Progress reporter for the active output mode.
pub enum Reporter<'a> {
    Terminal(TerminalReporter<'a>),
    Silent(SilentReporter),
}

impl ProgressReporter for Reporter<'_> {
    fn step(&self, message: &str) {
        match self {
            Reporter::Terminal(r) => r.step(message),
            Reporter::Silent(r) => r.step(message),
        }
    }

    fn success(&self, message: &str) {
        match self {
            Reporter::Terminal(r) => r.success(message),
            Reporter::Silent(r) => r.success(message),
        }
    }

    fn warn(&self, message: &str) {
        match self {
            Reporter::Terminal(r) => r.warn(message),
            Reporter::Silent(r) => r.warn(message),
        }
    }
}
