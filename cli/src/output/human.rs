//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;
use sitehost_common::{ApplicationStatus, ObjectState, SiteUrls};

use crate::domain::SitehostConfig;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    pub fn render_created(&self, application: &str, urls: &SiteUrls) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.success(&format!("Application '{application}' created"));
        self.ctx.kv("Service:", &self.url(&urls.service_url));
        self.ctx.kv("Site:   ", &self.url(&urls.site_url));
    }

    pub fn render_deleted(&self, application: &str) {
        self.ctx
            .success(&format!("Application '{application}' removed"));
    }

    pub fn render_developer_site(&self, application: &str, url: Option<&str>) {
        match url {
            Some(url) => {
                self.ctx
                    .success(&format!("Developer site for '{application}' created"));
                self.ctx.kv("Site:", &self.url(url));
            }
            None => self
                .ctx
                .info(&format!("Developer site for '{application}' already exists")),
        }
    }

    pub fn render_web_root(&self, application: &str, relative: &str, changed: bool) {
        if changed {
            self.ctx.success(&format!(
                "Developer web root of '{application}' set to wwwroot/{relative}"
            ));
        } else {
            self.ctx
                .warn(&format!("'{application}' has no developer site; nothing changed"));
        }
    }

    /// Render the sites of one application and the shared pool.
    pub fn render_status(&self, status: &ApplicationStatus) {
        if self.ctx.quiet {
            return;
        }
        if !status.exists() {
            self.ctx
                .info(&format!("No sites registered for '{}'", status.application));
        } else {
            self.ctx.header(&format!("Application {}", status.application));
            for site in &status.sites {
                println!(
                    "  {:<8} {:<32} {:>5}  {}  {}",
                    site.role.as_str(),
                    site.name,
                    site.port,
                    self.state(site.state),
                    self.url(&site.url),
                );
                println!(
                    "  {:<8} {}",
                    "",
                    site.physical_path.display().style(self.ctx.styles.dim)
                );
            }
        }
        println!();
        match &status.pool {
            Some(pool) => self
                .ctx
                .kv("Pool:", &format!("{} ({})", pool.name(), self.state(pool.state))),
            None => self.ctx.kv("Pool:", "not created"),
        }
    }

    pub fn render_config(&self, config: &SitehostConfig, path: &Path) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.header("Configuration");
        self.ctx.kv("File:", &path.display().to_string());
        let root = config
            .sites
            .root
            .as_ref()
            .map_or_else(|| "~/.sitehost (default)".to_string(), |p| p.display().to_string());
        self.ctx.kv("sites.root:               ", &root);
        self.ctx
            .kv("ports.min:                ", &config.ports.min.to_string());
        self.ctx
            .kv("ports.max:                ", &config.ports.max.to_string());
        self.ctx.kv(
            "ports.max_attempts:       ",
            &config.ports.max_attempts.to_string(),
        );
        self.ctx.kv(
            "timeouts.pool_state_secs: ",
            &config.timeouts.pool_state_secs.to_string(),
        );
        self.ctx.kv(
            "timeouts.settle_secs:     ",
            &config.timeouts.settle_secs.to_string(),
        );
        self.ctx.kv(
            "timeouts.poll_interval_ms:",
            &config.timeouts.poll_interval_ms.to_string(),
        );
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("sitehost {version}");
    }

    fn url(&self, url: &str) -> String {
        url.style(self.ctx.styles.url).to_string()
    }

    fn state(&self, state: ObjectState) -> String {
        let style = match state {
            ObjectState::Started => self.ctx.styles.success,
            ObjectState::Starting | ObjectState::Stopping => self.ctx.styles.warning,
            ObjectState::Stopped | ObjectState::Unknown => self.ctx.styles.error,
        };
        state.style(style).to_string()
    }
}
