use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::models::{Project, User};

/// Fixture bundled into the binary, used when no fixture path is configured.
pub const BUNDLED_FIXTURE: &str = include_str!("../../data/projects.json");

/// Stand-in for a backend: serves the fixture and a fake session after a delay.
pub struct FixtureSource {
    fixture_path: Option<PathBuf>,
    load_delay: Duration,
    auth_delay: Duration,
    auto_sign_in: bool,
    demo_user: String,
}

impl FixtureSource {
    pub fn new(config: &Config) -> Self {
        Self {
            fixture_path: config.fixture_path.clone(),
            load_delay: Duration::from_millis(config.load_delay_ms),
            auth_delay: Duration::from_millis(config.auth_delay_ms),
            auto_sign_in: config.auto_sign_in,
            demo_user: config.demo_user.clone(),
        }
    }

    /// Fetch every project. Query logic happens client side, so this takes no parameters.
    pub async fn fetch_projects(&self) -> Result<Vec<Project>> {
        tokio::time::sleep(self.load_delay).await;

        let raw = match &self.fixture_path {
            Some(path) => {
                debug!(path = %path.display(), "reading project fixture");
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| DashboardError::FixtureIo {
                        path: path.clone(),
                        source,
                    })?
            }
            None => BUNDLED_FIXTURE.to_string(),
        };

        let projects = parse_projects(&raw)?;
        info!(count = projects.len(), "projects loaded");
        Ok(projects)
    }

    /// Session lookup. There is no credential check behind this.
    pub async fn logged_in_user(&self) -> Option<User> {
        tokio::time::sleep(self.auth_delay).await;

        if self.auto_sign_in {
            Some(User::new(self.demo_user.clone()))
        } else {
            None
        }
    }
}

/// Decode a fixture and drop records whose id was already seen.
pub fn parse_projects(raw: &str) -> Result<Vec<Project>> {
    let records: Vec<Project> = serde_json::from_str(raw)?;

    let mut seen = HashSet::with_capacity(records.len());
    let mut projects = Vec::with_capacity(records.len());
    for project in records {
        if !seen.insert(project.id.clone()) {
            warn!(id = %project.id, "duplicate project id in fixture, keeping the first record");
            continue;
        }
        if !project.has_valid_coordinates() {
            warn!(
                id = %project.id,
                latitude = project.latitude,
                longitude = project.longitude,
                "project coordinates out of range, it will not be plotted"
            );
        }
        projects.push(project);
    }

    Ok(projects)
}

/// Initialize the data source from configuration
pub fn init(config: &Config) -> FixtureSource {
    FixtureSource::new(config)
}
