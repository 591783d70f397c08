//! Common test utilities shared across integration tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use warden::{CatalogError, ReleaseChannel, VersionDescriptor, VersionFetcher};

/// A task file exercising all three schedule forms.
pub const SAMPLE_TASKS_YAML: &str = r#"
tasks:
  - name: nightly backup
    server: survival-01
    action: command
    payload: |-
      save-all
      save-off
    schedule:
      at: "04:30"
      days: [5, 1, 3]
  - name: restart sweep
    server: survival-01
    action: restart
    schedule:
      every: 6
      unit: h
  - name: weekend opening
    server: creative
    action: start
    schedule: "0 9 * * 6,0"
"#;

/// Build a version descriptor with a fixed detail URL.
pub fn descriptor(id: &str, channel: ReleaseChannel) -> VersionDescriptor {
    VersionDescriptor {
        id: id.to_string(),
        channel,
        url: format!("https://example.invalid/{}.json", id),
        release_time: None,
    }
}

/// Fetcher that serves a fixed version list and counts calls.
pub struct StaticFetcher {
    calls: AtomicU32,
    versions: Vec<VersionDescriptor>,
}

impl StaticFetcher {
    pub fn new(versions: Vec<VersionDescriptor>) -> Self {
        Self {
            calls: AtomicU32::new(0),
            versions,
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionFetcher for StaticFetcher {
    async fn fetch(&self) -> Result<Vec<VersionDescriptor>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.versions.clone())
    }
}
