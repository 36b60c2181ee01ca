use std::{fs, path::PathBuf};

use tracing::{info, warn};

/// Where the certificate background image comes from. Behind a trait so tests
/// can hand the renderer an in-memory image instead of touching the filesystem.
pub trait TemplateSource {
    fn load(&self) -> Option<Vec<u8>>;
}

pub struct FsTemplate {
    path: PathBuf,
}

impl FsTemplate {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TemplateSource for FsTemplate {
    fn load(&self) -> Option<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                info!("Loaded certificate template from {}", self.path.display());
                Some(bytes)
            }
            Err(e) => {
                warn!(
                    "Certificate template not readable at {}: {e}",
                    self.path.display()
                );
                None
            }
        }
    }
}

pub struct InMemoryTemplate(pub Vec<u8>);

impl TemplateSource for InMemoryTemplate {
    fn load(&self) -> Option<Vec<u8>> {
        Some(self.0.clone())
    }
}
