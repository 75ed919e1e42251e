//! Shared application state for HTTP handlers

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::sessions::SessionStore;
use crate::core::Config;
use crate::features::chat::{ChatDriver, CompletionService};
use crate::features::personas::PersonaRegistry;
use crate::features::render::PageRenderer;

/// Services shared by every request
///
/// `driver` is `None` when no API credential is configured; the chat surface
/// is disabled and no session is ever created then.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<PersonaRegistry>,
    pub renderer: Arc<PageRenderer>,
    pub sessions: SessionStore,
    pub driver: Option<ChatDriver>,
}

impl AppState {
    pub fn new(config: Config, completion: Option<Arc<dyn CompletionService>>) -> Result<Self> {
        let driver = completion.map(|service| ChatDriver::new(service, config.openai_model.clone()));
        let sessions = SessionStore::with_limit(config.max_sessions);
        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(PersonaRegistry::new()),
            renderer: Arc::new(PageRenderer::new()?),
            sessions,
            driver,
        })
    }

    pub fn chat_enabled(&self) -> bool {
        self.driver.is_some()
    }

    /// Persona avatars that `/public` would serve but `PUBLIC_DIR` lacks.
    ///
    /// Empty when `AVATAR_BASE_URL` points avatars elsewhere.
    pub fn missing_avatar_files(&self) -> Vec<PathBuf> {
        if self.config.avatar_base_url.is_some() {
            return Vec::new();
        }
        self.registry
            .list()
            .iter()
            .filter_map(|persona| persona.avatar.as_deref())
            .filter_map(|avatar| Path::new(avatar).file_name())
            .map(|file| self.config.public_dir.join(file))
            .filter(|path| !path.is_file())
            .collect()
    }
}
