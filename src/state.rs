use std::sync::Arc;

use crate::auth::{CredentialError, CredentialService};
use crate::config::AppConfig;
use crate::models::{Bootcamp, Course, Review, User};
use crate::services::{Geocoder, LogMailer, Mailer, MapQuestGeocoder};
use crate::store::{DocumentStore, Repository};

/// Shared per-process handles, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub credentials: CredentialService,
    pub geocoder: Arc<dyn Geocoder>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Production collaborators: MapQuest geocoding and log-only mail.
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Result<Self, CredentialError> {
        let credentials = CredentialService::new(&config.security)?;
        let geocoder = Arc::new(MapQuestGeocoder::new(&config.geocoder));
        let mailer = Arc::new(LogMailer::new(&config.mail));
        Ok(Self {
            config: Arc::new(config),
            store,
            credentials,
            geocoder,
            mailer,
        })
    }

    pub fn users(&self) -> Repository<User> {
        Repository::new(self.store.clone())
    }

    pub fn bootcamps(&self) -> Repository<Bootcamp> {
        Repository::new(self.store.clone())
    }

    pub fn courses(&self) -> Repository<Course> {
        Repository::new(self.store.clone())
    }

    pub fn reviews(&self) -> Repository<Review> {
        Repository::new(self.store.clone())
    }
}
