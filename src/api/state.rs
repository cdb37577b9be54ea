use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::services::{providers::MetadataProvider, title_search, RatingCollectionManager};

/// Shared application state
///
/// The manager sits behind a mutex so only one mutation runs at a time; each one reads and
/// rewrites the whole collection.
#[derive(Clone)]
pub struct AppState {
    pub ratings: Arc<Mutex<RatingCollectionManager>>,
    pub provider: Arc<dyn MetadataProvider>,
    /// Title → poster path, filled in by metadata lookups; not persisted
    pub posters: Arc<RwLock<HashMap<String, String>>>,
}

impl AppState {
    pub fn new(ratings: RatingCollectionManager, provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            ratings: Arc::new(Mutex::new(ratings)),
            provider,
            posters: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn remember_poster(&self, title: String, poster_path: String) {
        self.posters.write().await.insert(title, poster_path);
    }

    /// Starts one background poster lookup per rated title
    ///
    /// Titles whose lookup fails or has no poster stay without one.
    pub async fn refresh_posters(&self) {
        let titles: BTreeSet<String> = self
            .ratings
            .lock()
            .await
            .ratings()
            .iter()
            .map(|r| r.title.clone())
            .collect();

        tracing::debug!(titles = titles.len(), "Refreshing posters");

        for title in titles {
            let state = self.clone();
            tokio::spawn(async move {
                let poster_path = title_search::lookup_metadata(state.provider.clone(), &title)
                    .await
                    .and_then(|metadata| metadata.poster_path);
                if let Some(poster_path) = poster_path {
                    state.remember_poster(title, poster_path).await;
                }
            });
        }
    }
}
