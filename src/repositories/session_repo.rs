use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use rand::distributions::Alphanumeric;
use rand::Rng;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use crate::repositories::places_repo::PlacesClient;
use crate::services::discovery_session::DiscoverySession;
use crate::services::restaurant_service::RestaurantService;

pub const SESSION_ID_LEN: usize = 16;

pub type SharedSession = Arc<Mutex<DiscoverySession>>;

/// Discovery sessions held in process memory only.
pub struct SessionRepo {
    sessions: RwLock<HashMap<String, SharedSession>>,
    places: Arc<PlacesClient>,
    restaurants: Arc<RestaurantService>,
    debounce: Duration,
    idle_ttl: time::Duration,
}

impl SessionRepo {
    pub fn new(
        places: Arc<PlacesClient>,
        restaurants: Arc<RestaurantService>,
        debounce: Duration,
        idle_ttl: time::Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            places,
            restaurants,
            debounce,
            idle_ttl,
        }
    }

    pub async fn create_session(&self) -> SharedSession {
        self.evict_idle_sessions().await;

        let session_id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_ID_LEN)
            .map(char::from)
            .collect();
        let session = Arc::new(Mutex::new(DiscoverySession::new(
            session_id.clone(),
            self.places.clone(),
            self.restaurants.clone(),
            self.debounce,
        )));

        self.sessions
            .write()
            .await
            .insert(session_id.clone(), session.clone());
        info!("Created discovery session {}", session_id);
        session
    }

    pub async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Option<SharedSession> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn remove_session(
        &self,
        session_id: &str,
    ) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions idle for longer than the TTL. A session that is busy
    /// serving a request is never idle.
    pub async fn evict_idle_sessions(&self) -> usize {
        let cutoff = OffsetDateTime::now_utc() - self.idle_ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(session) => session.last_active() >= cutoff,
            Err(_) => true,
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} idle discovery sessions", evicted);
        }
        evicted
    }
}
