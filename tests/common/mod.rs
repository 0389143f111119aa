#![allow(dead_code)]

use async_trait::async_trait;
use axum::ServiceExt;
use axum::extract::Request;
use axum_test::TestServer;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use snaplink::domain::click_event::ClickEvent;
use snaplink::domain::repositories::{ClickRepository, LinkRepository, UserRepository};
use snaplink::prelude::*;
use snaplink::routes::app_router;
use snaplink::workers::click_worker::ClickRecorder;
use snaplink::workers::metadata_worker::{MetadataDispatcher, MetadataJob};

pub const CACHE_TTL: u64 = 120;
pub const RATE_LIMIT: u64 = 5;
pub const RATE_WINDOW: u64 = 60;

fn unavailable() -> AppError {
    AppError::unavailable("Database unavailable", json!({}))
}

/// Cache double with a manual clock, so TTL expiry is driven by [`InMemoryCache::advance`].
#[derive(Default)]
pub struct InMemoryCache {
    now: Mutex<u64>,
    urls: Mutex<HashMap<String, (String, u64)>>,
    clicks: Mutex<HashMap<String, i64>>,
    windows: Mutex<HashMap<String, (u64, u64)>>,
    down: AtomicBool,
}

impl InMemoryCache {
    pub fn advance(&self, seconds: u64) {
        *self.now.lock().unwrap() += seconds;
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn cached_url(&self, code: &str) -> Option<String> {
        let now = *self.now.lock().unwrap();
        self.urls
            .lock()
            .unwrap()
            .get(code)
            .filter(|(_, expires)| *expires > now)
            .map(|(url, _)| url.clone())
    }

    pub fn clicks(&self, code: &str) -> i64 {
        self.clicks.lock().unwrap().get(code).copied().unwrap_or(0)
    }

    pub fn seed_url(&self, code: &str, url: &str) {
        let now = *self.now.lock().unwrap();
        self.urls
            .lock()
            .unwrap()
            .insert(code.to_string(), (url.to_string(), now + CACHE_TTL));
    }

    fn check(&self) -> CacheResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(CacheError::Connection("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheService for InMemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        self.check()?;
        Ok(self.cached_url(short_code))
    }

    async fn set_url(&self, short_code: &str, long_url: &str, ttl_seconds: u64) -> CacheResult<()> {
        self.check()?;
        let now = *self.now.lock().unwrap();
        self.urls
            .lock()
            .unwrap()
            .insert(short_code.to_string(), (long_url.to_string(), now + ttl_seconds));
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.check()?;
        self.urls.lock().unwrap().remove(short_code);
        Ok(())
    }

    async fn increment_clicks(&self, short_code: &str) -> CacheResult<i64> {
        self.check()?;
        let mut clicks = self.clicks.lock().unwrap();
        let count = clicks.entry(short_code.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn rate_window_count(&self, client_key: &str) -> CacheResult<u64> {
        self.check()?;
        let now = *self.now.lock().unwrap();
        Ok(self
            .windows
            .lock()
            .unwrap()
            .get(client_key)
            .filter(|(_, expires)| *expires > now)
            .map(|(count, _)| *count)
            .unwrap_or(0))
    }

    async fn incr_rate_window(&self, client_key: &str, window_seconds: u64) -> CacheResult<u64> {
        self.check()?;
        let now = *self.now.lock().unwrap();
        let mut windows = self.windows.lock().unwrap();
        let entry = windows.entry(client_key.to_string()).or_insert((0, 0));
        if entry.1 <= now {
            entry.0 = 0;
        }
        entry.0 += 1;
        entry.1 = now + window_seconds;
        Ok(entry.0)
    }

    async fn health_check(&self) -> bool {
        !self.down.load(Ordering::SeqCst)
    }
}

/// Store double for links, users and clicks.
#[derive(Default)]
pub struct InMemoryStore {
    links: Mutex<Vec<ShortLink>>,
    users: Mutex<Vec<User>>,
    clicks: Mutex<Vec<Click>>,
    next_id: AtomicI64,
    down: AtomicBool,
}

impl InMemoryStore {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn links(&self) -> Vec<ShortLink> {
        self.links.lock().unwrap().clone()
    }

    pub fn recorded_clicks(&self) -> Vec<Click> {
        self.clicks.lock().unwrap().clone()
    }

    /// Inserts a link directly, bypassing the creation flow.
    pub fn seed_link(&self, code: &str, url: &str, active: bool) -> i64 {
        let id = self.next_id();
        self.links.lock().unwrap().push(ShortLink {
            id,
            short_code: code.to_string(),
            long_url: url.to_string(),
            owner_id: None,
            title: None,
            created_at: Utc::now(),
            is_active: active,
        });
        id
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn check(&self) -> Result<(), AppError> {
        if self.down.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LinkRepository for InMemoryStore {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        self.check()?;
        let mut links = self.links.lock().unwrap();
        if links.iter().any(|l| l.short_code == new_link.short_code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "urls_short_code_key" }),
            ));
        }

        let link = ShortLink {
            id: self.next_id(),
            short_code: new_link.short_code,
            long_url: new_link.long_url,
            owner_id: new_link.owner_id,
            title: None,
            created_at: Utc::now(),
            is_active: true,
        };
        links.push(link.clone());
        Ok(link)
    }

    async fn find_active_by_code(&self, short_code: &str) -> Result<Option<ShortLink>, AppError> {
        self.check()?;
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.short_code == short_code && l.is_active)
            .cloned())
    }

    async fn find_id_by_code(&self, short_code: &str) -> Result<Option<i64>, AppError> {
        self.check()?;
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.short_code == short_code)
            .map(|l| l.id))
    }

    async fn list_by_owner(&self, owner_id: i64, limit: i64) -> Result<Vec<ShortLink>, AppError> {
        self.check()?;
        let mut owned: Vec<ShortLink> = self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.owner_id == Some(owner_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        owned.truncate(limit as usize);
        Ok(owned)
    }

    async fn update_title(&self, id: i64, title: &str) -> Result<(), AppError> {
        self.check()?;
        if let Some(link) = self.links.lock().unwrap().iter_mut().find(|l| l.id == id) {
            link.title = Some(title.to_string());
        }
        Ok(())
    }

    async fn deactivate(&self, short_code: &str) -> Result<bool, AppError> {
        self.check()?;
        let mut links = self.links.lock().unwrap();
        match links
            .iter_mut()
            .find(|l| l.short_code == short_code && l.is_active)
        {
            Some(link) => {
                link.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn health_check(&self) -> bool {
        !self.down.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn get_or_create(&self, username: &str) -> Result<User, AppError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter().find(|u| u.username == username) {
            return Ok(user.clone());
        }

        let user = User {
            id: users.len() as i64 + 1,
            username: username.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ClickRepository for InMemoryStore {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        self.check()?;
        let mut clicks = self.clicks.lock().unwrap();
        let click = Click {
            id: clicks.len() as i64 + 1,
            url_id: new_click.url_id,
            ip: new_click.ip,
            user_agent: new_click.user_agent,
            referer: new_click.referer,
            clicked_at: Utc::now(),
        };
        clicks.push(click.clone());
        Ok(click)
    }
}

/// A fully wired application over in-memory doubles.
pub struct TestApp {
    pub server: TestServer,
    pub cache: Arc<InMemoryCache>,
    pub store: Arc<InMemoryStore>,
    pub click_rx: mpsc::Receiver<ClickEvent>,
    pub metadata_rx: mpsc::Receiver<MetadataJob>,
}

pub fn create_test_state(
    cache: Arc<InMemoryCache>,
    store: Arc<InMemoryStore>,
) -> (AppState, mpsc::Receiver<ClickEvent>, mpsc::Receiver<MetadataJob>) {
    let (click_recorder, click_rx) = ClickRecorder::channel(100);
    let (metadata, metadata_rx) = MetadataDispatcher::channel(100);

    let state = AppState {
        link_service: Arc::new(LinkService::new(
            store.clone(),
            store.clone(),
            cache.clone(),
            metadata,
            CACHE_TTL,
        )),
        redirect_service: Arc::new(RedirectService::new(
            store.clone(),
            cache.clone(),
            click_recorder,
            CACHE_TTL,
        )),
        rate_limiter: Arc::new(RateLimiter::new(cache.clone(), RATE_LIMIT, RATE_WINDOW)),
        links: store,
        cache,
        behind_proxy: true,
    };

    (state, click_rx, metadata_rx)
}

/// Serves the production router over a real socket, so handlers see the peer address.
pub fn test_server(state: AppState) -> TestServer {
    let app = ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(
        app_router(state),
    );
    TestServer::new(app).unwrap()
}

pub fn spawn_app() -> TestApp {
    let cache = Arc::new(InMemoryCache::default());
    let store = Arc::new(InMemoryStore::default());
    let (state, click_rx, metadata_rx) = create_test_state(cache.clone(), store.clone());

    TestApp {
        server: test_server(state),
        cache,
        store,
        click_rx,
        metadata_rx,
    }
}
