use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

pub use axum::Router;
use axum::{
    extract::{Query, State},
    http::{header, Uri},
    routing::get,
    Json,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const SHORT_DOMAIN: &str = "http://bit.ly/";

const CREATED_BY: &str = "mockuser";

/// Render a Bitly v3 JSON envelope.
pub fn envelope(data: Value, status_code: u16, status_txt: &str) -> Value {
    json!({
        "data": data,
        "status_code": status_code,
        "status_txt": status_txt,
    })
}

// ---------------------------------------------------------------------------
// Canned responses
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    /// All values sent for `name`, in order.
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

pub type RequestLog = Arc<RwLock<Vec<RecordedRequest>>>;

/// Router answering each `(path, body)` route with the bytes of `body`
/// verbatim and recording every request it serves. Unregistered paths get
/// axum's 404.
pub fn canned<I, P, B>(routes: I) -> (Router, RequestLog)
where
    I: IntoIterator<Item = (P, B)>,
    P: AsRef<str>,
    B: Into<Vec<u8>>,
{
    let log = RequestLog::default();
    let mut router = Router::new();
    for (path, body) in routes {
        let body: Arc<[u8]> = Arc::from(body.into());
        let log = Arc::clone(&log);
        router = router.route(
            path.as_ref(),
            get(move |uri: Uri, Query(query): Query<Vec<(String, String)>>| {
                let body = Arc::clone(&body);
                let log = Arc::clone(&log);
                async move {
                    info!(path = uri.path(), "canned response");
                    log.write().await.push(RecordedRequest {
                        path: uri.path().to_string(),
                        query,
                    });
                    ([(header::CONTENT_TYPE, "application/json")], body.to_vec())
                }
            }),
        );
    }
    (router, log)
}

// ---------------------------------------------------------------------------
// Stateful simulator
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct StoredLink {
    pub hash: String,
    pub long_url: String,
    pub title: Option<String>,
    pub created_at: i64,
}

impl StoredLink {
    pub fn short_url(&self) -> String {
        format!("{SHORT_DOMAIN}{}", self.hash)
    }
}

#[derive(Debug, Default)]
pub struct Store {
    by_hash: HashMap<String, StoredLink>,
    by_long_url: HashMap<String, String>,
}

impl Store {
    /// Hash for `long_url`, minting one if needed. The flag is true when new.
    pub fn shorten(&mut self, long_url: &str) -> (StoredLink, bool) {
        if let Some(link) = self
            .by_long_url
            .get(long_url)
            .and_then(|hash| self.by_hash.get(hash))
        {
            return (link.clone(), false);
        }

        let hash = loop {
            let candidate = Uuid::new_v4().simple().to_string()[..6].to_string();
            if !self.by_hash.contains_key(&candidate) {
                break candidate;
            }
        };
        let link = StoredLink {
            hash: hash.clone(),
            long_url: long_url.to_string(),
            title: None,
            created_at: now(),
        };
        self.by_long_url.insert(long_url.to_string(), hash.clone());
        self.by_hash.insert(hash, link.clone());
        (link, true)
    }

    pub fn get(&self, hash: &str) -> Option<&StoredLink> {
        self.by_hash.get(hash)
    }

    pub fn find_long_url(&self, long_url: &str) -> Option<&StoredLink> {
        self.by_long_url.get(long_url).and_then(|hash| self.get(hash))
    }

    pub fn set_title(&mut self, hash: &str, title: &str) -> bool {
        match self.by_hash.get_mut(hash) {
            Some(link) => {
                link.title = Some(title.to_string());
                true
            }
            None => false,
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    access_token: Arc<str>,
    db: Db,
}

/// Simulator of the link endpoints backed by an in-memory store. Requests
/// must carry `access_token`.
pub fn app(access_token: &str) -> Router {
    app_with_store(access_token, Db::default())
}

/// Like `app`, sharing `db` so callers can seed or inspect links.
pub fn app_with_store(access_token: &str, db: Db) -> Router {
    let state = AppState {
        access_token: Arc::from(access_token),
        db,
    };
    Router::new()
        .route("/shorten", get(shorten))
        .route("/expand", get(expand))
        .route("/info", get(link_info))
        .route("/link/lookup", get(lookup))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

pub async fn run(listener: TcpListener, access_token: &str) -> Result<(), std::io::Error> {
    serve(listener, app(access_token)).await
}

type Args = Query<Vec<(String, String)>>;

fn values<'a>(args: &'a [(String, String)], name: &str) -> Vec<&'a str> {
    args.iter()
        .filter(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .collect()
}

fn authorize(state: &AppState, args: &[(String, String)]) -> Result<(), Json<Value>> {
    if values(args, "access_token").first().copied() == Some(&*state.access_token) {
        Ok(())
    } else {
        Err(failure("INVALID_ACCESS_TOKEN"))
    }
}

fn failure(status_txt: &str) -> Json<Value> {
    Json(envelope(Value::Null, 500, status_txt))
}

fn success(data: Value) -> Json<Value> {
    Json(envelope(data, 200, "OK"))
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

async fn shorten(State(state): State<AppState>, Query(args): Args) -> Json<Value> {
    if let Err(denied) = authorize(&state, &args) {
        return denied;
    }
    let Some(long_url) = values(&args, "longUrl").first().copied() else {
        return failure("MISSING_ARG_LONGURL");
    };
    if !(long_url.starts_with("http://") || long_url.starts_with("https://")) {
        return failure("INVALID_URI");
    }

    let (link, new) = state.db.write().await.shorten(long_url);
    info!(long_url, hash = %link.hash, new, "shorten");
    success(json!({
        "long_url": link.long_url,
        "url": link.short_url(),
        "hash": link.hash,
        "global_hash": link.hash,
        "new_hash": u8::from(new),
    }))
}

/// Resolve `shortUrl` and `hash` arguments to `(requested key, value, hash)`.
fn requested_hashes(args: &[(String, String)]) -> Vec<(&'static str, &str, &str)> {
    let short_urls = values(args, "shortUrl")
        .into_iter()
        .map(|u| ("short_url", u, u.strip_prefix(SHORT_DOMAIN).unwrap_or(u)));
    let hashes = values(args, "hash").into_iter().map(|h| ("hash", h, h));
    short_urls.chain(hashes).collect()
}

async fn expand(State(state): State<AppState>, Query(args): Args) -> Json<Value> {
    if let Err(denied) = authorize(&state, &args) {
        return denied;
    }
    let requested = requested_hashes(&args);
    if requested.is_empty() {
        return failure("MISSING_ARG_SHORTURL_OR_HASH");
    }

    let db = state.db.read().await;
    let items: Vec<Value> = requested
        .into_iter()
        .map(|(key, value, hash)| match db.get(hash) {
            Some(link) => json!({
                key: value,
                "long_url": link.long_url,
                "global_hash": link.hash,
                "user_hash": link.hash,
            }),
            None => json!({ key: value, "error": "NOT_FOUND" }),
        })
        .collect();
    info!(count = items.len(), "expand");
    success(json!({ "expand": items }))
}

async fn link_info(State(state): State<AppState>, Query(args): Args) -> Json<Value> {
    if let Err(denied) = authorize(&state, &args) {
        return denied;
    }
    let requested = requested_hashes(&args);
    if requested.is_empty() {
        return failure("MISSING_ARG_SHORTURL_OR_HASH");
    }

    let db = state.db.read().await;
    let items: Vec<Value> = requested
        .into_iter()
        .map(|(key, value, hash)| match db.get(hash) {
            Some(link) => json!({
                key: value,
                "global_hash": link.hash,
                "user_hash": link.hash,
                "title": link.title,
                "created_at": link.created_at,
                "created_by": CREATED_BY,
            }),
            None => json!({ key: value, "error": "NOT_FOUND" }),
        })
        .collect();
    info!(count = items.len(), "info");
    success(json!({ "info": items }))
}

async fn lookup(State(state): State<AppState>, Query(args): Args) -> Json<Value> {
    if let Err(denied) = authorize(&state, &args) {
        return denied;
    }
    let urls = values(&args, "url");
    if urls.is_empty() {
        return failure("MISSING_ARG_URL");
    }

    let db = state.db.read().await;
    let items: Vec<Value> = urls
        .into_iter()
        .map(|url| match db.find_long_url(url) {
            Some(link) => json!({ "url": url, "aggregate_link": link.short_url() }),
            None => json!({ "url": url, "error": "NOT_FOUND" }),
        })
        .collect();
    info!(count = items.len(), "lookup");
    success(json!({ "link_lookup": items }))
}
