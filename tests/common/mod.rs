#![allow(dead_code)]

use std::collections::HashSet;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use actix_web::{web, App, HttpResponse, HttpServer};
use serde_json::{json, Value};

use helix_quickstart::client::{DirectTransport, GatewayTransport, HelixClient};
use helix_quickstart::config::{Config, TransportKind};
use helix_quickstart::handlers::{configure, AppState};

#[derive(Default)]
struct Store {
    users: Vec<Value>,
    /// (author id, post)
    posts: Vec<(String, Value)>,
    /// (follower id, followed id)
    follows: Vec<(String, String)>,
    /// (post id, vector)
    embeddings: Vec<(String, Vec<f64>)>,
    failing: HashSet<String>,
}

#[derive(Default)]
struct MockState {
    store: Mutex<Store>,
}

/// An in-process stand-in for the HelixDB HTTP endpoint: same routes, same
/// bare-object envelopes, data kept in memory.
pub struct MockHelix {
    pub url: String,
    state: web::Data<MockState>,
}

impl MockHelix {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind mock HelixDB");
        let port = listener.local_addr().unwrap().port();
        let state = web::Data::new(MockState::default());

        let data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/{operation}", web::post().to(handle))
        })
        .workers(1)
        .listen(listener)
        .expect("Failed to start mock HelixDB")
        .run();
        tokio::spawn(server);

        Self {
            url: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// Makes every later call to `operation` answer 500.
    pub fn fail(&self, operation: &str) {
        self.state.store.lock().unwrap().failing.insert(operation.to_string());
    }

    pub fn embedding_count(&self) -> usize {
        self.state.store.lock().unwrap().embeddings.len()
    }

    pub fn client(&self) -> HelixClient<DirectTransport> {
        HelixClient::new(DirectTransport::new(&self.url))
    }

    pub fn config(&self) -> Config {
        Config {
            helix_url: self.url.clone(),
            transport: TransportKind::Sdk,
            ..Config::default()
        }
    }

    /// UI and gateway state backed by this mock.
    pub fn app_state(&self) -> web::Data<AppState> {
        web::Data::new(AppState {
            client: Arc::new(self.client()),
            upstream: Arc::new(DirectTransport::new(&self.url)),
            config: self.config(),
        })
    }

    /// Serves the crate's own routes (gateway and UI) in front of this mock.
    pub async fn spawn_gateway(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind gateway");
        let port = listener.local_addr().unwrap().port();
        let state = self.app_state();

        let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
            .workers(1)
            .listen(listener)
            .expect("Failed to start gateway")
            .run();
        tokio::spawn(server);

        format!("http://127.0.0.1:{}", port)
    }
}

pub fn gateway_client(url: &str) -> HelixClient<GatewayTransport> {
    HelixClient::new(GatewayTransport::new(url))
}

fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm = |v: &[f64]| v.iter().map(|x| x * x).sum::<f64>().sqrt();
    let denom = norm(a) * norm(b);
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

fn users_by_id(store: &Store, ids: Vec<String>) -> Vec<Value> {
    ids.iter()
        .filter_map(|id| store.users.iter().find(|u| u["id"] == id.as_str()).cloned())
        .collect()
}

fn str_field(body: &Value, key: &str) -> String {
    body[key].as_str().unwrap_or_default().to_string()
}

async fn handle(
    path: web::Path<String>,
    body: web::Json<Value>,
    state: web::Data<MockState>,
) -> HttpResponse {
    let operation = path.into_inner();
    let body = body.into_inner();
    let mut store = state.store.lock().unwrap();

    if store.failing.contains(&operation) {
        return HttpResponse::InternalServerError().json(json!({"error": format!("{} is down", operation)}));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let reply = match operation.as_str() {
        "createUser" => {
            let user = json!({
                "id": uuid::Uuid::new_v4().to_string(),
                "name": body["name"],
                "age": body["age"],
                "email": body["email"],
                "created_at": now,
                "updated_at": now,
            });
            store.users.push(user.clone());
            json!({ "user": user })
        }
        "createFollow" => {
            store
                .follows
                .push((str_field(&body, "follower_id"), str_field(&body, "followed_id")));
            json!({})
        }
        "createPost" => {
            let post = json!({
                "id": uuid::Uuid::new_v4().to_string(),
                "content": body["content"],
                "created_at": now,
                "updated_at": now,
            });
            store.posts.push((str_field(&body, "user_id"), post.clone()));
            json!({ "post": post })
        }
        "createPostEmbedding" => {
            let vector: Vec<f64> = serde_json::from_value(body["vector"].clone()).unwrap_or_default();
            store.embeddings.push((str_field(&body, "post_id"), vector.clone()));
            json!({ "embedding": { "vector": vector, "content": body["content"] } })
        }
        "getUsers" => json!({ "users": store.users }),
        "getPosts" => {
            let posts: Vec<Value> = store.posts.iter().map(|(_, p)| p.clone()).collect();
            json!({ "posts": posts })
        }
        "getPostsByUser" => {
            let user_id = str_field(&body, "user_id");
            let posts: Vec<Value> = store
                .posts
                .iter()
                .filter(|(owner, _)| *owner == user_id)
                .map(|(_, p)| p.clone())
                .collect();
            json!({ "posts": posts })
        }
        "getFollowers" => {
            let user_id = str_field(&body, "user_id");
            let ids = store
                .follows
                .iter()
                .filter(|(_, followed)| *followed == user_id)
                .map(|(follower, _)| follower.clone())
                .collect();
            json!({ "followers": users_by_id(&*store, ids) })
        }
        "getFollowing" => {
            let user_id = str_field(&body, "user_id");
            let ids = store
                .follows
                .iter()
                .filter(|(follower, _)| *follower == user_id)
                .map(|(_, followed)| followed.clone())
                .collect();
            json!({ "following": users_by_id(&*store, ids) })
        }
        "searchPostEmbeddings" => {
            let query: Vec<f64> = serde_json::from_value(body["vector"].clone()).unwrap_or_default();
            let k = body["k"].as_u64().unwrap_or(10) as usize;
            let mut scored: Vec<(f64, Value)> = store
                .embeddings
                .iter()
                .filter_map(|(post_id, vector)| {
                    store
                        .posts
                        .iter()
                        .find(|(_, p)| p["id"] == post_id.as_str())
                        .map(|(_, p)| (cosine(&query, vector), p.clone()))
                })
                .collect();
            scored.sort_by(|a, b| b.0.total_cmp(&a.0));
            let posts: Vec<Value> = scored.into_iter().take(k).map(|(_, p)| p).collect();
            json!({ "posts": posts })
        }
        other => return HttpResponse::NotFound().json(json!({"error": format!("unknown query {}", other)})),
    };

    HttpResponse::Ok().json(reply)
}
