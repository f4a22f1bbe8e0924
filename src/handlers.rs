use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::client::{SocialGraph, Transport};
use crate::config::Config;
use crate::core::errors::ApiError;
use crate::core::helpers::{html_response, redirect};
use crate::notify::Notification;
use crate::templates::{render_page, PageFrame, Tab};
use crate::{follow, gateway, posts, search, static_server, users};

/// Shared, read-only state of every worker.
pub struct AppState {
    /// Backs the UI pages; transport chosen by configuration.
    pub client: Arc<dyn SocialGraph>,
    /// Raw HelixDB access used by the gateway API.
    pub upstream: Arc<dyn Transport>,
    pub config: Config,
}

impl AppState {
    pub fn render(
        &self,
        tab: Tab,
        title: &str,
        notification: Option<&Notification>,
        body: &str,
    ) -> Result<HttpResponse, ApiError> {
        let html = render_page(
            &PageFrame {
                tab,
                title,
                transport: self.client.transport_name(),
                notification,
            },
            body,
        )?;
        Ok(html_response(html))
    }
}

/// UI routes first; the gateway's `/{operation}` pattern would shadow them
/// otherwise.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(gateway::health))
        .route("/static/{file:.*}", web::get().to(static_server::serve_static))
        .route("/users/new", web::get().to(users::new_user_page))
        .service(
            web::resource("/users")
                .route(web::get().to(users::list_users))
                .route(web::post().to(users::create_user)),
        )
        .route("/follows/new", web::get().to(follow::new_follow_page))
        .service(
            web::resource("/follows")
                .route(web::get().to(follow::list_follows))
                .route(web::post().to(follow::create_follow)),
        )
        .route("/posts/new", web::get().to(posts::new_post_page))
        .route("/posts/by-user", web::get().to(posts::posts_by_user))
        .service(
            web::resource("/posts")
                .route(web::get().to(posts::list_posts))
                .route(web::post().to(posts::create_post)),
        )
        .service(
            web::resource("/search")
                .route(web::get().to(search::search_page))
                .route(web::post().to(search::search)),
        )
        .route("/{operation}", web::post().to(gateway::forward));
}

async fn index() -> HttpResponse {
    redirect(Tab::InsertUser.href())
}
