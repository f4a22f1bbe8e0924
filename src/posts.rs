use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::client::SocialGraph;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::core::errors::ApiError;
use crate::core::helpers::escape_attr;
use crate::core::query_params::{get_int, get_string, parse_query_params};
use crate::handlers::AppState;
use crate::listing::{dedup_by_id, page_size, paginate};
use crate::models::queries::{CreatePostEmbeddingInput, CreatePostInput};
use crate::models::{Post, User};
use crate::notify::{FlowOutcome, Notification, ValidationError};
use crate::templates::{
    empty_state, field_error_html, pagination_html, posts_table, render_template, user_picker_html, Tab,
};

/// Parses a comma or whitespace separated list of finite numbers.
pub fn parse_vector(raw: &str) -> Result<Vec<f64>, ValidationError> {
    let mut vector = Vec::new();
    for part in raw.split(|c: char| c == ',' || c.is_whitespace()).filter(|p| !p.is_empty()) {
        match part.parse::<f64>() {
            Ok(v) if v.is_finite() => vector.push(v),
            _ => {
                return Err(ValidationError::new(
                    "vector",
                    format!("\"{}\" is not a number", part),
                ))
            }
        }
    }
    if vector.is_empty() {
        return Err(ValidationError::new("vector", "Vector must contain at least one number"));
    }
    Ok(vector)
}

/// `dimensions` zeros, as prefilled in the post form.
pub fn default_vector(dimensions: usize) -> String {
    vec!["0.0"; dimensions.max(1)].join(", ")
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CreatePostForm {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub vector: String,
}

impl CreatePostForm {
    fn blank(dimensions: usize) -> Self {
        Self {
            vector: default_vector(dimensions),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(CreatePostInput, Vec<f64>), ValidationError> {
        let user_id = self.user_id.trim();
        if user_id.is_empty() {
            return Err(ValidationError::new("user_id", "Please select a user"));
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(ValidationError::new("content", "Content is required"));
        }
        let vector = parse_vector(&self.vector)?;
        Ok((
            CreatePostInput {
                user_id: user_id.to_string(),
                content: content.to_string(),
            },
            vector,
        ))
    }
}

/// `createPost`, then `createPostEmbedding` for the new post. The embedding
/// is skipped when the post fails; when only the embedding fails the post
/// stays without one and only that error is reported.
pub async fn submit_post(client: &dyn SocialGraph, form: &CreatePostForm, users: &[User]) -> FlowOutcome {
    let (input, vector) = match form.validate() {
        Ok(parsed) => parsed,
        Err(e) => return FlowOutcome::Invalid(e),
    };

    let post = match client.create_post(&input).await {
        Ok(post) => post,
        Err(err) => {
            tracing::warn!(error = %err, "createPost failed");
            return FlowOutcome::Failed(Notification::from_client_error("Error Creating Post", &err));
        }
    };
    tracing::info!(id = %post.id, user = %input.user_id, "post created");

    let embedding = CreatePostEmbeddingInput {
        post_id: post.id.clone(),
        vector,
        content: post.content.clone(),
    };
    if let Err(err) = client.create_post_embedding(&embedding).await {
        tracing::warn!(post = %post.id, error = %err, "createPostEmbedding failed");
        return FlowOutcome::Failed(Notification::from_client_error(
            "Error Creating Post Embedding",
            &err,
        ));
    }

    let author = users
        .iter()
        .find(|u| u.id == input.user_id)
        .map(|u| u.name.as_str())
        .unwrap_or(input.user_id.as_str());
    FlowOutcome::Done(Notification::success(
        "Post Created",
        format!("Post by {} has been created successfully with embedding.", author),
    ))
}

fn post_form(form: &CreatePostForm, users: &[User], error: Option<&ValidationError>) -> anyhow::Result<String> {
    let selected = (!form.user_id.is_empty()).then_some(form.user_id.as_str());
    render_template(
        "post_form.html",
        &[
            ("FIELD_ERROR", field_error_html(error)),
            ("USER_PICKER", user_picker_html("user_id", users, selected, false)),
            ("FORM_CONTENT", escape_attr(&form.content)),
            ("FORM_VECTOR", escape_attr(&form.vector)),
        ],
    )
}

async fn load_users(state: &AppState) -> (Vec<User>, Option<Notification>) {
    match state.client.get_users().await {
        Ok(users) => (users, None),
        Err(err) => (
            Vec::new(),
            Some(Notification::from_client_error("Error Loading Users", &err)),
        ),
    }
}

pub async fn new_post_page(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let (users, notification) = load_users(&state).await;
    let body = post_form(&CreatePostForm::blank(state.config.vector_dimensions), &users, None)?;
    state.render(Tab::InsertPost, "Insert Post", notification.as_ref(), &body)
}

pub async fn create_post(
    state: web::Data<AppState>,
    form: web::Form<CreatePostForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    let (users, load_error) = load_users(&state).await;
    let outcome = submit_post(state.client.as_ref(), &form, &users).await;

    let shown = if outcome.is_done() {
        CreatePostForm::blank(state.config.vector_dimensions)
    } else {
        form
    };
    let body = post_form(&shown, &users, outcome.validation())?;
    let notification = outcome.notification().or(load_error.as_ref());
    state.render(Tab::InsertPost, "Insert Post", notification, &body)
}

fn post_listing(path: &str, keep: &[(&str, String)], posts: &[Post], page_number: usize, size: usize, empty: &str) -> String {
    if posts.is_empty() {
        return empty_state(empty);
    }
    let page = paginate(posts, page_number, size);
    format!("{}{}", posts_table(page.items), pagination_html(path, keep, &page))
}

pub async fn list_posts(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let params = parse_query_params(req.query_string());
    let size = page_size(get_int(&params, "per_page", DEFAULT_PAGE_SIZE));
    let page_number = get_int(&params, "page", 1);

    let (posts, notification) = match state.client.get_posts().await {
        Ok(posts) => (posts, None),
        Err(err) => (
            Vec::new(),
            Some(Notification::from_client_error("Error Loading Posts", &err)),
        ),
    };

    let body = post_listing("/posts", &[], &posts, page_number, size, "No posts found.");
    state.render(Tab::Posts, "Posts", notification.as_ref(), &body)
}

pub async fn posts_by_user(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let params = parse_query_params(req.query_string());
    let size = page_size(get_int(&params, "per_page", DEFAULT_PAGE_SIZE));
    let page_number = get_int(&params, "page", 1);
    let user_id = get_string(&params, "user_id", None);

    let (users, mut notification) = load_users(&state).await;
    let mut body = format!(
        r#"<form method="get" action="/posts/by-user" class="card"><label>User {}</label><noscript><button type="submit">Show</button></noscript></form>"#,
        user_picker_html("user_id", &users, user_id.as_deref(), true)
    );

    let Some(user_id) = user_id else {
        body.push_str(&empty_state("Select a user to see their posts."));
        return state.render(Tab::UserPosts, "User Posts", notification.as_ref(), &body);
    };

    let posts = match state.client.get_posts_by_user(&user_id).await {
        Ok(posts) => dedup_by_id(posts),
        Err(err) => {
            notification = Some(Notification::from_client_error("Error Loading Posts", &err));
            Vec::new()
        }
    };
    let name = users
        .iter()
        .find(|u| u.id == user_id)
        .map(|u| u.name.clone())
        .unwrap_or_else(|| user_id.clone());

    body.push_str(&post_listing(
        "/posts/by-user",
        &[("user_id", user_id.clone())],
        &posts,
        page_number,
        size,
        &format!("No posts found for {}.", name),
    ));
    state.render(Tab::UserPosts, "User Posts", notification.as_ref(), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_accept_commas_and_spaces() {
        assert_eq!(parse_vector("0.1, 0.2,0.3  0.4").unwrap(), vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(parse_vector("-1e-3").unwrap(), vec![-0.001]);
    }

    #[test]
    fn bad_vectors() {
        assert_eq!(parse_vector(" , ").unwrap_err().field, "vector");
        assert!(parse_vector("0.1, abc").unwrap_err().message.contains("abc"));
        assert!(parse_vector("NaN").is_err());
        assert!(parse_vector("inf").is_err());
    }

    #[test]
    fn default_vector_has_requested_dimensions() {
        assert_eq!(default_vector(3), "0.0, 0.0, 0.0");
        assert_eq!(parse_vector(&default_vector(5)).unwrap().len(), 5);
    }

    #[test]
    fn form_validation_order() {
        let form = |u: &str, c: &str, v: &str| CreatePostForm {
            user_id: u.into(),
            content: c.into(),
            vector: v.into(),
        };
        assert_eq!(form("", "hi", "1").validate().unwrap_err().field, "user_id");
        assert_eq!(form("u1", "  ", "1").validate().unwrap_err().field, "content");
        assert_eq!(form("u1", "hi", "").validate().unwrap_err().field, "vector");

        let (input, vector) = form("u1", " hi ", "1,2").validate().unwrap();
        assert_eq!(input.content, "hi");
        assert_eq!(vector, vec![1.0, 2.0]);
    }
}
