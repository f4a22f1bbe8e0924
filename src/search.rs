use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::client::SocialGraph;
use crate::config::DEFAULT_SEARCH_K;
use crate::core::errors::ApiError;
use crate::core::helpers::escape_attr;
use crate::handlers::AppState;
use crate::models::queries::SearchInput;
use crate::models::Post;
use crate::notify::{Notification, ValidationError};
use crate::posts::{default_vector, parse_vector};
use crate::templates::{empty_state, field_error_html, posts_table, render_template, Tab};

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchForm {
    #[serde(default)]
    pub vector: String,
    #[serde(default)]
    pub k: String,
}

impl SearchForm {
    /// A blank `k` means [`DEFAULT_SEARCH_K`].
    pub fn validate(&self) -> Result<SearchInput, ValidationError> {
        let vector = parse_vector(&self.vector)?;
        let k = match self.k.trim() {
            "" => DEFAULT_SEARCH_K,
            raw => match raw.parse::<usize>() {
                Ok(k) if k >= 1 => k,
                _ => return Err(ValidationError::new("k", "k must be a whole number of at least 1")),
            },
        };
        Ok(SearchInput { vector, k })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Invalid(ValidationError),
    Failed(Notification),
    /// Nearest first, at most `k` posts.
    Found(Vec<Post>),
}

pub async fn run_search(client: &dyn SocialGraph, form: &SearchForm) -> SearchOutcome {
    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => return SearchOutcome::Invalid(e),
    };
    match client.search_post_embeddings(&input).await {
        Ok(posts) => {
            tracing::debug!(k = input.k, found = posts.len(), "similarity search");
            SearchOutcome::Found(posts)
        }
        Err(err) => {
            tracing::warn!(error = %err, "searchPostEmbeddings failed");
            SearchOutcome::Failed(Notification::from_client_error("Error Searching Posts", &err))
        }
    }
}

fn search_body(form: &SearchForm, error: Option<&ValidationError>, results: &str) -> anyhow::Result<String> {
    render_template(
        "search_form.html",
        &[
            ("FIELD_ERROR", field_error_html(error)),
            ("FORM_VECTOR", escape_attr(&form.vector)),
            ("FORM_K", escape_attr(&form.k)),
            ("SEARCH_RESULTS", results.to_string()),
        ],
    )
}

pub async fn search_page(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let form = SearchForm {
        vector: default_vector(state.config.vector_dimensions),
        k: DEFAULT_SEARCH_K.to_string(),
    };
    let body = search_body(&form, None, "")?;
    state.render(Tab::Search, "Search Posts", None, &body)
}

pub async fn search(
    state: web::Data<AppState>,
    form: web::Form<SearchForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    let (body, notification) = match run_search(state.client.as_ref(), &form).await {
        SearchOutcome::Invalid(e) => (search_body(&form, Some(&e), "")?, None),
        SearchOutcome::Failed(n) => (search_body(&form, None, "")?, Some(n)),
        SearchOutcome::Found(posts) if posts.is_empty() => {
            (search_body(&form, None, &empty_state("No posts found."))?, None)
        }
        SearchOutcome::Found(posts) => (search_body(&form, None, &posts_table(&posts))?, None),
    };
    state.render(Tab::Search, "Search Posts", notification.as_ref(), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(vector: &str, k: &str) -> SearchForm {
        SearchForm {
            vector: vector.into(),
            k: k.into(),
        }
    }

    #[test]
    fn k_defaults_when_blank() {
        let input = form("0.1, 0.2", "").validate().unwrap();
        assert_eq!(input.k, DEFAULT_SEARCH_K);
        assert_eq!(input.vector, vec![0.1, 0.2]);
    }

    #[test]
    fn k_must_be_positive() {
        assert_eq!(form("1", "0").validate().unwrap_err().field, "k");
        assert_eq!(form("1", "-2").validate().unwrap_err().field, "k");
        assert_eq!(form("1", "3").validate().unwrap().k, 3);
    }

    #[test]
    fn vector_checked_first() {
        assert_eq!(form("", "0").validate().unwrap_err().field, "vector");
    }
}
