use std::sync::OnceLock;

use actix_web::{web, HttpRequest, HttpResponse};
use regex::Regex;
use serde::Deserialize;

use crate::client::SocialGraph;
use crate::core::errors::ApiError;
use crate::core::helpers::escape_attr;
use crate::core::query_params::{get_int, parse_query_params};
use crate::config::DEFAULT_PAGE_SIZE;
use crate::handlers::AppState;
use crate::listing::{page_size, paginate};
use crate::models::queries::CreateUserInput;
use crate::models::User;
use crate::notify::{FlowOutcome, Notification, ValidationError};
use crate::templates::{empty_state, field_error_html, pagination_html, render_template, users_table, Tab};

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Regex should compile"))
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CreateUserForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub email: String,
}

impl CreateUserForm {
    pub fn validate(&self) -> Result<CreateUserInput, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::new("name", "Name is required"));
        }

        let age = self.age.trim();
        if age.is_empty() {
            return Err(ValidationError::new("age", "Age is required"));
        }
        let age: u32 = age
            .parse()
            .map_err(|_| ValidationError::new("age", "Age must be a whole number"))?;

        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::new("email", "Email is required"));
        }
        if !email_regex().is_match(email) {
            return Err(ValidationError::new("email", "Email address is not valid"));
        }

        Ok(CreateUserInput {
            name: name.to_string(),
            age,
            email: email.to_string(),
        })
    }
}

/// Validate, then one `createUser` call.
pub async fn submit_user(client: &dyn SocialGraph, form: &CreateUserForm) -> FlowOutcome {
    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => return FlowOutcome::Invalid(e),
    };

    match client.create_user(&input).await {
        Ok(user) => {
            tracing::info!(id = %user.id, name = %user.name, "user created");
            FlowOutcome::Done(Notification::success(
                "User Created",
                format!(
                    "User \"{}\" (ID: {}) has been created successfully.",
                    user.name, user.id
                ),
            ))
        }
        Err(err) => {
            tracing::warn!(error = %err, "createUser failed");
            FlowOutcome::Failed(Notification::from_client_error("Error Creating User", &err))
        }
    }
}

fn user_form(form: &CreateUserForm, error: Option<&ValidationError>) -> anyhow::Result<String> {
    render_template(
        "user_form.html",
        &[
            ("FIELD_ERROR", field_error_html(error)),
            ("FORM_NAME", escape_attr(&form.name)),
            ("FORM_AGE", escape_attr(&form.age)),
            ("FORM_EMAIL", escape_attr(&form.email)),
        ],
    )
}

pub async fn new_user_page(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let body = user_form(&CreateUserForm::default(), None)?;
    state.render(Tab::InsertUser, "Insert User", None, &body)
}

pub async fn create_user(
    state: web::Data<AppState>,
    form: web::Form<CreateUserForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    let outcome = submit_user(state.client.as_ref(), &form).await;

    // Reset the form only after a successful create.
    let shown = if outcome.is_done() { CreateUserForm::default() } else { form };
    let body = user_form(&shown, outcome.validation())?;
    state.render(Tab::InsertUser, "Insert User", outcome.notification(), &body)
}

pub async fn list_users(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let params = parse_query_params(req.query_string());
    let size = page_size(get_int(&params, "per_page", DEFAULT_PAGE_SIZE));
    let page_number = get_int(&params, "page", 1);

    let (users, notification) = match state.client.get_users().await {
        Ok(users) => (users, None),
        Err(err) => (
            Vec::<User>::new(),
            Some(Notification::from_client_error("Error Loading Users", &err)),
        ),
    };

    let page = paginate(&users, page_number, size);
    let body = if users.is_empty() {
        empty_state("No users found.")
    } else {
        format!("{}{}", users_table(page.items), pagination_html("/users", &[], &page))
    };
    state.render(Tab::Users, "Users", notification.as_ref(), &body)
}
