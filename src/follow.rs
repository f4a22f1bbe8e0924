use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::client::SocialGraph;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::core::errors::ApiError;
use crate::core::helpers::{escape, escape_attr, format_date};
use crate::core::query_params::{get_bool_flag, get_int, get_string, parse_query_params};
use crate::handlers::AppState;
use crate::listing::{dedup_by_id, filter_by_name, page_size, paginate};
use crate::models::queries::CreateFollowInput;
use crate::models::User;
use crate::notify::{FlowOutcome, Notification, ValidationError};
use crate::templates::{
    empty_state, field_error_html, link, pagination_html, user_picker_html, users_table, Tab,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Follower,
    Followed,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Follower => "follower",
            Role::Followed => "followed",
        }
    }

    pub fn parse(raw: &str) -> Option<Role> {
        match raw {
            "follower" => Some(Role::Follower),
            "followed" => Some(Role::Followed),
            _ => None,
        }
    }
}

/// The pending follow pair. At most one user per role, and never the same
/// user in both roles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FollowSelection {
    follower: Option<User>,
    followed: Option<User>,
}

impl FollowSelection {
    /// Rebuilds a selection from ids, ignoring ids not in `users`.
    pub fn from_ids(users: &[User], follower_id: Option<&str>, followed_id: Option<&str>) -> Self {
        let find = |id: Option<&str>| id.and_then(|id| users.iter().find(|u| u.id == id)).cloned();
        let mut selection = Self::default();
        if let Some(user) = find(follower_id) {
            selection.select(user, Role::Follower);
        }
        if let Some(user) = find(followed_id) {
            selection.select(user, Role::Followed);
        }
        selection
    }

    pub fn follower(&self) -> Option<&User> {
        self.follower.as_ref()
    }

    pub fn followed(&self) -> Option<&User> {
        self.followed.as_ref()
    }

    /// Assigns `user` to `role`. If the user held the other role, whoever
    /// held `role` before moves into the vacated one.
    pub fn select(&mut self, user: User, role: Role) {
        match role {
            Role::Followed => {
                if self.role_of(&user.id) == Some(Role::Follower) {
                    self.follower = self.followed.take();
                }
                self.followed = Some(user);
            }
            Role::Follower => {
                if self.role_of(&user.id) == Some(Role::Followed) {
                    self.followed = self.follower.take();
                }
                self.follower = Some(user);
            }
        }
    }

    pub fn remove(&mut self, user_id: &str) {
        if self.followed.as_ref().is_some_and(|u| u.id == user_id) {
            self.followed = None;
        } else if self.follower.as_ref().is_some_and(|u| u.id == user_id) {
            self.follower = None;
        }
    }

    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        if self.followed.as_ref().is_some_and(|u| u.id == user_id) {
            Some(Role::Followed)
        } else if self.follower.as_ref().is_some_and(|u| u.id == user_id) {
            Some(Role::Follower)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.follower = None;
        self.followed = None;
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("follower", self.follower.as_ref().map(|u| u.id.clone()).unwrap_or_default()),
            ("followed", self.followed.as_ref().map(|u| u.id.clone()).unwrap_or_default()),
        ]
    }
}

/// Validate the pair, then one `createFollow` call. The selection is cleared
/// on success only.
pub async fn submit_follow(client: &dyn SocialGraph, selection: &mut FollowSelection) -> FlowOutcome {
    let (follower, followed) = match (selection.follower(), selection.followed()) {
        (Some(a), Some(b)) => (a.clone(), b.clone()),
        _ => {
            return FlowOutcome::Invalid(ValidationError::new(
                "selection",
                "Please select both a follower and a followed user before creating a follow.",
            ))
        }
    };
    if follower.id == followed.id {
        return FlowOutcome::Invalid(ValidationError::new("selection", "A user cannot follow themselves."));
    }

    let input = CreateFollowInput {
        follower_id: follower.id.clone(),
        followed_id: followed.id.clone(),
    };
    match client.create_follow(&input).await {
        Ok(_) => {
            tracing::info!(follower = %follower.id, followed = %followed.id, "follow created");
            selection.clear();
            FlowOutcome::Done(Notification::success(
                "Follow Relationship Created",
                format!("{} follows {}", follower.name, followed.name),
            ))
        }
        Err(err) => {
            tracing::warn!(error = %err, "createFollow failed");
            FlowOutcome::Failed(Notification::from_client_error("Error Creating Follows", &err))
        }
    }
}

fn picker_body(
    users: &[User],
    selection: &FollowSelection,
    filter: &str,
    error: Option<&ValidationError>,
) -> String {
    let base = selection.params();
    let with = |extra: &[(&'static str, String)]| {
        let mut params = base.clone();
        params.push(("q", filter.to_string()));
        params.extend_from_slice(extra);
        escape_attr(&link("/follows/new", &params))
    };

    let mut html = format!(
        r#"<form method="get" action="/follows/new" class="card"><input type="hidden" name="follower" value="{}"><input type="hidden" name="followed" value="{}"><label>Filter by name <input type="text" name="q" value="{}"></label></form>"#,
        escape_attr(&base[0].1),
        escape_attr(&base[1].1),
        escape_attr(filter)
    );

    let shown = filter_by_name(users, filter);
    if shown.is_empty() {
        html.push_str(&empty_state("No users found."));
    } else {
        html.push_str("<table><thead><tr><th>Name</th><th>Age</th><th>Email</th><th>Created</th><th>Role</th><th></th></tr></thead><tbody>");
        for user in shown {
            let role = selection.role_of(&user.id);
            let badge = role
                .map(|r| format!(r#"<span class="role">{}</span>"#, r.as_str()))
                .unwrap_or_default();
            let mut actions = format!(
                r#"<a href="{}">Set follower</a> <a href="{}">Set followed</a>"#,
                with(&[("select", user.id.clone()), ("as", "follower".to_string())]),
                with(&[("select", user.id.clone()), ("as", "followed".to_string())]),
            );
            if role.is_some() {
                actions.push_str(&format!(r#" <a href="{}">Remove</a>"#, with(&[("remove", user.id.clone())])));
            }
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&user.name),
                user.age,
                escape(&user.email),
                escape(&format_date(&user.created_at)),
                badge,
                actions
            ));
        }
        html.push_str("</tbody></table>");
    }

    let summary = match (selection.follower(), selection.followed()) {
        (Some(a), Some(b)) => format!("{} will follow {}", escape(&a.name), escape(&b.name)),
        (Some(a), None) => format!("{} will follow …", escape(&a.name)),
        (None, Some(b)) => format!("… will follow {}", escape(&b.name)),
        (None, None) => "Pick a follower and a followed user.".to_string(),
    };
    html.push_str(&format!(
        r#"<form method="post" action="/follows" class="card">{}<p>{}</p><input type="hidden" name="follower_id" value="{}"><input type="hidden" name="followed_id" value="{}"><div class="actions"><button type="submit">Create Follow</button><a class="button secondary" href="/follows/new">Clear</a></div></form>"#,
        field_error_html(error),
        summary,
        escape_attr(&base[0].1),
        escape_attr(&base[1].1)
    ));
    html
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

pub async fn new_follow_page(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let params = parse_query_params(req.query_string());
    let (users, notification) = load_users(&state).await;

    let mut selection = FollowSelection::from_ids(
        &users,
        get_string(&params, "follower", None).as_deref(),
        get_string(&params, "followed", None).as_deref(),
    );

    if let Some(id) = get_string(&params, "remove", None) {
        selection.remove(&id);
    }
    if let (Some(id), Some(role)) = (
        get_string(&params, "select", None),
        get_string(&params, "as", None).as_deref().and_then(Role::parse),
    ) {
        if let Some(user) = users.iter().find(|u| u.id == id) {
            selection.select(user.clone(), role);
        }
    }

    let filter = get_string(&params, "q", None).unwrap_or_default();
    let body = picker_body(&users, &selection, &filter, None);
    state.render(Tab::InsertFollow, "Insert Follow", notification.as_ref(), &body)
}

#[derive(Deserialize, Debug, Default)]
pub struct CreateFollowForm {
    #[serde(default)]
    pub follower_id: String,
    #[serde(default)]
    pub followed_id: String,
}

pub async fn create_follow(
    state: web::Data<AppState>,
    form: web::Form<CreateFollowForm>,
) -> Result<HttpResponse, ApiError> {
    let (users, load_error) = load_users(&state).await;
    if let Some(notification) = load_error {
        let body = picker_body(&users, &FollowSelection::default(), "", None);
        return state.render(Tab::InsertFollow, "Insert Follow", Some(&notification), &body);
    }

    let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.trim().to_string());
    let follower_id = non_empty(&form.follower_id);
    let followed_id = non_empty(&form.followed_id);

    // from_ids would silently collapse a self-follow into one role.
    if follower_id.is_some() && follower_id == followed_id {
        let invalid = ValidationError::new("selection", "A user cannot follow themselves.");
        let selection = FollowSelection::from_ids(&users, follower_id.as_deref(), None);
        let body = picker_body(&users, &selection, "", Some(&invalid));
        return state.render(Tab::InsertFollow, "Insert Follow", None, &body);
    }

    let mut selection = FollowSelection::from_ids(&users, follower_id.as_deref(), followed_id.as_deref());
    let outcome = submit_follow(state.client.as_ref(), &mut selection).await;
    let body = picker_body(&users, &selection, "", outcome.validation());
    state.render(Tab::InsertFollow, "Insert Follow", outcome.notification(), &body)
}

/// Followers (default) or following of one user, deduplicated and paginated.
pub async fn list_follows(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let params = parse_query_params(req.query_string());
    let size = page_size(get_int(&params, "per_page", DEFAULT_PAGE_SIZE));
    let page_number = get_int(&params, "page", 1);
    let show_following = get_bool_flag(&params, "following");
    let user_id = get_string(&params, "user_id", None);

    let (users, mut notification) = load_users(&state).await;

    let mut body = format!(
        r#"<form method="get" action="/follows" class="card"><label>User {}</label><label><input type="checkbox" name="following" value="true"{} data-autosubmit> Show following instead of followers</label><noscript><button type="submit">Show</button></noscript></form>"#,
        user_picker_html("user_id", &users, user_id.as_deref(), true),
        if show_following { " checked" } else { "" }
    );

    let Some(user_id) = user_id else {
        body.push_str(&empty_state("Select a user to see their follows."));
        return state.render(Tab::Follows, "Follows", notification.as_ref(), &body);
    };

    let name = users
        .iter()
        .find(|u| u.id == user_id)
        .map(|u| u.name.clone())
        .unwrap_or_else(|| user_id.clone());

    let fetched = if show_following {
        state.client.get_following(&user_id).await
    } else {
        state.client.get_followers(&user_id).await
    };
    let related = match fetched {
        Ok(list) => dedup_by_id(list),
        Err(err) => {
            let title = if show_following { "Error Loading Following" } else { "Error Loading Followers" };
            notification = Some(Notification::from_client_error(title, &err));
            Vec::new()
        }
    };

    if related.is_empty() {
        let message = if show_following {
            format!("No following found for {}.", name)
        } else {
            format!("No followers found for {}.", name)
        };
        body.push_str(&empty_state(&message));
    } else {
        let page = paginate(&related, page_number, size);
        let keep = [
            ("user_id", user_id.clone()),
            ("following", if show_following { "true".to_string() } else { String::new() }),
        ];
        body.push_str(&users_table(page.items));
        body.push_str(&pagination_html("/follows", &keep, &page));
    }

    state.render(Tab::Follows, "Follows", notification.as_ref(), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str) -> User {
        User {
            id: id.into(),
            name: name.into(),
            age: 20,
            email: format!("{}@example.com", id),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn ids(selection: &FollowSelection) -> (Option<&str>, Option<&str>) {
        (
            selection.follower().map(|u| u.id.as_str()),
            selection.followed().map(|u| u.id.as_str()),
        )
    }

    #[test]
    fn selecting_roles() {
        let mut s = FollowSelection::default();
        s.select(user("a", "Alice"), Role::Follower);
        s.select(user("b", "Bob"), Role::Followed);
        assert_eq!(ids(&s), (Some("a"), Some("b")));

        // Replacing a role keeps the other one.
        s.select(user("c", "Cy"), Role::Followed);
        assert_eq!(ids(&s), (Some("a"), Some("c")));
    }

    #[test]
    fn moving_a_user_to_the_other_role_swaps() {
        let mut s = FollowSelection::default();
        s.select(user("a", "Alice"), Role::Follower);
        s.select(user("b", "Bob"), Role::Followed);

        s.select(user("a", "Alice"), Role::Followed);
        assert_eq!(ids(&s), (Some("b"), Some("a")));

        s.select(user("a", "Alice"), Role::Follower);
        assert_eq!(ids(&s), (Some("a"), Some("b")));
    }

    #[test]
    fn moving_the_only_user_vacates_its_old_role() {
        let mut s = FollowSelection::default();
        s.select(user("a", "Alice"), Role::Follower);
        s.select(user("a", "Alice"), Role::Followed);
        assert_eq!(ids(&s), (None, Some("a")));
    }

    #[test]
    fn roles_never_share_a_user() {
        let users = [user("a", "A"), user("b", "B"), user("c", "C")];
        let roles = [Role::Follower, Role::Followed];
        let mut s = FollowSelection::default();
        for step in 0..60 {
            let u = users[(step * 7 + step / 3) % 3].clone();
            s.select(u, roles[step % 2]);
            if let (Some(a), Some(b)) = (s.follower(), s.followed()) {
                assert_ne!(a.id, b.id, "step {}", step);
            }
        }
    }

    #[test]
    fn remove_clears_only_that_user() {
        let mut s = FollowSelection::default();
        s.select(user("a", "Alice"), Role::Follower);
        s.select(user("b", "Bob"), Role::Followed);
        s.remove("b");
        assert_eq!(ids(&s), (Some("a"), None));
        s.remove("zzz");
        assert_eq!(ids(&s), (Some("a"), None));
        assert_eq!(s.role_of("a"), Some(Role::Follower));
    }

    #[test]
    fn from_ids_skips_unknown_and_duplicate() {
        let users = [user("a", "Alice"), user("b", "Bob")];
        let s = FollowSelection::from_ids(&users, Some("a"), Some("missing"));
        assert_eq!(ids(&s), (Some("a"), None));

        let s = FollowSelection::from_ids(&users, Some("a"), Some("a"));
        assert_eq!(ids(&s), (None, Some("a")));
    }

    #[test]
    fn role_names() {
        assert_eq!(Role::parse("follower"), Some(Role::Follower));
        assert_eq!(Role::parse(Role::Followed.as_str()), Some(Role::Followed));
        assert_eq!(Role::parse("friend"), None);
    }
}
