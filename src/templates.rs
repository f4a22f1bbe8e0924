use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::{NOTIFICATION_DISMISS_MS, PAGE_SIZES};
use crate::core::helpers::{escape, escape_attr, format_date, format_id, truncate_content};
use crate::listing::{group_by_initial, page_window, Page, PageLink};
use crate::models::{Post, User};
use crate::notify::{Notification, ValidationError};
use crate::static_server::asset_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    InsertUser,
    InsertFollow,
    InsertPost,
    Users,
    Posts,
    UserPosts,
    Follows,
    Search,
}

impl Tab {
    /// Navigation order; Ctrl/Cmd+N selects the N-th entry.
    pub const ALL: [Tab; 8] = [
        Tab::InsertUser,
        Tab::InsertFollow,
        Tab::InsertPost,
        Tab::Users,
        Tab::Posts,
        Tab::UserPosts,
        Tab::Follows,
        Tab::Search,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::InsertUser => "Insert User",
            Tab::InsertFollow => "Insert Follow",
            Tab::InsertPost => "Insert Post",
            Tab::Users => "Users",
            Tab::Posts => "Posts",
            Tab::UserPosts => "User Posts",
            Tab::Follows => "Follows",
            Tab::Search => "Search Posts",
        }
    }

    pub fn href(self) -> &'static str {
        match self {
            Tab::InsertUser => "/users/new",
            Tab::InsertFollow => "/follows/new",
            Tab::InsertPost => "/posts/new",
            Tab::Users => "/users",
            Tab::Posts => "/posts",
            Tab::UserPosts => "/posts/by-user",
            Tab::Follows => "/follows",
            Tab::Search => "/search",
        }
    }
}

pub struct PageFrame<'a> {
    pub tab: Tab,
    pub title: &'a str,
    pub transport: &'a str,
    pub notification: Option<&'a Notification>,
}

fn placeholder_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\b[A-Z]+(?:_[A-Z]+)+\b").expect("Regex should compile"))
}

/// Replaces `UPPER_SNAKE` placeholders in one pass, so substituted values are
/// never scanned again. Unknown placeholders are left as they are.
pub fn fill(template: &str, values: &[(&str, String)]) -> String {
    let map: HashMap<&str, &str> = values.iter().map(|(k, v)| (*k, v.as_str())).collect();
    placeholder_regex()
        .replace_all(template, |caps: &regex::Captures| {
            let key = &caps[0];
            map.get(key).map(|v| v.to_string()).unwrap_or_else(|| key.to_string())
        })
        .into_owned()
}

pub fn render_template(name: &str, values: &[(&str, String)]) -> anyhow::Result<String> {
    Ok(fill(&asset_text(name)?, values))
}

pub fn render_page(frame: &PageFrame<'_>, body: &str) -> anyhow::Result<String> {
    render_template(
        "layout.html",
        &[
            ("PAGE_TITLE", escape(frame.title)),
            ("TRANSPORT_LABEL", transport_label(frame.transport).to_string()),
            ("NAV_ITEMS", nav_html(frame.tab)),
            ("NOTIFICATION", notification_html(frame.notification)),
            ("PAGE_BODY", body.to_string()),
        ],
    )
}

fn transport_label(name: &str) -> &'static str {
    match name {
        "api" => "Gateway API",
        "sdk" => "HelixDB direct",
        _ => "custom transport",
    }
}

fn nav_html(active: Tab) -> String {
    Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            format!(
                r#"<a href="{}" data-tab="{}"{}>{}</a>"#,
                tab.href(),
                i + 1,
                if *tab == active { r#" class="active""# } else { "" },
                tab.label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n            ")
}

pub fn notification_html(notification: Option<&Notification>) -> String {
    match notification {
        None => String::new(),
        Some(n) => format!(
            r#"<div class="notification {}" role="alert" data-dismiss-ms="{}"><div><strong>{}</strong><p>{}</p></div><button type="button" class="close secondary" aria-label="Dismiss">×</button></div>"#,
            n.level.as_str(),
            NOTIFICATION_DISMISS_MS,
            escape(&n.title),
            escape(&n.message)
        ),
    }
}

pub fn field_error_html(error: Option<&ValidationError>) -> String {
    match error {
        None => String::new(),
        Some(e) => format!(
            r#"<p class="field-error" data-field="{}">{}</p>"#,
            e.field,
            escape(&e.message)
        ),
    }
}

pub fn empty_state(message: &str) -> String {
    format!(r#"<p class="empty">{}</p>"#, escape(message))
}

/// Builds `path?k=v&..` with every value percent-encoded.
pub fn link(path: &str, params: &[(&str, String)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query.join("&"))
    }
}

/// Pager links plus the rows-per-page picker. `keep` carries the page's
/// other query parameters across navigation.
pub fn pagination_html<T>(path: &str, keep: &[(&str, String)], page: &Page<'_, T>) -> String {
    let page_link = |n: usize| {
        let mut params = keep.to_vec();
        params.push(("page", n.to_string()));
        params.push(("per_page", page.size.to_string()));
        escape_attr(&link(path, &params))
    };

    let mut html = String::from(r#"<div class="pagination">"#);
    if page.has_prev() {
        html.push_str(&format!(r#"<a rel="prev" href="{}">Previous</a>"#, page_link(page.number - 1)));
    }
    for entry in page_window(page.number, page.total_pages) {
        match entry {
            PageLink::Number(n) if n == page.number => {
                html.push_str(&format!(r#"<a class="current" href="{}">{}</a>"#, page_link(n), n))
            }
            PageLink::Number(n) => html.push_str(&format!(r#"<a href="{}">{}</a>"#, page_link(n), n)),
            PageLink::Ellipsis => html.push_str("<span>…</span>"),
        }
    }
    if page.has_next() {
        html.push_str(&format!(r#"<a rel="next" href="{}">Next</a>"#, page_link(page.number + 1)));
    }

    let last_index = page.first_index() + page.items.len().saturating_sub(1);
    html.push_str(&format!(
        "<span>Showing {}–{} of {}</span>",
        page.first_index(),
        if page.items.is_empty() { 0 } else { last_index },
        page.total_items
    ));

    html.push_str(&format!(r#"<form method="get" action="{}">"#, escape_attr(path)));
    for (k, v) in keep.iter().filter(|(_, v)| !v.is_empty()) {
        html.push_str(&format!(
            r#"<input type="hidden" name="{}" value="{}">"#,
            k,
            escape_attr(v)
        ));
    }
    html.push_str(r#"<label>Rows <select name="per_page" data-autosubmit>"#);
    for size in PAGE_SIZES {
        html.push_str(&format!(
            r#"<option value="{0}"{1}>{0}</option>"#,
            size,
            if size == page.size { " selected" } else { "" }
        ));
    }
    html.push_str("</select></label><noscript><button type=\"submit\">Apply</button></noscript></form></div>");
    html
}

/// `<select>` of users grouped alphabetically by first letter.
pub fn user_picker_html(name: &str, users: &[User], selected: Option<&str>, autosubmit: bool) -> String {
    let mut html = format!(
        r#"<select name="{}"{}><option value="">Select a user</option>"#,
        name,
        if autosubmit { " data-autosubmit" } else { "" }
    );
    if users.is_empty() {
        html.push_str(r#"<option value="no-users" disabled>No users found</option>"#);
    }
    for (letter, group) in group_by_initial(users) {
        html.push_str(&format!(r#"<optgroup label="{}">"#, escape_attr(&letter)));
        for user in group {
            html.push_str(&format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape_attr(&user.id),
                if selected == Some(user.id.as_str()) { " selected" } else { "" },
                escape(&user.name)
            ));
        }
        html.push_str("</optgroup>");
    }
    html.push_str("</select>");
    html
}

pub fn users_table(users: &[User]) -> String {
    let rows: String = users
        .iter()
        .map(|u| {
            format!(
                r#"<tr><td title="{}">{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                escape_attr(&u.id),
                escape(&format_id(&u.id)),
                escape(&u.name),
                u.age,
                escape(&u.email),
                escape(&format_date(&u.created_at))
            )
        })
        .collect();
    format!(
        "<table><thead><tr><th>ID</th><th>Name</th><th>Age</th><th>Email</th><th>Created</th></tr></thead><tbody>{}</tbody></table>",
        rows
    )
}

pub fn posts_table(posts: &[Post]) -> String {
    let rows: String = posts
        .iter()
        .map(|p| {
            format!(
                r#"<tr><td title="{}">{}</td><td title="{}">{}</td><td>{}</td></tr>"#,
                escape_attr(&p.id),
                escape(&format_id(&p.id)),
                escape_attr(&p.content),
                escape(&truncate_content(&p.content)),
                escape(&format_date(&p.created_at))
            )
        })
        .collect();
    format!(
        "<table><thead><tr><th>ID</th><th>Content</th><th>Created</th></tr></thead><tbody>{}</tbody></table>",
        rows
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::paginate;

    #[test]
    fn fill_is_single_pass() {
        let out = fill(
            "<p>FORM_NAME</p><p>FORM_EMAIL</p><p>HelixDB</p>",
            &[("FORM_NAME", "FORM_EMAIL".to_string()), ("FORM_EMAIL", "x@y.z".to_string())],
        );
        assert_eq!(out, "<p>FORM_EMAIL</p><p>x@y.z</p><p>HelixDB</p>");
    }

    #[test]
    fn unknown_placeholders_survive() {
        assert_eq!(fill("A_B", &[]), "A_B");
    }

    #[test]
    fn layout_renders_nav_and_notification() {
        let n = Notification::success("User Created", "<Alice>");
        let html = render_page(
            &PageFrame {
                tab: Tab::Users,
                title: "Users",
                transport: "api",
                notification: Some(&n),
            },
            "<p>body</p>",
        )
        .unwrap();
        assert!(html.contains(r#"<a href="/users" data-tab="4" class="active">Users</a>"#));
        assert!(html.contains("&lt;Alice&gt;"));
        assert!(html.contains("Gateway API"));
        assert!(html.contains("<p>body</p>"));
    }

    #[test]
    fn link_skips_empty_values_and_encodes() {
        assert_eq!(
            link("/follows", &[("user_id", "a b".to_string()), ("following", String::new())]),
            "/follows?user_id=a%20b"
        );
        assert_eq!(link("/users", &[]), "/users");
    }

    #[test]
    fn pagination_marks_prev_next() {
        let items: Vec<u32> = (0..30).collect();
        let page = paginate(&items, 2, 10);
        let html = pagination_html("/users", &[], &page);
        assert!(html.contains(r#"rel="prev" href="/users?page=1&amp;per_page=10""#));
        assert!(html.contains(r#"rel="next" href="/users?page=3&amp;per_page=10""#));
        assert!(html.contains("Showing 11–20 of 30"));
    }

    #[test]
    fn picker_groups_by_letter() {
        let users = vec![
            User {
                id: "2".into(),
                name: "Bob".into(),
                age: 30,
                email: "bob@example.com".into(),
                created_at: String::new(),
                updated_at: String::new(),
            },
            User {
                id: "1".into(),
                name: "Alice".into(),
                age: 25,
                email: "alice@example.com".into(),
                created_at: String::new(),
                updated_at: String::new(),
            },
        ];
        let html = user_picker_html("user_id", &users, Some("2"), false);
        let a = html.find(r#"<optgroup label="A">"#).unwrap();
        let b = html.find(r#"<optgroup label="B">"#).unwrap();
        assert!(a < b);
        assert!(html.contains(r#"<option value="2" selected>Bob</option>"#));
    }
}
