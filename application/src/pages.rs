//! Dashboard pages.
//!
//! These are thin shells only, reachable through the [`gate`].
//!
//! [`gate`]: crate::gate

use std::fmt::Write as _;

use axum::{response::Html, routing::get, Router};

use crate::{policy, session::Session};

/// Dashboard pages as `(path, title)` pairs.
pub const PAGES: &[(&str, &str)] = &[
    (policy::DASHBOARD, "Bảng điều khiển"),
    (policy::ADMIN_DASHBOARD, "Quản trị"),
    ("/dashboard/admin/users", "Quản lý người dùng"),
    ("/dashboard/admin/movies", "Quản lý phim"),
    (policy::EDITOR_DASHBOARD, "Biên tập"),
    ("/dashboard/editor/movies", "Biên tập phim"),
];

/// Builds the [`Router`] of the dashboard [`PAGES`].
pub fn router() -> Router {
    PAGES.iter().fold(Router::new(), |router, &(path, title)| {
        router.route(path, get(move |session: Session| shell(title, session)))
    })
}

/// Renders the HTML shell of a dashboard page.
#[expect(clippy::unused_async, reason = "`async` is required by `axum`")]
async fn shell(title: &'static str, session: Session) -> Html<String> {
    Html(render(title, &session.username, &session.role.to_string()))
}

/// Renders the HTML shell of a page with the provided `title` for the
/// provided user.
fn render(title: &str, username: &str, role: &str) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"vi\">\n<head>");
    _ = write!(
        html,
        "<meta charset=\"utf-8\"><title>{} | Drama Phim</title></head>\n\
         <body><header><h1>{}</h1><p>{} ({})</p></header>\n\
         <main id=\"dashboard\"></main></body>\n</html>\n",
        escape(title),
        escape(title),
        escape(username),
        escape(role),
    );
    html
}

/// Escapes the provided `text` for HTML.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
