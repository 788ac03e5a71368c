//! # 首页与健康检查

use std::fmt::Write as _;

use axum::Json;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use serde_json::{Value, json};

use super::instagram::with_api_key;
use crate::instagram::flow::FEED_PATH_PREFIX;
use crate::server::AppState;

const AUTH_PATH: &str = "/instagram/auth";

/// `GET /`：已连接账号列表
pub async fn home_handler(State(state): State<AppState>) -> Response {
    match state.store.list_usernames().await {
        Ok(usernames) => {
            let api_key = &state.config.server.api_key;
            Html(render_home(usernames.iter().map(String::as_str), api_key)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// `GET /ping`
pub async fn ping_handler() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

fn render_home<'a>(usernames: impl Iterator<Item = &'a str>, api_key: &str) -> String {
    let mut items = String::new();
    for username in usernames {
        let feed = with_api_key(&format!("{FEED_PATH_PREFIX}{username}"), api_key);
        let _ = write!(
            items,
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(&feed),
            escape_html(username)
        );
    }
    if items.is_empty() {
        items.push_str("<li>No connected accounts</li>");
    }

    let connect = escape_html(&with_api_key(AUTH_PATH, api_key));
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Social Feed</title></head>\
         <body><h1>Social Feed</h1><h2>Connected accounts</h2><ul>{items}</ul>\
         <p><a href=\"{connect}\">Connect Instagram</a></p></body></html>"
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_home_lists_accounts() {
        let html = render_home(["alice", "bob"].into_iter(), "k1");
        assert!(html.contains("<a href=\"/instagram/feed/alice?api_key=k1\">alice</a>"));
        assert!(html.contains("/instagram/feed/bob?api_key=k1"));
        assert!(html.contains("<a href=\"/instagram/auth?api_key=k1\">Connect Instagram</a>"));
    }

    #[test]
    fn test_render_home_without_accounts() {
        let html = render_home(std::iter::empty(), "k1");
        assert!(html.contains("No connected accounts"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    }
}
