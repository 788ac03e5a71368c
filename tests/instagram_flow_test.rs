//! # 授权流程集成测试
//!
//! 授权地址生成、回调令牌交换与凭据保存

mod common;

use common::{Harness, mount_exchange_chain, mount_identity, mount_long_lived, mount_short_lived};
use pretty_assertions::assert_eq;
use rstest::rstest;
use social_feed::ServiceError;
use social_feed::cache::CredentialStore;
use social_feed::instagram::{Credential, ExchangeStep};
use url::Url;
use wiremock::matchers::any;
use wiremock::{Mock, ResponseTemplate};

fn credential(token: &str, username: &str, user_id: i64) -> Credential {
    Credential {
        access_token: token.to_string(),
        user_name: username.to_string(),
        user_id,
    }
}

fn query_values(url: &Url, name: &str) -> Vec<String> {
    url.query_pairs()
        .filter(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .collect()
}

#[tokio::test]
async fn test_authorization_url_parameters() {
    let harness = Harness::start().await;
    let url = harness.context.auth_flow.authorization_url("req-1").unwrap();

    assert_eq!(url.host_str(), Some("api.instagram.com"));
    assert_eq!(url.path(), "/oauth/authorize");

    assert_eq!(query_values(&url, "response_type"), vec!["code"]);
    assert_eq!(
        query_values(&url, "redirect_uri"),
        vec!["http://localhost:8080/instagram/auth/callback"]
    );
    assert_eq!(query_values(&url, "client_id"), vec!["app-1"]);
    assert_eq!(query_values(&url, "scope"), vec!["user_profile,user_media"]);
}

#[tokio::test]
async fn test_callback_success_persists_credential() {
    let harness = Harness::start().await;
    mount_short_lived(&harness.server, "abc", 200, "s1", 42).await;
    mount_long_lived(&harness.server, "s1", 200, "l1").await;
    mount_identity(&harness.server, "l1", 200, "alice").await;

    let account = harness
        .context
        .auth_flow
        .handle_callback("req-1", Some("code=abc"))
        .await
        .unwrap();

    assert_eq!(account.feed_path, "/instagram/feed/alice");
    assert_eq!(account.credential, credential("l1", "alice", 42));
    assert_eq!(
        harness.store.get("alice").await.unwrap(),
        credential("l1", "alice", 42)
    );
}

#[rstest]
#[case::short_lived(ExchangeStep::ShortLivedToken)]
#[case::long_lived(ExchangeStep::LongLivedToken)]
#[case::identity(ExchangeStep::Identity)]
#[tokio::test]
async fn test_exchange_failure_leaves_store_untouched(#[case] failing: ExchangeStep) {
    let harness = Harness::start().await;
    let status = |step: ExchangeStep| if step == failing { 400 } else { 200 };

    mount_short_lived(&harness.server, "abc", status(ExchangeStep::ShortLivedToken), "s1", 42).await;
    mount_long_lived(&harness.server, "s1", status(ExchangeStep::LongLivedToken), "l1").await;
    mount_identity(&harness.server, "l1", status(ExchangeStep::Identity), "alice").await;

    let err = harness
        .context
        .auth_flow
        .handle_callback("req-1", Some("code=abc"))
        .await
        .unwrap_err();

    assert_eq!(err.exchange_step(), Some(failing));
    assert!(harness.store.list_usernames().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_exchange_failure_keeps_previous_credential() {
    let harness = Harness::start().await;
    let previous = credential("old-token", "alice", 42);
    harness.store.put("alice", &previous).await.unwrap();

    mount_short_lived(&harness.server, "abc", 200, "s1", 42).await;
    mount_long_lived(&harness.server, "s1", 500, "l1").await;

    let result = harness
        .context
        .auth_flow
        .handle_callback("req-1", Some("code=abc"))
        .await;

    assert!(result.is_err());
    assert_eq!(harness.store.get("alice").await.unwrap(), previous);
}

#[tokio::test]
async fn test_malformed_exchange_response_is_rejected() {
    let harness = Harness::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&harness.server)
        .await;

    let err = harness
        .context
        .auth_flow
        .handle_callback("req-1", Some("code=abc"))
        .await
        .unwrap_err();

    assert_eq!(err.exchange_step(), Some(ExchangeStep::ShortLivedToken));
    assert!(harness.store.list_usernames().await.unwrap().is_empty());
}

#[rstest]
#[case::missing(None)]
#[case::without_code(Some("state=1"))]
#[case::duplicated(Some("code=a&code=b"))]
#[tokio::test]
async fn test_invalid_callback_query_skips_exchange(#[case] query: Option<&str>) {
    let harness = Harness::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.server)
        .await;

    let err = harness
        .context
        .auth_flow
        .handle_callback("req-1", query)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Callback { .. }));
    assert!(harness.store.list_usernames().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reauthorization_overwrites_credential() {
    let harness = Harness::start().await;
    mount_short_lived(&harness.server, "first", 200, "s1", 42).await;
    mount_long_lived(&harness.server, "s1", 200, "l1").await;
    mount_identity(&harness.server, "l1", 200, "alice").await;
    mount_short_lived(&harness.server, "second", 200, "s2", 42).await;
    mount_long_lived(&harness.server, "s2", 200, "l2").await;
    mount_identity(&harness.server, "l2", 200, "alice").await;

    let flow = &harness.context.auth_flow;
    flow.handle_callback("req-1", Some("code=first")).await.unwrap();
    flow.handle_callback("req-2", Some("code=second")).await.unwrap();

    assert_eq!(
        harness.store.get("alice").await.unwrap(),
        credential("l2", "alice", 42)
    );
    assert_eq!(harness.store.list_usernames().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_connected_accounts_are_listed() {
    let harness = Harness::start().await;
    let accounts = [("c1", "alice", 1), ("c2", "bob", 2), ("c3", "carol", 3)];
    for (code, username, user_id) in accounts {
        mount_exchange_chain(&harness.server, code, username, user_id).await;
    }

    for (code, _, _) in accounts {
        let query = format!("code={code}");
        harness
            .context
            .auth_flow
            .handle_callback("req-1", Some(query.as_str()))
            .await
            .unwrap();
    }

    let usernames: Vec<String> = harness
        .store
        .list_usernames()
        .await
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(usernames, vec!["alice", "bob", "carol"]);

    for (_, username, user_id) in accounts {
        let stored = harness.store.get(username).await.unwrap();
        assert_eq!(stored, credential(&format!("long-{username}"), username, user_id));
    }
}
