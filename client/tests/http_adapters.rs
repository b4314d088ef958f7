//! Integration tests for the reqwest adapters against a stub REST server.
//!
//! These tests cover the wire contract end to end: paths and query strings,
//! expected status codes, the `Authorization` header following the session,
//! and store state after failures.

use std::sync::Arc;
use std::time::Duration;

use board_client::domain::ports::{AuthService, ResourceClient};
use board_client::domain::{
    BulletinDraft, BulletinEntry, ListStore, LoadStatus, LoginCredentials, Price, PriceDraft,
    PriceKey, SessionHandle, SessionService,
};
use board_client::outbound::{HttpAuthService, HttpResourceClient, HttpTransport};
use board_client::test_support::{FixedClock, temp_token_store};
use chrono::Utc;
use pagination::PageRequest;

mod support;

use support::{StubServer, entry_json, page_json};

const POSTS: &str = "/bulletin-board/posts";

fn transport(handle: SessionHandle) -> HttpTransport {
    HttpTransport::new(Duration::from_secs(5), handle).expect("reqwest client")
}

fn posts_client(server: &StubServer, handle: SessionHandle) -> HttpResourceClient<BulletinEntry> {
    HttpResourceClient::new(transport(handle), server.url(POSTS))
}

fn draft() -> BulletinDraft {
    BulletinDraft {
        title: "Hello".to_owned(),
        content: "World".to_owned(),
    }
}

fn credentials() -> LoginCredentials {
    LoginCredentials::try_from_parts("a@b.com", "x").expect("valid credentials")
}

#[actix_rt::test]
async fn list_sends_take_and_page_and_decodes_the_envelope() {
    let server = StubServer::start();
    server.respond(200, page_json(2, 5, 8, &[6, 7, 8]));
    let client = posts_client(&server, SessionHandle::default());

    let page = client
        .list(PageRequest::new(5, 2))
        .await
        .expect("page decodes");

    assert_eq!(page.pagination().total_pages, 2);
    assert_eq!(page.records().len(), 3);
    let request = &server.requests()[0];
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, POSTS);
    assert_eq!(request.query, "take=5&page=2");
    assert_eq!(request.accept.as_deref(), Some("application/json"));
    assert_eq!(request.authorization, None);
    server.stop().await;
}

#[actix_rt::test]
async fn list_rejects_envelopes_that_break_pagination_invariants() {
    let server = StubServer::start();
    server.respond(200, page_json(3, 5, 8, &[1]));
    let client = posts_client(&server, SessionHandle::default());

    let error = client
        .list(PageRequest::new(5, 3))
        .await
        .expect_err("page 3 of 2 is invalid");

    assert_eq!(error.kind(), "Decode");
    server.stop().await;
}

#[actix_rt::test]
async fn fetching_past_the_last_page_is_harmless() {
    let server = StubServer::start();
    server
        .respond(200, page_json(1, 5, 8, &[1, 2, 3, 4, 5]))
        .respond(200, page_json(2, 5, 8, &[6, 7, 8]))
        .respond(200, page_json(3, 5, 8, &[]));
    let store = ListStore::new(Arc::new(posts_client(&server, SessionHandle::default())), 5);

    for _ in 0..3 {
        store.fetch_next_page().await.expect("page applies");
    }

    assert_eq!(server.requests()[2].query, "take=5&page=3");
    assert_eq!(store.len(), 8);
    assert_eq!(store.pagination().current_page, 2);
    assert!(store.reached_end());
    server.stop().await;
}

#[actix_rt::test]
async fn unfamiliar_envelope_fields_are_ignored() {
    let server = StubServer::start();
    server.respond(
        200,
        format!(
            r#"{{"page":{{"currentPage":1,"pageSize":5,"totalPages":1,"totalRecords":1}},"records":[{}],"links":{{}}}}"#,
            entry_json(1)
        ),
    );
    let client = posts_client(&server, SessionHandle::default());

    let page = client.list(PageRequest::new(5, 1)).await.expect("page decodes");

    assert_eq!(page.records().len(), 1);
    server.stop().await;
}

#[actix_rt::test]
async fn create_requires_created_status() {
    let server = StubServer::start();
    server
        .respond(201, entry_json(9))
        .respond(200, entry_json(10));
    let client = posts_client(&server, SessionHandle::default());

    let created = client.create(&draft()).await.expect("201 accepted");
    let error = client.create(&draft()).await.expect_err("200 rejected");

    assert_eq!(created.id, "9");
    assert_eq!(error.status(), Some(200));
    let request = &server.requests()[0];
    assert_eq!(request.method, "POST");
    let body: serde_json::Value = serde_json::from_str(&request.body).expect("json body");
    assert_eq!(body, serde_json::json!({"title": "Hello", "content": "World"}));
    server.stop().await;
}

#[actix_rt::test]
async fn update_get_and_remove_address_one_record() {
    let server = StubServer::start();
    server
        .respond(200, entry_json(7))
        .respond(200, entry_json(7))
        .respond(200, "");
    let client = posts_client(&server, SessionHandle::default());

    client.update(&"7".to_owned(), &draft()).await.expect("update");
    client.get(&"7".to_owned()).await.expect("get");
    client.remove(&"7".to_owned()).await.expect("remove ignores body");

    let seen: Vec<(String, String)> = server
        .requests()
        .into_iter()
        .map(|r| (r.method, r.path))
        .collect();
    let record = format!("{POSTS}/7");
    assert_eq!(
        seen,
        vec![
            ("PUT".to_owned(), record.clone()),
            ("GET".to_owned(), record.clone()),
            ("DELETE".to_owned(), record),
        ]
    );
    server.stop().await;
}

#[actix_rt::test]
async fn composite_ids_span_two_path_segments() {
    let server = StubServer::start();
    server
        .respond(200, r#"[{"productId":5,"userId":2,"price":1.5}]"#)
        .respond(200, r#"{"productId":5,"userId":2,"price":2.5}"#);
    let client: HttpResourceClient<Price> =
        HttpResourceClient::new(transport(SessionHandle::default()), server.url("/price"));
    let key = PriceKey {
        product_id: 5,
        user_id: 2,
    };

    let all = client.list_all().await.expect("bare array decodes");
    let updated = client
        .update(&key, &PriceDraft { price: 2.5 })
        .await
        .expect("update");

    assert_eq!(all.len(), 1);
    assert!((updated.price - 2.5).abs() < f64::EPSILON);
    assert_eq!(server.requests()[1].path, "/price/5/2");
    server.stop().await;
}

#[actix_rt::test]
async fn server_error_leaves_the_store_untouched() {
    let server = StubServer::start();
    server
        .respond(200, page_json(1, 2, 4, &[1, 2]))
        .respond(500, "  internal\n error ");
    let store = ListStore::new(Arc::new(posts_client(&server, SessionHandle::default())), 2);
    store.fetch_next_page().await.expect("first page");

    let error = store.fetch_next_page().await.expect_err("500");

    assert_eq!(
        error,
        board_client::domain::ports::RequestError::unexpected_status(
            500_u16,
            200_u16,
            "internal error"
        )
    );
    assert_eq!(store.len(), 2);
    assert_eq!(store.pagination().current_page, 1);
    assert_eq!(store.status(), LoadStatus::Loaded);
    server.stop().await;
}

#[actix_rt::test]
async fn unreachable_server_is_a_transport_error() {
    let server = StubServer::start();
    let url = server.url(POSTS);
    server.stop().await;
    let client: HttpResourceClient<BulletinEntry> =
        HttpResourceClient::new(transport(SessionHandle::default()), url);

    let error = client.list_all().await.expect_err("connection refused");

    assert_eq!(error.kind(), "Transport");
}

#[actix_rt::test]
async fn login_token_is_sent_until_logout() {
    let server = StubServer::start();
    server
        .respond(
            200,
            r#"{"access_token":"tok123","token_type":"Bearer","expires_in":"3600"}"#,
        )
        .respond(200, "[]")
        .respond(200, "[]");
    let auth = HttpAuthService::new(transport(SessionHandle::default()), server.url("/auth"));
    let (_dir, token_store) = temp_token_store();
    let session = SessionService::new(
        Arc::new(auth),
        Arc::new(token_store),
        Arc::new(FixedClock::new(Utc::now())),
    );
    let posts = posts_client(&server, session.handle());

    session.login(&credentials()).await.expect("login");
    posts.list_all().await.expect("authenticated request");
    session.logout().expect("logout");
    posts.list_all().await.expect("anonymous request");

    let requests = server.requests();
    assert_eq!(requests[0].path, "/auth/login");
    let login: serde_json::Value = serde_json::from_str(&requests[0].body).expect("json body");
    assert_eq!(login, serde_json::json!({"email": "a@b.com", "password": "x"}));
    assert_eq!(requests[0].authorization, None);
    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer tok123"));
    assert_eq!(requests[2].authorization, None);
    server.stop().await;
}

#[actix_rt::test]
async fn register_expects_created_and_an_empty_body() {
    let server = StubServer::start();
    server.respond(201, "").respond(409, r#"{"message":"exists"}"#);
    let auth = HttpAuthService::new(transport(SessionHandle::default()), server.url("/auth"));

    auth.register(&credentials()).await.expect("201 accepted");
    let error = auth
        .register(&credentials())
        .await
        .expect_err("conflict rejected");

    assert_eq!(server.requests()[0].path, "/auth/register");
    assert_eq!(error.status(), Some(409));
    server.stop().await;
}

#[actix_rt::test]
async fn rejected_login_surfaces_unauthorized() {
    let server = StubServer::start();
    server.respond(401, r#"{"message":"bad credentials"}"#);
    let auth = HttpAuthService::new(transport(SessionHandle::default()), server.url("/auth"));

    let error = auth.login(&credentials()).await.expect_err("401");

    assert!(error.is_unauthorized());
    server.stop().await;
}
