use lambda_router::{
    handler, ConfigOptions, ErrorResponse, RawEvent, Response, Router, RouterError, ValidationIssue,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn example_router() -> Router {
    let mut router = Router::new();
    router.configure(ConfigOptions::new().url_prefix("/my-api"));
    router
        .get(
            "/foo/bar/:id",
            vec![
                handler(|_, _| async { Ok(json!({ "extraData": { "foo": "bar" } })) }),
                handler(|_, ctx| async move {
                    Ok(json!({
                        "id": ctx.route_param("id"),
                        "foo": ctx.query_param("foo"),
                        "extra": ctx.get("extraData"),
                    }))
                }),
            ],
        )
        .unwrap();
    router
        .post(
            "/bar/baz",
            vec![handler(|_, ctx| async move {
                Ok(json!({ "statusCode": 201, "body": ctx.request_body() }))
            })],
        )
        .unwrap();
    router
}

#[tokio::test]
async fn test_get_with_params_query_and_chain_context() {
    let router = example_router();
    let event = RawEvent::new("GET", "/my-api/foo/bar/1").with_query("foo", "2");

    let response = router.dispatch(event).await;
    assert_eq!(
        response,
        Response::new(200, json!({ "id": "1", "foo": "2", "extra": { "foo": "bar" } }))
    );
}

#[tokio::test]
async fn test_post_with_explicit_status_and_body() {
    let router = example_router();
    let event = RawEvent::new("POST", "/my-api/bar/baz").with_body(r#"{"name":"ada"}"#);

    let response = router.dispatch(event).await;
    assert_eq!(response, Response::new(201, json!({ "name": "ada" })));
}

#[tokio::test]
async fn test_malformed_body_is_passed_as_text() {
    let router = example_router();
    let event = RawEvent::new("POST", "/my-api/bar/baz").with_body("not json{");

    let response = router.dispatch(event).await;
    assert_eq!(response, Response::new(201, json!("not json{")));
}

#[tokio::test]
async fn test_body_ignored_for_get() {
    let mut router = Router::new();
    router
        .get(
            "/peek",
            vec![handler(|_, ctx| async move {
                Ok(json!({ "hasBody": ctx.request_body().is_some() }))
            })],
        )
        .unwrap();

    let response = router
        .dispatch(RawEvent::new("GET", "/peek").with_body(r#"{"a":1}"#))
        .await;
    assert_eq!(response.body, json!({ "hasBody": false }));
}

#[tokio::test]
async fn test_unknown_route_with_custom_handler() {
    let mut router = example_router();
    router.configure(ConfigOptions::new().error_handler(|err| {
        if err.is_no_end_point() {
            ErrorResponse::status(404).with_body("no such route")
        } else {
            ErrorResponse::default()
        }
    }));

    let response = router.dispatch(RawEvent::new("GET", "/nowhere")).await;
    assert_eq!(response, Response::new(404, json!("no such route")));
}

#[tokio::test]
async fn test_unknown_route_with_default_handler() {
    let router = example_router();
    let response = router.dispatch(RawEvent::new("DELETE", "/my-api/foo/bar/1")).await;
    assert_eq!(response, Response::new(500, json!("Internal Server Error")));
}

#[tokio::test]
async fn test_handler_error_status_gets_reason_phrase() {
    let mut router = Router::new();
    router
        .get(
            "/teapot",
            vec![handler(|_, _| async { Err(RouterError::with_status(418)) })],
        )
        .unwrap();

    let response = router.dispatch(RawEvent::new("GET", "/teapot")).await;
    assert_eq!(response, Response::new(418, json!("I'm a teapot")));
}

#[tokio::test]
async fn test_internal_error_defaults_to_500() {
    let mut router = Router::new();
    router
        .get(
            "/boom",
            vec![handler(|_, _| async {
                Err(RouterError::from(anyhow::anyhow!("database unavailable")))
            })],
        )
        .unwrap();

    let response = router.dispatch(RawEvent::new("GET", "/boom")).await;
    assert_eq!(response, Response::new(500, json!("Internal Server Error")));
}

#[tokio::test]
async fn test_error_stops_chain() {
    let reached = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&reached);
    let mut router = Router::new();
    router
        .get(
            "/guarded",
            vec![
                handler(|_, _| async { Err(RouterError::with_status(403).body("Forbidden")) }),
                handler(move |_, _| {
                    r.fetch_add(1, Ordering::SeqCst);
                    async { Ok(Value::Null) }
                }),
            ],
        )
        .unwrap();

    let response = router.dispatch(RawEvent::new("GET", "/guarded")).await;
    assert_eq!(response, Response::new(403, json!("Forbidden")));
    assert_eq!(reached.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_prefix_is_bound_at_registration() {
    let mut router = Router::new();
    router.configure(ConfigOptions::new().url_prefix("/v1"));
    router
        .get("/ping", vec![handler(|_, _| async { Ok(json!("pong")) })])
        .unwrap();
    router.configure(ConfigOptions::new().url_prefix("/v2"));

    assert_eq!(router.dispatch(RawEvent::new("GET", "/v1/ping")).await.status_code, 200);
    assert_eq!(router.dispatch(RawEvent::new("GET", "/v2/ping")).await.status_code, 500);
}

#[tokio::test]
async fn test_chain_sees_earlier_results() {
    let mut router = Router::new();
    router
        .get(
            "/chain",
            vec![
                handler(|_, _| async { Ok(json!({ "x": 1 })) }),
                handler(|_, _| async { Ok(json!({ "y": 2 })) }),
                handler(|_, ctx| async move {
                    Ok(json!({ "ok": ctx.get("x") == Some(&json!(1)) && ctx.contains_key("y") }))
                }),
            ],
        )
        .unwrap();

    let response = router.dispatch(RawEvent::new("GET", "/chain")).await;
    assert_eq!(response.body, json!({ "ok": true }));
}

#[tokio::test]
async fn test_validator_rejects_with_400() {
    let mut router = Router::new();
    router
        .get(
            "/items/:id",
            vec![handler(|_, ctx| async move { Ok(json!({ "id": ctx.route_param("id") })) })],
        )
        .unwrap();
    router
        .validator(
            http::Method::GET,
            "/items/:id",
            |_: &RawEvent, ctx: &lambda_router::DispatchContext| {
                match ctx.route_param("id").map(str::parse::<u64>) {
                    Some(Ok(_)) => Ok(()),
                    _ => Err(vec![ValidationIssue::new("path.id", "type", "id must be numeric")]),
                }
            },
        )
        .unwrap();

    let ok = router.dispatch(RawEvent::new("GET", "/items/7")).await;
    assert_eq!(ok, Response::new(200, json!({ "id": "7" })));

    let bad = router.dispatch(RawEvent::new("GET", "/items/seven")).await;
    assert_eq!(bad.status_code, 400);
    assert_eq!(
        bad.body,
        json!({ "errors": [{ "location": "path.id", "kind": "type", "message": "id must be numeric" }] })
    );
}

#[tokio::test]
async fn test_dispatch_value_accepts_host_events() {
    let router = example_router();
    let response = router
        .dispatch_value(json!({
            "httpMethod": "GET",
            "path": "/my-api/foo/bar/9",
            "queryStringParameters": { "foo": "x" },
            "requestContext": { "stage": "prod" }
        }))
        .await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body["id"], json!("9"));
    assert_eq!(response.body["foo"], json!("x"));
}

#[tokio::test]
async fn test_dispatch_value_rejects_malformed_events() {
    let seen = Arc::new(AtomicUsize::new(0));
    let s = Arc::clone(&seen);
    let mut router = example_router();
    router.configure(ConfigOptions::new().error_handler(move |err| {
        if matches!(err, RouterError::InvalidEvent { .. }) {
            s.fetch_add(1, Ordering::SeqCst);
        }
        ErrorResponse::status(400)
    }));

    let response = router.dispatch_value(json!({ "httpMethod": "GET" })).await;
    assert_eq!(response, Response::new(400, json!("Bad Request")));

    let response = router.dispatch(RawEvent { path: "/x".into(), ..RawEvent::default() }).await;
    assert_eq!(response.status_code, 400);
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_custom_event_mapper() {
    let mut router = Router::new();
    router
        .get("/rewritten", vec![handler(|_, _| async { Ok(json!("mapped")) })])
        .unwrap();
    router.configure(ConfigOptions::new().event_mapper(|event| {
        let mut mapped = lambda_router::event::identity_mapper(event)?;
        mapped.path = mapped.path.replace("/legacy", "/rewritten");
        Ok(mapped)
    }));

    let response = router.dispatch(RawEvent::new("GET", "/legacy")).await;
    assert_eq!(response, Response::new(200, json!("mapped")));
}

#[tokio::test]
async fn test_concurrent_dispatches_share_router() {
    let router = Arc::new(example_router());
    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let router = Arc::clone(&router);
            tokio::spawn(async move {
                router
                    .dispatch(RawEvent::new("GET", format!("/my-api/foo/bar/{i}")))
                    .await
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let response = task.await.unwrap();
        assert_eq!(response.body["id"], json!(i.to_string()));
    }
}

#[tokio::test]
async fn test_repeat_registration_runs_appended_handlers_in_order() {
    let mut router = Router::new();
    router
        .get("/a", vec![handler(|_, _| async { Ok(json!({ "trace": "A" })) })])
        .unwrap();
    router
        .get(
            "/a",
            vec![
                handler(|_, ctx| async move {
                    Ok(json!({ "trace": format!("{}B", ctx.get("trace").and_then(Value::as_str).unwrap_or("")) }))
                }),
                handler(|_, ctx| async move { Ok(json!({ "seen": ctx.get("trace") })) }),
            ],
        )
        .unwrap();

    let response = router.dispatch(RawEvent::new("GET", "/a")).await;
    assert_eq!(response, Response::new(200, json!({ "seen": "AB" })));
}

#[tokio::test]
async fn test_validator_before_handlers_does_not_shadow_later_route() {
    let mut router = Router::new();
    router
        .validator(
            http::Method::GET,
            "/users/:id",
            |_: &RawEvent, _: &lambda_router::DispatchContext| -> Result<(), Vec<ValidationIssue>> {
                Ok(())
            },
        )
        .unwrap();
    router
        .get("/users/me", vec![handler(|_, _| async { Ok(json!("me")) })])
        .unwrap();

    let response = router.dispatch(RawEvent::new("GET", "/users/me")).await;
    assert_eq!(response, Response::new(200, json!("me")));
}

#[tokio::test]
async fn test_malformed_event_is_handled_inside_dispatch_span() {
    let _subscriber = tracing::subscriber::set_default(tracing_subscriber::registry());

    let in_span = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&in_span);
    let mut router = Router::new();
    router.configure(ConfigOptions::new().error_handler(move |_| {
        if tracing::Span::current().metadata().map(|m| m.name()) == Some("dispatch") {
            seen.fetch_add(1, Ordering::SeqCst);
        }
        ErrorResponse::status(400)
    }));

    let response = router.dispatch_value(json!({ "httpMethod": "GET" })).await;
    assert_eq!(response.status_code, 400);
    assert_eq!(in_span.load(Ordering::SeqCst), 1);
}
