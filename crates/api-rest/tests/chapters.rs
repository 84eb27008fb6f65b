use api_rest::{query_param_resolver, router, StoryHandler};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use cyoa_core::{Story, Template};
use http_body_util::BodyExt;
use tower::ServiceExt;

fn sample_story() -> Story {
    let json = serde_json::json!({
        "intro": {
            "title": "Intro",
            "story": ["p1"],
            "options": [{"text": "go", "arc": "ch2"}]
        },
        "ch2": {
            "title": "Chapter Two",
            "story": ["The road forks."],
            "options": [
                {"text": "left", "arc": "intro"},
                {"text": "right", "arc": "ch3"}
            ]
        },
        "epilogue": {
            "title": "Epilogue",
            "story": ["It is over."]
        }
    });
    Story::from_json(&json.to_string()).expect("parse story")
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    request(app, Method::GET, uri).await
}

async fn request(app: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    (status, String::from_utf8(bytes.to_vec()).expect("utf8 body"))
}

#[tokio::test]
async fn root_and_intro_serve_the_intro_chapter() {
    let app = router(StoryHandler::new(sample_story()));

    for uri in ["/", "/intro"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body.contains("Intro"), "{uri}: {body}");
        assert!(body.contains(r#"href="/ch2""#), "{uri}: {body}");
        assert!(body.contains(">go</a>"), "{uri}: {body}");
    }
}

#[tokio::test]
async fn chapter_is_served_as_html() {
    let app = router(StoryHandler::new(sample_story()));
    let response = app
        .oneshot(Request::get("/ch2").body(Body::empty()).expect("request"))
        .await
        .expect("infallible");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("text/html"), "{content_type}");
}

#[tokio::test]
async fn options_render_in_order() {
    let app = router(StoryHandler::new(sample_story()));
    let (status, body) = get(&app, "/ch2").await;

    assert_eq!(status, StatusCode::OK);
    let left = body.find(r#"href="/intro""#).expect("left link");
    let right = body.find(r#"href="/ch3""#).expect("right link");
    assert!(left < right);
}

#[tokio::test]
async fn unknown_chapter_is_not_found() {
    let app = router(StoryHandler::new(sample_story()));

    let (status, body) = get(&app, "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Chapter not found");
}

#[tokio::test]
async fn dangling_option_is_not_found_when_followed() {
    let app = router(StoryHandler::new(sample_story()));

    let (status, body) = get(&app, "/ch2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"href="/ch3""#));

    let (status, body) = get(&app, "/ch3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Chapter not found");
}

#[tokio::test]
async fn any_method_reaches_the_handler() {
    let app = router(StoryHandler::new(sample_story()));

    let (status, body) = request(&app, Method::POST, "/intro").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Intro"));
}

#[tokio::test]
async fn render_failure_is_scoped_to_the_affected_chapter() {
    // Only chapters with options reach the unknown field.
    let template = Template::compile(
        "<h1>{{.Title}}</h1>{{range .Options}}<a href=\"/{{.Chapter}}\">{{.Weight}}</a>{{end}}",
    )
    .expect("well-formed template");
    let app = router(
        StoryHandler::builder(sample_story())
            .template(template)
            .build(),
    );

    let (status, body) = get(&app, "/intro").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Something went wrong...");

    let (status, body) = get(&app, "/epilogue").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h1>Epilogue</h1>");

    let (status, _) = get(&app, "/intro").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn render_failure_does_not_leak_partial_output() {
    let template = Template::compile("<h1>{{.Title}}</h1>{{.Secret}}").expect("compile");
    let app = router(
        StoryHandler::builder(sample_story())
            .template(template)
            .build(),
    );

    let (status, body) = get(&app, "/intro").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("<h1>"));
    assert!(!body.contains("Secret"));
}

#[tokio::test]
async fn constant_resolver_serves_intro_everywhere() {
    let app = router(
        StoryHandler::builder(sample_story())
            .path_resolver(|_: &axum::http::request::Parts| "intro".to_string())
            .build(),
    );

    for uri in ["/", "/ch2", "/nowhere", "/deeply/nested/path"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body.contains("<h1>Intro</h1>"), "{uri}: {body}");
    }
}

#[tokio::test]
async fn query_resolver_routes_by_parameter() {
    let app = router(
        StoryHandler::builder(sample_story())
            .shared_path_resolver(query_param_resolver("chapter"))
            .build(),
    );

    let (status, body) = get(&app, "/?chapter=ch2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Chapter Two"));

    let (status, body) = get(&app, "/?chapter=missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Chapter not found");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_see_consistent_chapters() {
    let app = router(StoryHandler::new(sample_story()));
    let (_, expected_intro) = get(&app, "/intro").await;
    let (_, expected_ch2) = get(&app, "/ch2").await;

    let mut tasks = Vec::new();
    for i in 0..64 {
        let app = app.clone();
        let uri = match i % 3 {
            0 => "/intro",
            1 => "/ch2",
            _ => "/nowhere",
        };
        tasks.push(tokio::spawn(async move { (uri, get(&app, uri).await) }));
    }

    for task in tasks {
        let (uri, (status, body)) = task.await.expect("task");
        match uri {
            "/intro" => {
                assert_eq!(status, StatusCode::OK);
                assert_eq!(body, expected_intro);
            }
            "/ch2" => {
                assert_eq!(status, StatusCode::OK);
                assert_eq!(body, expected_ch2);
            }
            _ => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, "Chapter not found");
            }
        }
    }
}

#[tokio::test]
async fn encoded_links_reach_chapters_with_spaces_and_accents() {
    let json = serde_json::json!({
        "intro": {
            "title": "Intro",
            "options": [
                {"text": "east", "arc": "new york"},
                {"text": "coffee", "arc": "café"}
            ]
        },
        "new york": {"title": "Visiting New York"},
        "café": {"title": "Le Café"}
    });
    let story = Story::from_json(&json.to_string()).expect("parse story");
    let app = router(StoryHandler::new(story));

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"href="/new york""#), "{body}");

    let (status, body) = get(&app, "/new%20york").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Visiting New York"), "{body}");

    let (status, body) = get(&app, "/caf%C3%A9").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Le Café"), "{body}");
}
