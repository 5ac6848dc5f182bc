use lifesim_server::chat::MockChatApi;
use lifesim_server::game::GameService;
use lifesim_server::imagegen::{ImageJobClient, MockImageTaskApi, PollConfig};
use lifesim_server::models::TaskStatus;
use lifesim_server::server::{self, AppState};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 200, 100, 255]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}

/// Bind the app on an ephemeral port with mock AI backends and return its
/// base URL. The images dir outlives the test through the returned TempDir.
async fn spawn_app(chat: MockChatApi) -> (String, TempDir) {
    let dir = TempDir::new().unwrap();

    let image_api = MockImageTaskApi::new()
        .with_status_sequence(&[TaskStatus::Pending, TaskStatus::Succeed])
        .with_image_bytes(png_bytes());
    let images = Arc::new(
        ImageJobClient::new(Arc::new(image_api), dir.path(), "Qwen/Qwen-Image".to_string())
            .with_poll_config(PollConfig {
                interval: Duration::from_millis(1),
                max_attempts: 10,
            }),
    );

    let state = Arc::new(AppState {
        game: GameService::new(Arc::new(chat), images),
    });
    let app = server::router(state, dir.path());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), dir)
}

#[tokio::test]
async fn test_start_returns_personality_and_user_data() {
    let chat = MockChatApi::new().with_response("Careful and curious dreamer.".to_string());
    let (base, _dir) = spawn_app(chat).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/start", base))
        .json(&serde_json::json!({
            "basic_info": { "gender": "F" },
            "answers": ["careful", "curious"]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["personality"], "Careful and curious dreamer.");
    assert_eq!(body["user_data"]["basic_info"]["gender"], "F");
    assert_eq!(body["user_data"]["current_stage"], 0);
}

#[tokio::test]
async fn test_quiz_questions_round_trips_model_json() {
    let questions: Vec<serde_json::Value> = (1..=5)
        .map(|i| {
            serde_json::json!({
                "question": format!("Question {i}?"),
                "options": ["A. yes", "B. no", "C. maybe"],
            })
        })
        .collect();
    let model_reply = serde_json::json!({ "questions": questions }).to_string();

    let chat = MockChatApi::new().with_response(model_reply);
    let (base, _dir) = spawn_app(chat).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/quiz_questions", base))
        .json(&serde_json::json!({ "basic_info": { "mbti": "ENTP" } }))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "parsed");
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 5);
    for question in questions {
        assert!(!question["question"].as_str().unwrap().is_empty());
        assert!(!question["options"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_quiz_questions_fall_back_on_unparseable_reply() {
    let chat = MockChatApi::new().with_response("I would rather chat about the weather.".to_string());
    let (base, _dir) = spawn_app(chat).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/quiz_questions", base))
        .json(&serde_json::json!({ "basic_info": {} }))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["questions"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_generate_stage_serves_both_generated_images() {
    let chat = MockChatApi::new()
        .with_response("A story about a crossroads.".to_string())
        .with_response("Which road?\nA. Left\nB. Right".to_string())
        .with_response("a traveler at dawn".to_string())
        .with_response("a traveler at dusk".to_string())
        .with_response("Dawn at the crossroads.".to_string())
        .with_response("Dusk falls.".to_string());
    let (base, _dir) = spawn_app(chat).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/generate_stage", base))
        .json(&serde_json::json!({
            "stage_index": 1,
            "user_data": { "personality": "restless" }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["story"], "A story about a crossroads.");
    assert_eq!(body["question"], "Which road?");
    assert_eq!(body["options"].as_array().unwrap().len(), 2);

    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);

    // The returned paths resolve through the static file route.
    for image in images {
        let path = image["path"].as_str().unwrap();
        assert!(path.starts_with("/images/"));
        let fetched = client
            .get(format!("{}{}", base, path))
            .send()
            .await
            .unwrap();
        assert_eq!(fetched.status(), 200);
        assert!(!fetched.bytes().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_generate_stage_invalid_index_is_bad_request() {
    let (base, _dir) = spawn_app(MockChatApi::new()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/generate_stage", base))
        .json(&serde_json::json!({ "stage_index": 9, "user_data": {} }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("9"));
}

#[tokio::test]
async fn test_generate_outcome_returns_single_image() {
    let chat = MockChatApi::new()
        .with_response("She takes the left road and never regrets it.".to_string())
        .with_response("a sunlit road through hills".to_string())
        .with_response("The left road.".to_string());
    let (base, _dir) = spawn_app(chat).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/generate_outcome", base))
        .json(&serde_json::json!({
            "stage_index": 1,
            "user_data": {},
            "story": "A story about a crossroads.",
            "choice": "A. Left"
        }))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["outcome"].as_str().unwrap().contains("left road"));
    assert!(body["image"]["path"].as_str().unwrap().starts_with("/images/"));
    assert_eq!(body["image"]["description"], "The left road.");
}

#[tokio::test]
async fn test_life_review_summarizes_stages() {
    let chat = MockChatApi::new().with_response("A restless but honest life.".to_string());
    let (base, _dir) = spawn_app(chat).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/life_review", base))
        .json(&serde_json::json!({
            "user_data": { "personality": "restless" },
            "stages": [
                { "story": "crossroads", "choice": "left", "outcome": "sunlit hills" }
            ]
        }))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["summary"], "A restless but honest life.");
}

#[tokio::test]
async fn test_upstream_failure_surfaces_as_error_body() {
    let chat = MockChatApi::new().failing("model service unavailable");
    let (base, _dir) = spawn_app(chat).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/start", base))
        .json(&serde_json::json!({ "basic_info": {}, "answers": [] }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("model service unavailable"));
}

#[tokio::test]
async fn test_favicon_returns_no_content() {
    let (base, _dir) = spawn_app(MockChatApi::new()).await;

    let response = reqwest::Client::new()
        .get(format!("{}/favicon.ico", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
}
