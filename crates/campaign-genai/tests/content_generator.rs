//! Integration tests for `ContentGenerator` using wiremock HTTP mocks.

use std::sync::Arc;

use campaign_core::{parse_brand_profile, BrandProfile, CampaignBrief, Platform};
use campaign_genai::{ContentGenerator, GenerationError, ModelEndpoint};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/models/gemini-test:generateContent";

fn brand() -> Arc<BrandProfile> {
    let yaml = r"
name: Vallarta Vows
description: a wedding agency in Puerto Vallarta
founder: { name: Robin Manoogian, title: Founder, experience: 15+ years }
contact_lines: ['WhatsApp USA: +1 (646) 216-8516']
specialties:
  - service: Catering Menu
    knowledge: Taco Night Wedding Menu with Chicken Mole and Churros.
    image_direction: Close-up glossy food photography, 8k
";
    Arc::new(parse_brand_profile(yaml).expect("test brand"))
}

fn generator(base_url: &str, api_key: Option<&str>) -> ContentGenerator {
    let endpoint =
        ModelEndpoint::new(api_key.map(ToOwned::to_owned), "gemini-test").with_base_url(base_url);
    ContentGenerator::new(endpoint, brand()).expect("generator construction should not fail")
}

fn catering_brief() -> CampaignBrief {
    CampaignBrief {
        service: "Catering Menu".to_string(),
        audience: "Luxury Seekers".to_string(),
        tone: "Elegant & Timeless".to_string(),
        music_choice: String::new(),
        aesthetic_profile: "Bright & Airy".to_string(),
        feature_founder: false,
    }
}

fn model_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn catering_output() -> String {
    json!({
        "facebook": "Savor Chicken Mole at your beachfront reception.",
        "instagram": "Taco Night, but make it bespoke.",
        "reels": "Slow pan over the churro tower.",
        "tiktok": "POV: your guests meet the taco cart.",
        "youtube": "Catering Menu Tour | Taco Night & Mexican Buffet",
        "imagePrompt": "Close-up glossy food photography, 8k, Mexican wedding buffet"
    })
    .to_string()
}

#[tokio::test]
async fn generate_returns_content_for_every_platform() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(query_param("key", "test-key"))
        .and(body_string_contains("Chicken Mole"))
        .and(body_string_contains("responseMimeType"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(&catering_output())))
        .expect(1)
        .mount(&server)
        .await;

    let content = generator(&server.uri(), Some("test-key"))
        .generate(&catering_brief())
        .await
        .expect("generation should succeed");

    for platform in Platform::ALL {
        assert!(
            !content.text(platform).trim().is_empty(),
            "{platform} text should be non-empty"
        );
    }
    assert!(content.text(Platform::Facebook).contains("Chicken Mole"));
    assert!(content.image_prompt().contains("food photography"));
}

#[tokio::test]
async fn generate_tolerates_code_fences_and_prose() {
    let server = MockServer::start().await;
    let wrapped = format!(
        "```json\nHere is your campaign:\n{}\nLet me know!\n```",
        catering_output()
    );

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(&wrapped)))
        .mount(&server)
        .await;

    let content = generator(&server.uri(), Some("test-key"))
        .generate(&catering_brief())
        .await
        .expect("fenced output should still parse");
    assert!(content.text(Platform::Tiktok).contains("taco cart"));
}

#[tokio::test]
async fn generate_surfaces_api_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&server)
        .await;

    let err = generator(&server.uri(), Some("bad-key"))
        .generate(&catering_brief())
        .await
        .unwrap_err();
    assert!(
        matches!(err, GenerationError::Api(ref m) if m == "API key not valid."),
        "expected Api error, got: {err:?}"
    );
}

#[tokio::test]
async fn generate_fails_when_no_candidates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = generator(&server.uri(), Some("test-key"))
        .generate(&catering_brief())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResponse), "got: {err:?}");
}

#[tokio::test]
async fn generate_fails_on_unparseable_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(model_reply("I'd love to help with that!")),
        )
        .mount(&server)
        .await;

    let err = generator(&server.uri(), Some("test-key"))
        .generate(&catering_brief())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Malformed(_)), "got: {err:?}");
}

#[tokio::test]
async fn generate_without_api_key_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = generator(&server.uri(), None)
        .generate(&catering_brief())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Configuration(_)), "got: {err:?}");
}

#[tokio::test]
async fn founder_brief_sends_first_person_instruction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(body_string_contains("first person as Robin Manoogian"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(&catering_output())))
        .expect(1)
        .mount(&server)
        .await;

    let brief = CampaignBrief {
        feature_founder: true,
        ..catering_brief()
    };
    generator(&server.uri(), Some("test-key"))
        .generate(&brief)
        .await
        .expect("generation should succeed");
}
