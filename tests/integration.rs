use poster_generator::{
    ai::{
        GeminiImageClient, MockImageClient, MockTextClient, OpenAiTextClient,
        TextGenerationService,
    },
    app::{App, AppServices},
    fields::{parse_fields, resolve_theme, select_fields, FALLBACK_THEME},
    models::{FieldMapping, FieldRequest, GenerateFieldsRequest, PosterField, ThemeDirective},
    prompts::{compose_field_instruction, compose_poster_prompt, layout_lines},
    Error,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOOTCAMP_REPLY: &str = r#"{"hero_headline":"Code Your Future","cta":"Enroll Now","suggested_theme":"A sunlit rooftop code lab with teal gradients"}"#;

fn bootcamp_body() -> GenerateFieldsRequest {
    serde_json::from_value(json!({
        "main_prompt": "Bootcamp ad",
        "include_hero_headline": true,
        "include_hero_subline": false,
        "include_description": false,
        "include_cta": true,
        "include_testimonial": false,
        "include_success_metrics": false,
        "include_target_audience": false,
        "include_cta_link": false
    }))
    .unwrap()
}

#[test]
fn test_bootcamp_scenario_without_gateways() {
    let body = bootcamp_body();
    assert_eq!(
        select_fields(&body.flags),
        vec![PosterField::HeroHeadline, PosterField::Cta]
    );

    let request = FieldRequest::try_from(body).unwrap();
    let instruction =
        compose_field_instruction(request.fields(), request.main_intent(), request.theme());
    assert!(instruction.contains("suggested_theme"));

    let mapping = parse_fields(BOOTCAMP_REPLY).unwrap();
    let keys: Vec<&str> = mapping.keys().collect();
    assert_eq!(keys, vec!["cta", "hero_headline", "suggested_theme"]);

    let theme = resolve_theme(&mapping, None);
    let prompt = compose_poster_prompt(&mapping, &theme);
    assert_eq!(layout_lines(&mapping).len(), 2);
    assert!(prompt.contains("Background Theme:\nA sunlit rooftop code lab with teal gradients"));
    assert!(!prompt.contains("hero_subline"));
}

#[tokio::test]
async fn test_full_workflow_with_mocks() {
    let text = MockTextClient::new().with_text_response(BOOTCAMP_REPLY.to_string());
    let image = MockImageClient::new();
    let image_probe = image.clone();

    let app = App::with_services(AppServices {
        text: Box::new(text),
        image: Box::new(image),
    });

    let request = FieldRequest::try_from(bootcamp_body()).unwrap();
    let mut fields = app.generate_fields(&request).await.unwrap();
    assert_eq!(fields.len(), 3);

    // Callers may edit copy between stages.
    fields.insert("cta", "Apply Today");

    let poster = app.generate_poster(&fields, None).await.unwrap();
    assert_eq!(poster.mime_type, "image/png");

    let prompt = image_probe.last_prompt().unwrap();
    assert!(prompt.contains("\"Apply Today\""));
    assert!(!prompt.contains("\"Enroll Now\""));
}

#[tokio::test]
async fn test_malformed_reply_surfaces_error() {
    let app = App::with_services(AppServices {
        text: Box::new(
            MockTextClient::new().with_text_response("Sorry, I can't help with that.".to_string()),
        ),
        image: Box::new(MockImageClient::new()),
    });

    let request =
        FieldRequest::new("Bootcamp ad", ThemeDirective::Infer, vec![PosterField::Cta]).unwrap();
    let err = app.generate_fields(&request).await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)));
}

#[tokio::test]
async fn test_provider_backed_pipeline_against_mock_servers() {
    let text_server = MockServer::start().await;
    let image_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": { "role": "assistant", "content": BOOTCAMP_REPLY },
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&text_server)
        .await;

    use base64::Engine as _;
    let png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    Mock::given(method("POST"))
        .and(path(
            "/v1beta/models/gemini-2.5-flash-image:generateContent",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "inlineData": {
                            "mimeType": "image/png",
                            "data": base64::engine::general_purpose::STANDARD.encode(&png)
                        }
                    }]
                }
            }]
        })))
        .expect(1)
        .mount(&image_server)
        .await;

    let app = App::with_services(AppServices {
        text: Box::new(
            OpenAiTextClient::new("groq-key".to_string(), "llama3-70b-8192".to_string(), 0.7)
                .with_base_url(text_server.uri()),
        ),
        image: Box::new(
            GeminiImageClient::new(
                "gemini-key".to_string(),
                "gemini-2.5-flash-image".to_string(),
            )
            .with_base_url(image_server.uri()),
        ),
    });

    let request = FieldRequest::try_from(bootcamp_body()).unwrap();
    let fields = app.generate_fields(&request).await.unwrap();
    let poster = app.generate_poster(&fields, None).await.unwrap();

    assert_eq!(poster.bytes, png);
    assert_eq!(poster.to_base64(), "iVBORw0KGgo=");
}

#[tokio::test]
async fn test_text_gateway_is_object_safe() {
    let gateways: Vec<Box<dyn TextGenerationService>> = vec![
        Box::new(MockTextClient::new().with_text_response("{\"cta\":\"Go\"}".to_string())),
        Box::new(MockTextClient::new()),
    ];

    let mut replies = Vec::new();
    for gateway in &gateways {
        replies.push(gateway.generate_text("instruction").await.unwrap());
    }
    assert_eq!(replies, vec!["{\"cta\":\"Go\"}".to_string(), "{}".to_string()]);
}

#[test]
fn test_fallback_theme_when_nothing_supplied() {
    let prompt = compose_poster_prompt(
        &FieldMapping::new().with("description", "Twelve weeks to job-ready"),
        &resolve_theme(&FieldMapping::new(), None),
    );
    assert!(prompt.contains(FALLBACK_THEME));
    assert!(prompt.contains("- Center area: Short paragraph \"Twelve weeks to job-ready\""));
}
