use std::time::Duration;

use berezka_chat::constants::APOLOGY_TEXT;
use berezka_chat::quick_actions::{CALCULATE_COST, CONTACT_ADMIN, REMIND_LATER};
use berezka_chat::{
    BookingObject, CalculatorError, ChatController, ReplyConfig, ReplyProvider, SendOutcome, Sender,
};
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn offline_controller() -> ChatController {
    ChatController::new(ReplyProvider::new(&ReplyConfig::offline()).unwrap())
}

fn remote_controller(base_url: &str) -> ChatController {
    let config = ReplyConfig {
        api_key: Some("test-key".to_string()),
        model: "gemini-2.0-flash".to_string(),
        base_url: base_url.to_string(),
        fallback_delay: Duration::ZERO,
        request_timeout: Some(Duration::from_secs(5)),
    };
    ChatController::new(ReplyProvider::new(&config).unwrap())
}

#[tokio::test]
async fn test_calculator_submission_sends_prompt_and_closes() {
    let mut controller = offline_controller();
    assert_eq!(
        controller.send_message(CALCULATE_COST, |_| {}).await,
        SendOutcome::CalculatorOpened
    );

    let form = controller.conversation_mut().calculator_mut();
    form.set_date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    form.next().unwrap();
    form.set_guests(4);
    form.next().unwrap();
    form.select_object("Баня".parse::<BookingObject>().unwrap());

    let outcome = controller.submit_calculation(|_| {}).await.unwrap();
    assert!(matches!(outcome, SendOutcome::Replied(_)));

    let conversation = controller.conversation();
    assert!(!conversation.calculator().is_open());
    let user = &conversation.messages()[1];
    assert_eq!(user.sender, Sender::User);
    assert_eq!(
        user.text,
        "Рассчитай стоимость: Объект: Баня, Дата: 2025-06-01, Количество человек: 4."
    );
    // "бан" is checked before the price keywords.
    assert!(conversation.messages()[2].text.starts_with("🧖"));
}

#[tokio::test]
async fn test_incomplete_calculation_is_rejected() {
    let mut controller = offline_controller();
    controller.send_message(CALCULATE_COST, |_| {}).await;
    let result = controller.submit_calculation(|_| {}).await;
    assert_eq!(result, Err(CalculatorError::WrongStep));
    assert_eq!(controller.conversation().messages().len(), 1);
    assert!(controller.conversation().calculator().is_open());
}

#[tokio::test]
async fn test_contact_admin_forwarded_as_sentence() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Я хочу связаться с администратором" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Звоните!\"}]}}]}\n\n",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = remote_controller(&server.uri());
    let outcome = controller.send_message(CONTACT_ADMIN, |_| {}).await;
    let SendOutcome::Replied(id) = outcome else {
        panic!("expected a reply, got {:?}", outcome);
    };
    assert_eq!(controller.conversation().message(id).unwrap().text, "Звоните!");
    // The visible message keeps the button label.
    assert_eq!(controller.conversation().messages()[1].text, CONTACT_ADMIN);
}

#[tokio::test]
async fn test_remind_later_offline_gets_reminder_reply() {
    let mut controller = offline_controller();
    let SendOutcome::Replied(id) = controller.send_message(REMIND_LATER, |_| {}).await else {
        panic!("expected a reply");
    };
    assert!(controller.conversation().message(id).unwrap().text.starts_with("🔔"));
}

#[tokio::test]
async fn test_remote_failure_shows_apology_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = remote_controller(&server.uri());
    let mut updates = 0;
    let outcome = controller.send_message("Привет", |_| updates += 1).await;

    let SendOutcome::Replied(id) = outcome else {
        panic!("expected a reply, got {:?}", outcome);
    };
    let conversation = controller.conversation();
    assert_eq!(updates, 1);
    assert_eq!(conversation.messages().len(), 3);
    assert_eq!(conversation.message(id).unwrap().text, APOLOGY_TEXT);
    assert!(!conversation.is_loading());
}

#[tokio::test]
async fn test_consecutive_turns() {
    let mut controller = offline_controller();
    controller.send_message("Расскажи про домики", |_| {}).await;
    controller.send_message("Где вы находитесь?", |_| {}).await;

    let messages = controller.conversation().messages();
    assert_eq!(messages.len(), 5);
    assert!(messages[2].text.starts_with("🏡"));
    assert!(messages[4].text.starts_with("📍"));
    assert_eq!(controller.history().len(), 4);
}
