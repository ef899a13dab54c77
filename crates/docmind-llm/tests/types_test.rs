use docmind_llm::Message;

#[test]
fn test_message_system() {
    let msg = Message::system("You are helpful");
    assert_eq!(msg.role(), "system");
    assert_eq!(msg.content(), "You are helpful");
}

#[test]
fn test_message_human() {
    let msg = Message::human("Hello");
    assert_eq!(msg.role(), "user");
}

#[test]
fn test_message_ai() {
    let msg = Message::ai("Hi there!");
    assert_eq!(msg.role(), "assistant");
    assert!(msg.name().is_none());
}

#[test]
fn test_message_serialization_human() {
    let msg = Message::human("Hello");
    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"role\":\"user\""));
    assert!(json.contains("Hello"));
    assert!(!json.contains("name"));
}

#[test]
fn test_message_serialization_ai() {
    let msg = Message::ai("Response");
    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"role\":\"assistant\""));
}

#[test]
fn test_message_deserialization() {
    let json = r#"{"role":"user","content":"Test"}"#;
    let msg: Message = serde_json::from_str(json).unwrap();
    assert_eq!(msg, Message::human("Test"));
}

#[test]
fn test_message_deserialization_unknown_role() {
    let json = r#"{"role":"tool","content":"Test"}"#;
    assert!(serde_json::from_str::<Message>(json).is_err());
}
