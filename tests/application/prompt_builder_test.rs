use georag::application::services::{NO_REFERENCE_NOTICE, NOT_FOUND_ANSWER, PromptBuilder};
use georag::domain::{ChatTurn, MessageRole};

const PERSONA: &str = "You are a geography tutor.";

fn history() -> Vec<ChatTurn> {
    vec![
        ChatTurn::user("Where is the Yangtze?"),
        ChatTurn::assistant("In China."),
    ]
}

#[test]
fn given_context_persona_and_history_when_building_then_orders_persona_history_question() {
    let builder = PromptBuilder::new(Some(PERSONA.to_string()));

    let messages = builder.build("The Yangtze is 6300 km long.", "How long is it?", &history());

    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0], ChatTurn::system(PERSONA));
    assert_eq!(&messages[1..3], history().as_slice());

    let last = &messages[3];
    assert_eq!(last.role, MessageRole::User);
    assert!(last.content.contains("The Yangtze is 6300 km long."));
    assert!(last.content.contains("How long is it?"));
    assert!(last.content.contains(NOT_FOUND_ANSWER));
}

#[test]
fn given_context_when_building_then_context_precedes_question() {
    let builder = PromptBuilder::new(None);

    let messages = builder.build("CONTEXT-MARKER", "QUESTION-MARKER", &[]);
    let last = &messages[messages.len() - 1].content;

    let context_at = last.find("CONTEXT-MARKER").unwrap();
    let question_at = last.find("QUESTION-MARKER").unwrap();
    assert!(context_at < question_at);
}

#[test]
fn given_empty_context_when_building_then_adds_notice_and_sends_bare_question() {
    let builder = PromptBuilder::new(Some(PERSONA.to_string()));

    let messages = builder.build("", "How long is the Nile?", &history());

    assert_eq!(messages.len(), 5);
    assert_eq!(messages[0], ChatTurn::system(PERSONA));
    assert_eq!(messages[1], ChatTurn::system(NO_REFERENCE_NOTICE));
    assert_eq!(&messages[2..4], history().as_slice());
    assert_eq!(messages[4], ChatTurn::user("How long is the Nile?"));
    assert!(
        NO_REFERENCE_NOTICE
            .to_lowercase()
            .contains("no reference material available")
    );
}

#[test]
fn given_whitespace_context_when_building_then_treated_as_empty() {
    let builder = PromptBuilder::new(None);

    let messages = builder.build(" \n\n ", "q", &[]);

    assert_eq!(messages, vec![ChatTurn::system(NO_REFERENCE_NOTICE), ChatTurn::user("q")]);
}

#[test]
fn given_blank_persona_when_building_then_no_persona_message() {
    let builder = PromptBuilder::new(Some("   ".to_string()));

    let messages = builder.build("some context", "q", &[]);

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, MessageRole::User);
}

#[test]
fn given_context_with_edge_whitespace_when_building_then_context_inserted_unchanged() {
    let builder = PromptBuilder::new(None);
    let context = "first chunk \n\nsecond chunk ";

    let messages = builder.build(context, "q", &[]);

    assert_eq!(messages.len(), 1);
    assert!(messages[0].content.contains("[Reference material]\nfirst chunk \n\nsecond chunk \n\n[Question]"));
}
