use crate::domain::ChatTurn;

/// Answer the model must give when the reference material does not cover the question.
pub const NOT_FOUND_ANSWER: &str = "not found in the reference material";

/// System notice sent instead of a filled template when retrieval produced nothing.
pub const NO_REFERENCE_NOTICE: &str = "No reference material available for this question. \
Answer from general knowledge and tell the user that no reference material was available.";

/// Assembles the message list sent to the model for one question.
///
/// The output is always `[persona] + [notice] + history + final user turn`,
/// where the persona is present only when configured and the notice only when
/// the context is empty.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    persona: Option<String>,
}

impl PromptBuilder {
    pub fn new(persona: Option<String>) -> Self {
        let persona = persona.filter(|p| !p.trim().is_empty());
        Self { persona }
    }

    pub fn build(&self, context: &str, question: &str, history: &[ChatTurn]) -> Vec<ChatTurn> {
        let has_context = !context.trim().is_empty();
        let mut messages = Vec::with_capacity(history.len() + 3);

        if let Some(persona) = &self.persona {
            messages.push(ChatTurn::system(persona.clone()));
        }

        if !has_context {
            messages.push(ChatTurn::system(NO_REFERENCE_NOTICE));
        }

        messages.extend(history.iter().cloned());

        let final_turn = if has_context {
            render_template(context, question)
        } else {
            question.to_string()
        };
        messages.push(ChatTurn::user(final_turn));

        messages
    }
}

fn render_template(context: &str, question: &str) -> String {
    format!(
        "Answer the question using only the reference material below.\n\
         Do not invent facts, numbers or sources that the reference material does not contain.\n\
         If the reference material is not sufficient to answer, reply exactly: {NOT_FOUND_ANSWER}.\n\
         \n\
         [Reference material]\n\
         {context}\n\
         \n\
         [Question]\n\
         {question}"
    )
}
