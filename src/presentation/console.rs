use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::application::ports::{LlmClient, VectorStore};
use crate::application::services::{RetrievalService, StreamEvent};
use crate::domain::ChatTurn;

const EXIT_COMMANDS: [&str; 2] = ["quit", "exit"];

/// Turns kept for follow-up questions; older ones are dropped in pairs.
const MAX_HISTORY_TURNS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmittedAnswer {
    pub text: String,
    pub failed: bool,
}

pub fn is_exit_command(input: &str) -> bool {
    EXIT_COMMANDS
        .iter()
        .any(|command| input.trim().eq_ignore_ascii_case(command))
}

/// Writes every fragment as soon as it arrives and flushes, then ends the
/// answer with a newline.
pub async fn emit_to_writer<W>(
    events: &mut mpsc::Receiver<StreamEvent>,
    writer: &mut W,
) -> io::Result<EmittedAnswer>
where
    W: AsyncWrite + Unpin,
{
    let mut answer = EmittedAnswer::default();

    while let Some(event) = events.recv().await {
        writer.write_all(event.text().as_bytes()).await?;
        writer.flush().await?;

        match event {
            StreamEvent::Fragment(fragment) => answer.text.push_str(&fragment),
            StreamEvent::Failed(_) => answer.failed = true,
        }
    }

    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(answer)
}

/// Interactive question/answer loop. Ends on `quit`, `exit` or end of input.
pub async fn run_console_chat<L, V, R, W>(
    service: &RetrievalService<L, V>,
    input: R,
    output: &mut W,
) -> io::Result<()>
where
    L: LlmClient + ?Sized + 'static,
    V: VectorStore + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut history: Vec<ChatTurn> = Vec::new();

    output
        .write_all(b"Ask a question about the knowledge base. Type 'quit' or 'exit' to leave.\n")
        .await?;

    loop {
        output.write_all(b"\nQuestion: ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit_command(question) {
            break;
        }

        output.write_all(b"Answer: ").await?;
        let mut chat = service.query_stream(question, &history).await;
        let answer = emit_to_writer(&mut chat.events, output).await?;

        if answer.failed {
            continue;
        }
        history.push(ChatTurn::user(question));
        history.push(ChatTurn::assistant(answer.text));
        if history.len() > MAX_HISTORY_TURNS {
            history.drain(..history.len() - MAX_HISTORY_TURNS);
        }
    }

    output.write_all(b"Goodbye!\n").await?;
    output.flush().await
}
