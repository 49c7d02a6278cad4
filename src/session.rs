//! Interactive read-eval loop between an operator and the agent.

use std::io::{self, Write};
use std::sync::Arc;

use colored::Colorize;
use futures::{pin_mut, Stream, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::warn;

use crate::agent::{diagnostics, traits::AgentRunner, types::RunOptions};

/// Used when the operator submits an empty line.
pub const FALLBACK_PROMPT: &str = "What is the weather in San Francisco?";

const EXIT_COMMANDS: [&str; 2] = ["exit", "quit"];

/// Prompts read line by line from `reader`.
///
/// Blank lines become `fallback`. Bytes that are not UTF-8 are replaced, never fatal.
/// The stream ends at EOF, on `exit`/`quit`, or when the reader itself fails.
pub fn prompts<R>(mut reader: R, fallback: String) -> impl Stream<Item = String>
where
    R: AsyncBufRead + Unpin,
{
    async_stream::stream! {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).trim().to_string();
                    if EXIT_COMMANDS.contains(&line.as_str()) {
                        break;
                    }
                    if line.is_empty() {
                        yield fallback.clone();
                    } else {
                        yield line;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "cannot read prompt");
                    break;
                }
            }
        }
    }
}

/// One prompt and what came back for it. Errors are kept as their diagnostic dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTurn {
    pub prompt: String,
    pub response: Result<String, String>,
}

pub struct Session<W> {
    agent: Arc<dyn AgentRunner>,
    options: RunOptions,
    fallback: String,
    out: W,
}

impl<W: Write + Send> Session<W> {
    pub fn new(agent: Arc<dyn AgentRunner>, options: RunOptions, out: W) -> Self {
        Self {
            agent,
            options,
            fallback: FALLBACK_PROMPT.to_string(),
            out,
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Run turns until the input ends. A failed turn is printed and the loop goes on.
    pub async fn run<R>(&mut self, input: R) -> io::Result<Vec<SessionTurn>>
    where
        R: AsyncBufRead + Unpin,
    {
        let prompts = prompts(input, self.fallback.clone());
        pin_mut!(prompts);

        let mut turns = Vec::new();
        loop {
            write!(self.out, "{} : ", "User 👤".cyan().bold())?;
            self.out.flush()?;
            let Some(prompt) = prompts.next().await else {
                writeln!(self.out)?;
                break;
            };
            turns.push(self.turn(&prompt).await?);
        }
        Ok(turns)
    }

    /// Run a single prompt, printing updates as they arrive and then the result.
    pub async fn turn(&mut self, prompt: &str) -> io::Result<SessionTurn> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let agent = &self.agent;
        let out = &mut self.out;

        let run = agent.run(prompt, &self.options, tx);
        let print_updates = async {
            while let Some(update) = rx.recv().await {
                let label = format!("Agent 🤖 ({})", update.key);
                writeln!(out, "{} : {}", label.red().bold(), update.value)?;
            }
            Ok::<(), io::Error>(())
        };
        let (result, printed) = tokio::join!(run, print_updates);
        printed?;

        let response = match result {
            Ok(res) => {
                writeln!(out, "{} : {}", "Agent 🤖".red().bold(), res.generation)?;
                Ok(res.generation)
            }
            Err(err) => {
                let dump = diagnostics::dump(&err);
                writeln!(out, "{} : {}", "Error".yellow().bold(), dump)?;
                Err(dump)
            }
        };
        Ok(SessionTurn {
            prompt: prompt.to_string(),
            response,
        })
    }
}
