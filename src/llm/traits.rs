use crate::message::Message;
use crate::llm::{LLMResult, GenerateResult};
use futures::future::BoxFuture;

/// Core LLM trait.
///
/// Returns a `BoxFuture` tied to the input lifetime so implementations can
/// borrow `messages` instead of cloning the conversation.
pub trait LLM: Send + Sync {
    /// Produce a generation result. The returned future may borrow from `messages`.
    fn generate<'a>(&'a self, messages: &'a [Message]) -> BoxFuture<'a, LLMResult<GenerateResult>>;
}
