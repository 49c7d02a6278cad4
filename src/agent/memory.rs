use std::collections::VecDeque;

use crate::message::Message;

/// Bounded window of past user/assistant exchanges.
///
/// `limit` counts messages; whole exchanges are evicted, so an odd limit
/// rounds down and the window always opens with a user message.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    limit: usize,
    exchanges: VecDeque<(Message, Message)>,
}

impl ConversationMemory {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            exchanges: VecDeque::with_capacity(limit / 2),
        }
    }

    pub fn push_exchange(&mut self, prompt: Message, answer: Message) {
        let max_exchanges = self.limit / 2;
        if max_exchanges == 0 {
            return;
        }
        while self.exchanges.len() >= max_exchanges {
            self.exchanges.pop_front();
        }
        self.exchanges.push_back((prompt, answer));
    }

    pub fn messages(&self) -> Vec<Message> {
        self.exchanges
            .iter()
            .flat_map(|(prompt, answer)| [prompt.clone(), answer.clone()])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len() * 2
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}
