// GlyphScene
// copyright glyphscene contributors 2023～2026

//! Message feed collaborator.  Recoverable failures (font swaps, shader
//! reloads, rasterization problems) are queued here as human readable text
//! instead of aborting; the embedder drains the queue and presents it.

use log::{error, info, warn};
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

#[derive(Default)]
pub struct MessageFeed {
    queue: VecDeque<Message>,
}

impl MessageFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_info(&mut self, message: impl Into<String>) {
        let text = message.into();
        info!("{}", text);
        self.queue.push_back(Message {
            level: MessageLevel::Info,
            text,
        });
    }

    pub fn queue_warning(&mut self, warning: impl Into<String>) {
        let text = warning.into();
        warn!("{}", text);
        self.queue.push_back(Message {
            level: MessageLevel::Warning,
            text,
        });
    }

    pub fn queue_error(&mut self, error: impl Into<String>) {
        let text = error.into();
        error!("{}", text);
        self.queue.push_back(Message {
            level: MessageLevel::Error,
            text,
        });
    }

    /// Oldest message first.
    pub fn pop(&mut self) -> Option<Message> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_preserves_order_and_level() {
        let mut feed = MessageFeed::new();
        feed.queue_info("a");
        feed.queue_error("b");
        feed.queue_warning("c");
        assert_eq!(feed.len(), 3);
        assert_eq!(feed.pop().unwrap().level, MessageLevel::Info);
        assert_eq!(feed.pop().unwrap().level, MessageLevel::Error);
        let last = feed.pop().unwrap();
        assert_eq!(last.level, MessageLevel::Warning);
        assert_eq!(last.text, "c");
        assert!(feed.is_empty());
    }
}
