//! The conversation log.
//!
//! A [`Thread`] is an ordered, append-only sequence of [`Message`]s owned by
//! the caller. The [`Assistant`](crate::assistant::Assistant) borrows it for
//! the duration of its lifetime and appends to it, but never reorders or
//! removes entries; insertion order is the conversation order sent to the
//! model.

use crate::message::Message;

/// An ordered message log representing one conversation.
#[derive(Debug, Default)]
pub struct Thread {
    messages: Vec<Message>,
}

impl Thread {
    /// Creates an empty thread.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to the end of the thread.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Returns the ordered message sequence.
    ///
    /// This is a view into the thread's own storage, not a defensive copy.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the most recently appended message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    #[test]
    fn append_preserves_order() {
        let mut thread = Thread::new();
        thread.append(Message::user("first"));
        thread.append(Message::assistant("second"));
        thread.append(Message::user("third"));

        let texts: Vec<&str> = thread.messages().iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(thread.last().unwrap().text(), "third");
    }

    #[test]
    fn messages_is_stable_without_mutation() {
        let mut thread = Thread::new();
        thread.append(Message::user("hello"));

        let first: Vec<Role> = thread.messages().iter().map(|m| m.role).collect();
        let second: Vec<Role> = thread.messages().iter().map(|m| m.role).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_thread_reports_empty() {
        let thread = Thread::new();
        assert!(thread.is_empty());
        assert_eq!(thread.len(), 0);
        assert!(thread.last().is_none());
    }
}
