//! Optimistic chat timeline.
//!
//! A send is shown immediately as `Pending`, then either confirmed with the
//! server's message or marked `Failed`. Server syncs merge by message id, so
//! a message that arrives through polling before its send confirms is never
//! shown twice.

use uuid::Uuid;

use crate::models::Message;

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Pending { local_id: Uuid, content: String },
    Confirmed(Message),
    Failed {
        local_id: Uuid,
        content: String,
        error: String,
    },
}

impl Entry {
    pub fn server_id(&self) -> Option<u64> {
        match self {
            Self::Confirmed(message) => Some(message.id),
            _ => None,
        }
    }

    pub fn local_id(&self) -> Option<Uuid> {
        match self {
            Self::Pending { local_id, .. } | Self::Failed { local_id, .. } => Some(*local_id),
            Self::Confirmed(_) => None,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Pending { content, .. } | Self::Failed { content, .. } => content,
            Self::Confirmed(message) => &message.content,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Timeline {
    conversation_id: u64,
    entries: Vec<Entry>,
}

impl Timeline {
    pub fn new(conversation_id: u64) -> Self {
        Self {
            conversation_id,
            entries: Vec::new(),
        }
    }

    pub fn conversation_id(&self) -> u64 {
        self.conversation_id
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, Entry::Pending { .. }))
            .count()
    }

    pub fn confirmed(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Confirmed(message) => Some(message),
            _ => None,
        })
    }

    /// Append an optimistic entry and return its local id.
    pub fn push_pending(&mut self, content: impl Into<String>) -> Uuid {
        let local_id = Uuid::new_v4();
        self.entries.push(Entry::Pending {
            local_id,
            content: content.into(),
        });
        local_id
    }

    /// Replace a pending entry with the server's copy.
    pub fn confirm(&mut self, local_id: Uuid, message: Message) {
        let already_synced = self.entries.iter().any(|e| e.server_id() == Some(message.id));
        let position = self.position(local_id);

        match (position, already_synced) {
            (Some(index), true) => {
                self.entries.remove(index);
            }
            (Some(index), false) => {
                self.entries[index] = Entry::Confirmed(message);
            }
            (None, _) => self.sync(vec![message]),
        }
    }

    pub fn fail(&mut self, local_id: Uuid, error: impl Into<String>) {
        if let Some(index) = self.position(local_id) {
            let content = self.entries[index].content().to_string();
            self.entries[index] = Entry::Failed {
                local_id,
                content,
                error: error.into(),
            };
        }
    }

    /// Move a failed entry back to pending and hand back its content.
    pub fn retry(&mut self, local_id: Uuid) -> Option<String> {
        let index = self.position(local_id)?;
        let Entry::Failed { content, .. } = &self.entries[index] else {
            return None;
        };
        let content = content.clone();
        self.entries[index] = Entry::Pending {
            local_id,
            content: content.clone(),
        };
        Some(content)
    }

    /// Merge a server listing. Server copies win for known ids; unconfirmed
    /// entries stay at the end in their original order.
    pub fn sync(&mut self, messages: Vec<Message>) {
        let mut confirmed: Vec<Message> = Vec::new();
        let mut local = Vec::new();

        for entry in self.entries.drain(..) {
            match entry {
                Entry::Confirmed(message) => confirmed.push(message),
                other => local.push(other),
            }
        }

        for message in messages {
            if message.conversation != self.conversation_id {
                continue;
            }
            match confirmed.iter_mut().find(|m| m.id == message.id) {
                Some(existing) => *existing = message,
                None => confirmed.push(message),
            }
        }

        confirmed.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        self.entries = confirmed.into_iter().map(Entry::Confirmed).collect();
        self.entries.extend(local);
    }

    fn position(&self, local_id: Uuid) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.local_id() == Some(local_id))
    }
}
