pub mod domain;
pub mod fallback;
pub mod ports;
pub mod prompt;
pub mod workflow;

pub use domain::{
    AuthSession, ChatMessage, ChatRole, ContentDraft, ContentSession, ContentSource,
    Conversation, NewContentSession, Question, User, UserCredentials,
};
pub use ports::{
    DatabaseService, PortError, PortResult, TextCompletionService, TranscriptService,
};
