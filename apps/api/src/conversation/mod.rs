// Conversation machinery: turn coordination, next-speaker selection,
// keyword termination. One coordinator per screening session.

pub mod coordinator;
pub mod prompts;
pub mod selection;
pub mod termination;
