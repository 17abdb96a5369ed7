// Screening sessions: the HTTP-facing lifecycle around one panel
// conversation, from creation through rounds to cancellation.

pub mod context;
pub mod handlers;
pub mod registry;
pub mod session;
