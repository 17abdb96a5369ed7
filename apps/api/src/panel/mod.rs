// Panel composition: the single orchestrator call that designs a screening
// panel, plus validation and name normalization of its output.

pub mod composer;
pub mod prompts;
