//! The core agent loop — the heart of Talentscout.
//!
//! The agent follows a **think → act → observe** cycle:
//!
//! 1. **Load** the session history and append the user's query
//! 2. **Think** — stream a reasoning completion from the planner
//! 3. **Propose** — extract an `<action>`/`<input>` pair from a second
//!    completion, repairing unclosed tags
//! 4. **Execute** — dispatch the action against the retrieval gateway,
//!    profile resolver, or session memory
//! 5. **Observe** — fold results into working memory and loop, suspend for
//!    clarification, or finish with a final streamed answer
//!
//! Every run emits an ordered `StreamEvent` sequence that is always closed
//! by exactly one `end` event, whatever fails along the way.

pub mod agent_loop;
pub mod dispatcher;
pub mod planner;
pub mod prompts;
pub mod resolver;
pub mod tag_parser;
pub mod working_memory;

#[cfg(test)]
mod test_helpers;

pub use agent_loop::SearchAgent;
pub use dispatcher::Dispatcher;
pub use planner::Planner;
pub use prompts::PromptLibrary;
pub use resolver::ProfileResolver;
pub use working_memory::{Step, WorkingMemory};
