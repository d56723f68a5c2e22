//! Poll lifecycle engine for the Termin scheduling bot.
//!
//! Everything with decision logic lives here: the command grammar, the
//! poll entity and registry, the weekend-date generator, the consensus
//! resolver, the calendar exporter and the command engine. The chat
//! gateway and the durable store are capabilities behind the
//! [`transport::ChatTransport`] and [`store::PollStore`] traits.

pub mod command;
pub mod dates;
pub mod engine;
pub mod error;
pub mod ical;
pub mod poll;
pub mod registry;
pub mod resolve;
pub mod store;
pub mod transport;

pub use engine::CommandEngine;
pub use error::CoreError;
pub use poll::Poll;
pub use registry::PollRegistry;
