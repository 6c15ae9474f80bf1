//! These models represent the objects passed around by the agent
//!
//! The transcript is made of [`message::Message`]s whose content blocks are either plain text,
//! a tool request issued by the model, or the result of running that request. Every provider
//! converts its wire format to and from these structs immediately, so the agent loop and the
//! console never see a vendor format.
pub mod conversation;
pub mod message;
pub mod role;
pub mod tool;
