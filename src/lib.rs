//! Live neuron tree synchronization and graph derivation for remote avatars.
//!
//! The crate keeps an in-memory forest of neurons synchronized with the
//! ordering served by a remote avatar ([`sync`]), derives a deduplicated
//! node/link graph from it for rendering ([`graph`]), and drives the
//! interaction state machine gating mutations ([`state`]). Remote surfaces are
//! consumed through traits so the engine is fully testable without a server;
//! [`client::NeuronClient`] is the HTTP implementation.

pub mod client;
pub mod graph;
pub mod models;
pub mod settings;
pub mod state;
pub mod subscriptions;
pub mod sync;
pub mod tree_render;
