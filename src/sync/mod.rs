//! Tree synchronization: the forest arena, the incremental sync engine, and the
//! timer-driven watch runner.

mod engine;
mod forest;
mod runner;

pub use engine::{PollOutcome, SyncEngine, SyncError};
pub use forest::{Forest, SlotId, TreeNode};
pub use runner::{run_watch, WatchOptions};

use crate::client::ClientError;
use crate::models::{Neuron, NeuronQuery};

/// Query surface of the remote avatar.
#[allow(async_fn_in_trait)]
pub trait NeuronSource {
    /// The current ordered neuron sequence for an avatar.
    async fn get_ordered_neurons(
        &self,
        avatar_url: &str,
        external: bool,
    ) -> Result<Vec<Neuron>, ClientError>;

    /// A neuron by id; the filter selects which relatives come with it.
    async fn get_neuron_by_id(
        &self,
        avatar_url: &str,
        id: &str,
        query: &NeuronQuery,
    ) -> Result<Vec<Neuron>, ClientError>;

    /// The neurons matching a filter.
    async fn get_neurons(
        &self,
        avatar_url: &str,
        query: &NeuronQuery,
    ) -> Result<Vec<Neuron>, ClientError>;
}

/// Command surface of the remote avatar.
#[allow(async_fn_in_trait)]
pub trait NeuronCommands {
    async fn deactivate_neuron(
        &self,
        avatar_url: &str,
        id: &str,
        version: &str,
    ) -> Result<(), ClientError>;

    async fn deactivate_terminal(
        &self,
        avatar_url: &str,
        id: &str,
        version: &str,
    ) -> Result<(), ClientError>;

    async fn create_link(
        &self,
        avatar_url: &str,
        source_id: &str,
        target_id: &str,
    ) -> Result<(), ClientError>;
}

/// Toast-style notification surface.
pub trait NotificationSink {
    fn report_success(&self, message: &str);
    fn report_error(&self, message: &str);

    /// One-shot audible alert for the first new items since the last reload.
    fn alert(&self) {}
}
