use thiserror::Error;

use super::{Forest, NeuronSource, SlotId};
use crate::client::ClientError;
use crate::models::{Neuron, NeuronQuery, RenderDirection};

/// Sync failures surfaced to the notification surface.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("source unavailable: {0}")]
    SourceUnavailable(#[from] ClientError),
}

/// Result of one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// How many new roots were appended.
    pub appended: usize,
    /// True when the appended items are the first since the last reload,
    /// i.e. the new-item counter was zero before this cycle.
    pub first_new: bool,
    /// True when the fetched sequence belonged to a superseded generation and
    /// was discarded without touching the forest.
    pub superseded: bool,
}

/// Owns the rendered forest and keeps it synchronized with the remote ordering.
///
/// `reload` replaces the forest wholesale; `poll` appends the suffix of
/// genuinely new records and never removes or reorders rendered roots. Each
/// reload bumps a generation counter so that a poll result fetched under an
/// older generation is discarded instead of applied.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    forest: Forest,
    direction: RenderDirection,
    external: bool,
    new_items: usize,
    generation: u64,
    reloading: bool,
}

impl SyncEngine {
    pub fn new(direction: RenderDirection) -> Self {
        Self {
            forest: Forest::new(),
            direction,
            external: true,
            new_items: 0,
            generation: 0,
            reloading: false,
        }
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn direction(&self) -> RenderDirection {
        self.direction
    }

    /// Whether the avatar is queried as an external collection.
    pub fn set_external(&mut self, external: bool) {
        self.external = external;
    }

    /// New roots appended since the last reload.
    pub fn new_items(&self) -> usize {
        self.new_items
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Discard the forest and rebuild it from the remote ordering.
    ///
    /// On fetch failure the forest is left empty and the reloading flag is
    /// cleared so the caller's UI does not hang.
    pub async fn reload<S: NeuronSource>(
        &mut self,
        source: &S,
        avatar_url: &str,
        direction: RenderDirection,
    ) -> Result<(), SyncError> {
        self.generation += 1;
        self.reloading = true;
        self.direction = direction;
        self.forest.clear();
        self.new_items = 0;

        let fetched = source.get_ordered_neurons(avatar_url, self.external).await;
        self.reloading = false;
        let mut records = fetched?;
        if direction == RenderDirection::BottomToTop {
            records.reverse();
        }
        for neuron in records {
            self.forest.push_root(neuron);
        }
        tracing::debug!(roots = self.forest.root_count(), "tree reloaded");
        Ok(())
    }

    /// One poll cycle: fetch the current ordering and append the new suffix.
    ///
    /// A no-op on an empty forest: polling never bootstraps, only `reload`
    /// does.
    pub async fn poll<S: NeuronSource>(
        &mut self,
        source: &S,
        avatar_url: &str,
    ) -> Result<PollOutcome, SyncError> {
        if self.forest.is_empty() {
            return Ok(PollOutcome::default());
        }
        let generation = self.generation;
        let records = source.get_ordered_neurons(avatar_url, self.external).await?;
        Ok(self.apply_poll(generation, records))
    }

    /// Apply a fetched ordering to the forest. `records` are in remote fetch
    /// order regardless of the render direction; newness detection is
    /// direction-independent and only the rendered order is a display
    /// transform.
    ///
    /// `generation` is the engine generation observed when the fetch started;
    /// a mismatch means a reload superseded the poll and the records are
    /// discarded.
    pub fn apply_poll(&mut self, generation: u64, records: Vec<Neuron>) -> PollOutcome {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "discarding superseded poll");
            return PollOutcome {
                superseded: true,
                ..PollOutcome::default()
            };
        }
        // the most recently arrived rendered record sits at the fresh end of
        // the root sequence: last for TopToBottom, first for BottomToTop
        let cursor = match self.direction {
            RenderDirection::TopToBottom => self.forest.last_root(),
            RenderDirection::BottomToTop => {
                self.forest.roots().first().map(|&slot| self.forest.node(slot))
            }
        };
        let Some(cursor) = cursor else {
            return PollOutcome::default();
        };
        let cursor_id = cursor.neuron.id.clone();

        // New records sit strictly after the last occurrence of the rendered
        // cursor AND are not already rendered; the second condition catches
        // records reordered above the cursor and legitimate re-fetch
        // duplicates. A vanished cursor means every unrendered record counts.
        let start = records
            .iter()
            .rposition(|n| n.id == cursor_id)
            .map_or(0, |i| i + 1);
        let mut new_records: Vec<Neuron> = records
            .into_iter()
            .enumerate()
            .filter(|(i, n)| *i >= start && !self.forest.has_root_id(&n.id))
            .map(|(_, n)| n)
            .collect();
        if self.direction == RenderDirection::BottomToTop {
            new_records.reverse();
        }

        let appended = new_records.len();
        let first_new = appended > 0 && self.new_items == 0;
        self.new_items += appended;
        for neuron in new_records {
            self.forest.push_root(neuron);
        }
        if appended > 0 {
            tracing::debug!(appended, total = self.forest.root_count(), "new neurons appended");
        }
        PollOutcome {
            appended,
            first_new,
            superseded: false,
        }
    }

    /// Fetch a neuron's relatives and install them as its children.
    ///
    /// Previously loaded children are replaced. Returned records echoing the
    /// expanded neuron itself or duplicating a sibling id are skipped.
    pub async fn load_children<S: NeuronSource>(
        &mut self,
        source: &S,
        avatar_url: &str,
        slot: SlotId,
    ) -> Result<usize, SyncError> {
        let id = self.forest.node(slot).neuron.id.clone();
        let records = source
            .get_neuron_by_id(avatar_url, &id, &NeuronQuery::default())
            .await?;

        self.forest.clear_children(slot);
        let mut added = 0;
        for record in records {
            if record.id == id {
                continue;
            }
            let duplicate = self
                .forest
                .node(slot)
                .children()
                .iter()
                .any(|&child| self.forest.node(child).neuron.id == record.id);
            if duplicate {
                continue;
            }
            self.forest.add_child(slot, record);
            added += 1;
        }
        Ok(added)
    }
}
