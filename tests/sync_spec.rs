use std::collections::VecDeque;
use std::sync::Mutex;

use cortex_tree::client::ClientError;
use cortex_tree::graph::extract;
use cortex_tree::models::{Neuron, NeuronQuery, RelativeType, RenderDirection};
use cortex_tree::sync::{NeuronSource, SyncEngine};

fn neuron(id: &str, tag: &str) -> Neuron {
    Neuron {
        id: id.to_string(),
        tag: tag.to_string(),
        version: "1".to_string(),
        relative_type: RelativeType::NotSet,
        terminal: None,
    }
}

/// Scripted query surface: each ordered fetch pops the next response.
#[derive(Default)]
struct ScriptedSource {
    ordered: Mutex<VecDeque<Result<Vec<Neuron>, ClientError>>>,
    relatives: Mutex<Vec<Neuron>>,
}

impl ScriptedSource {
    fn returning(sequences: Vec<Vec<Neuron>>) -> Self {
        Self {
            ordered: Mutex::new(sequences.into_iter().map(Ok).collect()),
            relatives: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        let mut ordered = VecDeque::new();
        ordered.push_back(Err(ClientError::Server("connection refused".to_string())));
        Self {
            ordered: Mutex::new(ordered),
            relatives: Mutex::new(Vec::new()),
        }
    }

    fn with_relatives(self, relatives: Vec<Neuron>) -> Self {
        *self.relatives.lock().expect("relatives lock") = relatives;
        self
    }
}

impl NeuronSource for ScriptedSource {
    async fn get_ordered_neurons(
        &self,
        _avatar_url: &str,
        _external: bool,
    ) -> Result<Vec<Neuron>, ClientError> {
        self.ordered
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Server("script exhausted".to_string())))
    }

    async fn get_neuron_by_id(
        &self,
        _avatar_url: &str,
        _id: &str,
        _query: &NeuronQuery,
    ) -> Result<Vec<Neuron>, ClientError> {
        Ok(self.relatives.lock().expect("relatives lock").clone())
    }

    async fn get_neurons(
        &self,
        _avatar_url: &str,
        _query: &NeuronQuery,
    ) -> Result<Vec<Neuron>, ClientError> {
        Ok(Vec::new())
    }
}

fn rendered_ids(engine: &SyncEngine) -> Vec<String> {
    engine
        .forest()
        .roots()
        .iter()
        .map(|&slot| engine.forest().node(slot).neuron.id.clone())
        .collect()
}

const AVATAR: &str = "https://avatar.example/cortex";

mod reload {
    use super::*;

    #[tokio::test]
    async fn preserves_remote_order_top_to_bottom() {
        let source =
            ScriptedSource::returning(vec![vec![neuron("a", "A"), neuron("b", "B"), neuron("c", "C")]]);
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await
            .expect("reload");

        assert_eq!(rendered_ids(&engine), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn reverses_remote_order_bottom_to_top() {
        let source =
            ScriptedSource::returning(vec![vec![neuron("a", "A"), neuron("b", "B"), neuron("c", "C")]]);
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        engine
            .reload(&source, AVATAR, RenderDirection::BottomToTop)
            .await
            .expect("reload");

        assert_eq!(rendered_ids(&engine), ["c", "b", "a"]);
    }

    #[tokio::test]
    async fn failure_leaves_forest_empty_and_clears_reloading() {
        let source = ScriptedSource::failing();
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        let result = engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await;

        assert!(result.is_err());
        assert!(engine.forest().is_empty());
        assert!(!engine.is_reloading());
    }

    #[tokio::test]
    async fn resets_new_item_counter() {
        let source = ScriptedSource::returning(vec![
            vec![neuron("a", "A")],
            vec![neuron("a", "A"), neuron("b", "B")],
            vec![neuron("a", "A"), neuron("b", "B")],
        ]);
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await
            .expect("reload");
        engine.poll(&source, AVATAR).await.expect("poll");
        assert_eq!(engine.new_items(), 1);

        engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await
            .expect("second reload");
        assert_eq!(engine.new_items(), 0);
    }
}

mod poll {
    use super::*;

    #[tokio::test]
    async fn is_a_noop_on_an_empty_forest() {
        let source = ScriptedSource::returning(vec![vec![neuron("a", "A")]]);
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        let outcome = engine.poll(&source, AVATAR).await.expect("poll");

        assert_eq!(outcome.appended, 0);
        assert!(engine.forest().is_empty());
    }

    #[tokio::test]
    async fn appends_nothing_when_remote_is_unchanged() {
        let records = vec![neuron("a", "A"), neuron("b", "B")];
        let source = ScriptedSource::returning(vec![records.clone(), records.clone(), records]);
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await
            .expect("reload");
        let before = engine.forest().clone();

        let first = engine.poll(&source, AVATAR).await.expect("first poll");
        let second = engine.poll(&source, AVATAR).await.expect("second poll");

        assert_eq!(first.appended, 0);
        assert_eq!(second.appended, 0);
        assert_eq!(*engine.forest(), before);
        assert_eq!(engine.new_items(), 0);
    }

    #[tokio::test]
    async fn appends_the_new_suffix_in_fetched_order() {
        let source = ScriptedSource::returning(vec![
            vec![neuron("a", "A"), neuron("b", "B")],
            vec![
                neuron("a", "A"),
                neuron("b", "B"),
                neuron("c", "C"),
                neuron("d", "D"),
            ],
        ]);
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await
            .expect("reload");
        let outcome = engine.poll(&source, AVATAR).await.expect("poll");

        assert_eq!(outcome.appended, 2);
        assert!(outcome.first_new);
        assert_eq!(engine.new_items(), 2);
        assert_eq!(rendered_ids(&engine), ["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn first_new_fires_once_per_quiet_period() {
        let source = ScriptedSource::returning(vec![
            vec![neuron("a", "A")],
            vec![neuron("a", "A"), neuron("b", "B")],
            vec![neuron("a", "A"), neuron("b", "B"), neuron("c", "C")],
        ]);
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await
            .expect("reload");
        let first = engine.poll(&source, AVATAR).await.expect("first poll");
        let second = engine.poll(&source, AVATAR).await.expect("second poll");

        assert!(first.first_new);
        assert!(!second.first_new);
        assert_eq!(engine.new_items(), 2);
    }

    #[tokio::test]
    async fn skips_records_reordered_above_the_cursor() {
        // b is the rendered cursor; the remote moved a after it, so only the
        // genuinely new c is appended
        let source = ScriptedSource::returning(vec![
            vec![neuron("a", "A"), neuron("b", "B")],
            vec![neuron("b", "B"), neuron("c", "C"), neuron("a", "A")],
        ]);
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await
            .expect("reload");
        let outcome = engine.poll(&source, AVATAR).await.expect("poll");

        assert_eq!(outcome.appended, 1);
        assert_eq!(rendered_ids(&engine), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn appends_all_unrendered_records_when_the_cursor_vanished() {
        let source = ScriptedSource::returning(vec![
            vec![neuron("a", "A"), neuron("b", "B")],
            vec![neuron("c", "C"), neuron("d", "D")],
        ]);
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await
            .expect("reload");
        let outcome = engine.poll(&source, AVATAR).await.expect("poll");

        // append-only: a and b stay rendered even though the remote dropped them
        assert_eq!(outcome.appended, 2);
        assert_eq!(rendered_ids(&engine), ["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn growth_is_prefix_preserving_across_cycles() {
        let source = ScriptedSource::returning(vec![
            vec![neuron("a", "A")],
            vec![neuron("a", "A"), neuron("b", "B")],
            vec![neuron("b", "B"), neuron("c", "C")],
            vec![neuron("c", "C")],
        ]);
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await
            .expect("reload");
        let mut previous = rendered_ids(&engine);
        for _ in 0..3 {
            engine.poll(&source, AVATAR).await.expect("poll");
            let current = rendered_ids(&engine);
            assert!(current.starts_with(&previous));
            previous = current;
        }
        assert_eq!(previous, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn detects_new_records_in_bottom_to_top_mode() {
        let source = ScriptedSource::returning(vec![
            vec![neuron("a", "A"), neuron("b", "B"), neuron("c", "C")],
            vec![
                neuron("a", "A"),
                neuron("b", "B"),
                neuron("c", "C"),
                neuron("d", "D"),
                neuron("e", "E"),
            ],
        ]);
        let mut engine = SyncEngine::new(RenderDirection::BottomToTop);

        engine
            .reload(&source, AVATAR, RenderDirection::BottomToTop)
            .await
            .expect("reload");
        assert_eq!(rendered_ids(&engine), ["c", "b", "a"]);

        let outcome = engine.poll(&source, AVATAR).await.expect("poll");

        // new arrivals are appended (display-reversed) so growth stays
        // prefix-preserving; the next reload restores full display order
        assert_eq!(outcome.appended, 2);
        assert_eq!(rendered_ids(&engine), ["c", "b", "a", "e", "d"]);
    }

    #[tokio::test]
    async fn discards_results_from_a_superseded_generation() {
        let records = vec![neuron("a", "A"), neuron("b", "B")];
        let source = ScriptedSource::returning(vec![records.clone(), records]);
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await
            .expect("reload");
        let stale_generation = engine.generation();
        engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await
            .expect("second reload");

        let outcome = engine.apply_poll(
            stale_generation,
            vec![neuron("a", "A"), neuron("b", "B"), neuron("c", "C")],
        );

        assert!(outcome.superseded);
        assert_eq!(outcome.appended, 0);
        assert_eq!(rendered_ids(&engine), ["a", "b"]);
    }

    #[tokio::test]
    async fn reports_source_unavailable_without_touching_the_forest() {
        let source = ScriptedSource::returning(vec![vec![neuron("a", "A")]]);
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await
            .expect("reload");
        // the script is exhausted, so the next fetch fails
        let result = engine.poll(&source, AVATAR).await;

        assert!(result.is_err());
        assert_eq!(rendered_ids(&engine), ["a"]);
    }
}

mod load_children {
    use super::*;

    #[tokio::test]
    async fn installs_relatives_as_children() {
        let source = ScriptedSource::returning(vec![vec![neuron("a", "A")]])
            .with_relatives(vec![neuron("r1", "R1"), neuron("r2", "R2")]);
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await
            .expect("reload");
        let root = engine.forest().roots()[0];
        let added = engine
            .load_children(&source, AVATAR, root)
            .await
            .expect("expand");

        assert_eq!(added, 2);
        let children: Vec<String> = engine
            .forest()
            .node(root)
            .children()
            .iter()
            .map(|&child| engine.forest().node(child).neuron.id.clone())
            .collect();
        assert_eq!(children, ["r1", "r2"]);
    }

    #[tokio::test]
    async fn skips_the_expanded_neuron_and_duplicate_siblings() {
        let source = ScriptedSource::returning(vec![vec![neuron("a", "A")]]).with_relatives(vec![
            neuron("a", "A"),
            neuron("r1", "R1"),
            neuron("r1", "R1 again"),
        ]);
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await
            .expect("reload");
        let root = engine.forest().roots()[0];
        let added = engine
            .load_children(&source, AVATAR, root)
            .await
            .expect("expand");

        assert_eq!(added, 1);
        assert_eq!(engine.forest().node(root).children().len(), 1);
    }
}

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn single_root_reload_extracts_one_node_and_no_links() {
        let source = ScriptedSource::returning(vec![vec![neuron("1", "root")]]);
        let mut engine = SyncEngine::new(RenderDirection::TopToBottom);

        engine
            .reload(&source, AVATAR, RenderDirection::TopToBottom)
            .await
            .expect("reload");
        let graph = extract(engine.forest());

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].id, "1");
        assert_eq!(graph.nodes[0].tag, "root");
        assert!(graph.links.is_empty());
    }
}
