use std::collections::{HashMap, HashSet};

use jobengine::queue::{LocalUnordered, Queue};
use jobengine_test_utils::builders::TestJobBuilder;
use jobengine_test_utils::jobs::Recorder;
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

/// Random acyclic job graph: job N may only depend on jobs 0..N-1.
#[derive(Debug, Clone)]
struct Graph {
    deps: Vec<Vec<usize>>,
}

impl Graph {
    fn name(i: usize) -> String {
        format!("job_{i}")
    }

    fn len(&self) -> usize {
        self.deps.len()
    }
}

fn graph_strategy(max_jobs: usize) -> impl Strategy<Value = Graph> {
    (1..=max_jobs).prop_flat_map(|n| {
        proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..3), n).prop_map(
            |raw| {
                let deps = raw
                    .into_iter()
                    .enumerate()
                    .map(|(i, picks)| {
                        if i == 0 {
                            return Vec::new();
                        }
                        let unique: HashSet<usize> = picks.into_iter().map(|p| p % i).collect();
                        let mut unique: Vec<usize> = unique.into_iter().collect();
                        unique.sort();
                        unique
                    })
                    .collect();
                Graph { deps }
            },
        )
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("build test runtime")
}

/// Position of `event` in the recorded log.
fn index_of(events: &[String], event: &str) -> Option<usize> {
    events.iter().position(|e| e == event)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Every job completes exactly once and never starts before its
    /// prerequisites finished, whatever the worker count, submission order
    /// or failures.
    #[test]
    fn test_graph_runs_to_completion_in_dependency_order(
        graph in graph_strategy(12),
        workers in 1..4usize,
        failing in proptest::collection::hash_set(0..12usize, 0..4),
        reverse_submission in any::<bool>(),
    ) {
        let recorder = Recorder::new();
        let rt = runtime();

        let stats = rt.block_on(async {
            let queue = LocalUnordered::new(workers);
            queue.start(CancellationToken::new()).expect("queue starts");

            let mut order: Vec<usize> = (0..graph.len()).collect();
            if reverse_submission {
                order.reverse();
            }

            for i in order {
                let mut builder = TestJobBuilder::new(&Graph::name(i), &recorder);
                for dep in &graph.deps[i] {
                    builder = builder.after(&Graph::name(*dep));
                }
                if failing.contains(&i) {
                    builder = builder.failing("scripted failure");
                }
                queue.put(builder.build()).expect("unique ids");
            }

            tokio::time::timeout(std::time::Duration::from_secs(10), queue.wait())
                .await
                .expect("queue drains in time")
                .expect("queue started");

            let results = queue.results().collect().await;
            prop_assert_eq!(results.len(), graph.len());
            queue.runner().close().await;
            Ok(queue.stats())
        })?;

        prop_assert_eq!(stats.total, graph.len());
        prop_assert_eq!(stats.completed, graph.len());
        prop_assert_eq!(stats.pending + stats.running, 0);

        let events = recorder.events();
        let mut starts: HashMap<String, usize> = HashMap::new();
        for e in &events {
            if let Some(id) = e.strip_prefix("start:") {
                *starts.entry(id.to_string()).or_default() += 1;
            }
        }
        prop_assert_eq!(starts.len(), graph.len());
        prop_assert!(starts.values().all(|&n| n == 1));

        for (i, deps) in graph.deps.iter().enumerate() {
            let started = index_of(&events, &format!("start:{}", Graph::name(i)))
                .expect("job started");
            for dep in deps {
                let finished = index_of(&events, &format!("run:{}", Graph::name(*dep)))
                    .expect("prerequisite finished");
                prop_assert!(
                    finished < started,
                    "{} started before prerequisite {} finished",
                    Graph::name(i),
                    Graph::name(*dep)
                );
            }
        }
    }

    /// Force-completed jobs never run; everything else still does.
    #[test]
    fn test_forced_jobs_are_skipped(
        graph in graph_strategy(10),
        forced in proptest::collection::hash_set(0..10usize, 0..5),
    ) {
        let recorder = Recorder::new();
        let rt = runtime();
        let forced: HashSet<usize> = forced.into_iter().filter(|i| *i < graph.len()).collect();

        rt.block_on(async {
            let queue = LocalUnordered::new(2);
            for i in 0..graph.len() {
                let mut builder = TestJobBuilder::new(&Graph::name(i), &recorder);
                for dep in &graph.deps[i] {
                    builder = builder.after(&Graph::name(*dep));
                }
                queue.put(builder.build()).expect("unique ids");
            }
            for i in &forced {
                queue.force_complete(&Graph::name(*i)).expect("pending job can be forced");
            }

            queue.start(CancellationToken::new()).expect("queue starts");
            tokio::time::timeout(std::time::Duration::from_secs(10), queue.wait())
                .await
                .expect("queue drains in time")
                .expect("queue started");
            queue.runner().close().await;
        });

        for i in 0..graph.len() {
            let ran = recorder.has_started(&Graph::name(i));
            prop_assert_eq!(ran, !forced.contains(&i), "job {}", i);
        }
    }
}
