//! The call graph: interned adjacency with a reverse index.
//!
//! Method ids are interned to 4-byte keys during construction; the public
//! query surface stays string-keyed. The reverse map is always the exact
//! transpose of the forward map; it is rebuilt whenever an edge lands.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use lasso::{Spur, ThreadedRodeo};
use tia_core::types::collections::{FxHashMap, FxHashSet, PathVec};

use super::confidence::ConfidenceLadder;
use super::types::{GraphStats, MethodInfo, TestCoverageResult};

/// Directed method-call graph with forward and reverse adjacency.
pub struct CallGraph {
    rodeo: ThreadedRodeo,
    forward: FxHashMap<Spur, FxHashSet<Spur>>,
    reverse: FxHashMap<Spur, FxHashSet<Spur>>,
    methods: FxHashMap<Spur, MethodInfo>,
    file_methods: FxHashMap<PathBuf, Vec<Spur>>,
    edge_count: usize,
}

impl CallGraph {
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
            forward: FxHashMap::default(),
            reverse: FxHashMap::default(),
            methods: FxHashMap::default(),
            file_methods: FxHashMap::default(),
            edge_count: 0,
        }
    }

    /// Register a method declaration.
    pub fn add_method(&mut self, info: MethodInfo) {
        let key = self.rodeo.get_or_intern(&info.id);
        self.file_methods
            .entry(info.file_path.clone())
            .or_default()
            .push(key);
        self.methods.insert(key, info);
    }

    /// Add a caller -> callee edge. Duplicate edges collapse into set
    /// membership; the reverse index is kept in sync.
    pub fn add_edge(&mut self, caller: &str, callee: &str) {
        let from = self.rodeo.get_or_intern(caller);
        let to = self.rodeo.get_or_intern(callee);
        if self.forward.entry(from).or_default().insert(to) {
            self.reverse.entry(to).or_default().insert(from);
            self.edge_count += 1;
        }
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn contains_method(&self, method_id: &str) -> bool {
        self.key_of(method_id)
            .is_some_and(|k| self.methods.contains_key(&k))
    }

    pub fn get_method_info(&self, method_id: &str) -> Option<&MethodInfo> {
        let key = self.key_of(method_id)?;
        self.methods.get(&key)
    }

    /// All declared method ids.
    pub fn method_ids(&self) -> impl Iterator<Item = &str> {
        self.methods.values().map(|m| m.id.as_str())
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodInfo> {
        self.methods.values()
    }

    /// Ids of methods declared in the given file.
    pub fn methods_in_file(&self, file: &Path) -> Vec<String> {
        self.file_methods
            .get(file)
            .map(|keys| {
                keys.iter()
                    .map(|k| self.rodeo.resolve(k).to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.file_methods.keys()
    }

    /// Outgoing calls of a method.
    pub fn get_method_calls(&self, method_id: &str) -> FxHashSet<String> {
        self.neighbors(method_id, Direction::Forward)
    }

    /// Direct dependents (callers) of a method.
    pub fn get_method_dependents(&self, method_id: &str) -> FxHashSet<String> {
        self.neighbors(method_id, Direction::Reverse)
    }

    /// Transitive dependents via reverse BFS. The starting id is excluded.
    pub fn get_transitive_dependents(&self, method_id: &str) -> FxHashSet<String> {
        let Some(start) = self.key_of(method_id) else {
            return FxHashSet::default();
        };

        let mut visited: FxHashSet<Spur> = FxHashSet::default();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        let mut result = FxHashSet::default();
        while let Some(node) = queue.pop_front() {
            for &caller in self.reverse.get(&node).into_iter().flatten() {
                if visited.insert(caller) {
                    result.insert(self.rodeo.resolve(&caller).to_string());
                    queue.push_back(caller);
                }
            }
        }
        result
    }

    /// Test methods reaching the given method. Reverse BFS that stops
    /// descending at any node marked as a test and collects those nodes.
    pub fn get_test_methods_exercising(&self, method_id: &str) -> FxHashSet<String> {
        let Some(start) = self.key_of(method_id) else {
            return FxHashSet::default();
        };

        let mut visited: FxHashSet<Spur> = FxHashSet::default();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        let mut tests = FxHashSet::default();
        while let Some(node) = queue.pop_front() {
            for &caller in self.reverse.get(&node).into_iter().flatten() {
                if !visited.insert(caller) {
                    continue;
                }
                if self.is_test(caller) {
                    tests.insert(self.rodeo.resolve(&caller).to_string());
                } else {
                    queue.push_back(caller);
                }
            }
        }
        tests
    }

    /// Like `get_test_methods_exercising`, but records the call path from
    /// each test to the target and scores it on the given ladder.
    pub fn get_test_coverage_for_method(
        &self,
        method_id: &str,
        ladder: ConfidenceLadder,
    ) -> Vec<TestCoverageResult> {
        let Some(start) = self.key_of(method_id) else {
            return Vec::new();
        };

        let mut visited: FxHashSet<Spur> = FxHashSet::default();
        // Queue carries the path from the target outward, target first.
        let mut queue: VecDeque<(Spur, PathVec<Spur>)> = VecDeque::new();
        visited.insert(start);
        let mut initial = PathVec::new();
        initial.push(start);
        queue.push_back((start, initial));

        let mut results = Vec::new();
        while let Some((node, path)) = queue.pop_front() {
            for &caller in self.reverse.get(&node).into_iter().flatten() {
                if !visited.insert(caller) {
                    continue;
                }
                let mut caller_path = path.clone();
                caller_path.push(caller);

                if self.is_test(caller) {
                    // Present the path test-first.
                    let call_path: Vec<String> = caller_path
                        .iter()
                        .rev()
                        .map(|k| self.rodeo.resolve(k).to_string())
                        .collect();
                    let call_depth = (call_path.len() - 1) as u32;
                    results.push(TestCoverageResult {
                        test_method_id: self.rodeo.resolve(&caller).to_string(),
                        call_path,
                        call_depth,
                        confidence: ladder.confidence(call_depth),
                    });
                } else {
                    queue.push_back((caller, caller_path));
                }
            }
        }

        results.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.test_method_id.cmp(&b.test_method_id))
        });
        results
    }

    /// Reverse BFS distances from a set of roots, up to every reachable
    /// node. Used by the impact engine to inherit confidence from the
    /// nearest changed method.
    pub fn reverse_distances(&self, roots: &[String]) -> FxHashMap<String, u32> {
        let mut visited: FxHashSet<Spur> = FxHashSet::default();
        let mut queue: VecDeque<(Spur, u32)> = VecDeque::new();

        for root in roots {
            if let Some(key) = self.key_of(root) {
                if visited.insert(key) {
                    queue.push_back((key, 0));
                }
            }
        }

        let mut distances = FxHashMap::default();
        while let Some((node, depth)) = queue.pop_front() {
            for &caller in self.reverse.get(&node).into_iter().flatten() {
                if visited.insert(caller) {
                    distances.insert(self.rodeo.resolve(&caller).to_string(), depth + 1);
                    queue.push_back((caller, depth + 1));
                }
            }
        }
        distances
    }

    /// Build-level statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            total_methods: self.methods.len(),
            total_edges: self.edge_count,
            total_files: self.file_methods.len(),
            test_methods: self.methods.values().filter(|m| m.is_test_method).count(),
            resolved_call_sites: 0,
            total_call_sites: 0,
        }
    }

    fn key_of(&self, method_id: &str) -> Option<Spur> {
        self.rodeo.get(method_id)
    }

    fn is_test(&self, key: Spur) -> bool {
        self.methods.get(&key).is_some_and(|m| m.is_test_method)
    }

    fn neighbors(&self, method_id: &str, direction: Direction) -> FxHashSet<String> {
        let Some(key) = self.key_of(method_id) else {
            return FxHashSet::default();
        };
        let map = match direction {
            Direction::Forward => &self.forward,
            Direction::Reverse => &self.reverse,
        };
        map.get(&key)
            .map(|set| {
                set.iter()
                    .map(|k| self.rodeo.resolve(k).to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Transpose check: `m in reverse[c]` iff `c in forward[m]`.
    /// Exposed for tests.
    pub fn reverse_is_transpose(&self) -> bool {
        let forward_pairs: FxHashSet<(Spur, Spur)> = self
            .forward
            .iter()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (*from, *to)))
            .collect();
        let reverse_pairs: FxHashSet<(Spur, Spur)> = self
            .reverse
            .iter()
            .flat_map(|(to, froms)| froms.iter().map(move |from| (*from, *to)))
            .collect();
        forward_pairs == reverse_pairs
    }
}

impl Default for CallGraph {
    fn default() -> Self {
        Self::new()
    }
}

enum Direction {
    Forward,
    Reverse,
}
