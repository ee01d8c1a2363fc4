//! Tree-based approximate search: a forest of randomized hyperplane trees.
//!
//! Each tree recursively bisects the vector set with hyperplanes drawn from
//! pairs of randomly chosen vectors, stopping at small leaves. A query
//! descends the forest best-first, ordered by distance to the splitting
//! planes, until a candidate budget is met; candidates are then rescored
//! exactly by inner product. Recall rises with the tree count at the cost
//! of build time.

use crate::error::Result;
use crate::flat::FlatIndex;
use crate::metric::dot;
use crate::seed::SplitMix64;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Construction and query parameters for [`TreeIndex`].
#[derive(Debug, Clone)]
pub struct TreeParams {
    /// Number of randomized trees. More trees, better recall, slower build.
    pub tree_count: usize,
    /// Maximum number of vectors held in one leaf.
    pub leaf_size: usize,
    /// Candidate budget inspected per query; defaults to
    /// `tree_count * top_k` when unset.
    pub search_budget: Option<usize>,
    /// RNG seed; a fixed seed makes builds reproducible.
    pub seed: u64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            tree_count: 500,
            leaf_size: 16,
            search_budget: None,
            seed: 0x0b71_ac5e_ed01,
        }
    }
}

impl TreeParams {
    pub fn with_tree_count(mut self, tree_count: usize) -> Self {
        self.tree_count = tree_count;
        self
    }

    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    pub fn with_search_budget(mut self, budget: usize) -> Self {
        self.search_budget = Some(budget);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Debug)]
enum Node {
    Leaf(Vec<u32>),
    Split {
        normal: Vec<f32>,
        offset: f32,
        left: u32,
        right: u32,
    },
}

/// Approximate index over a forest of hyperplane-split trees.
#[derive(Debug)]
pub struct TreeIndex {
    base: FlatIndex,
    nodes: Vec<Node>,
    roots: Vec<u32>,
    params: TreeParams,
}

impl TreeIndex {
    pub fn build(vectors: &[Vec<f32>], params: TreeParams) -> Result<Self> {
        let base = FlatIndex::build(vectors)?;
        let mut rng = SplitMix64::new(params.seed);
        let mut index = Self {
            base,
            nodes: Vec::new(),
            roots: Vec::with_capacity(params.tree_count),
            params,
        };

        let all_items: Vec<u32> = (0..index.base.len() as u32).collect();
        for _ in 0..index.params.tree_count {
            let root = index.build_node(all_items.clone(), &mut rng);
            index.roots.push(root);
        }

        tracing::debug!(
            trees = index.roots.len(),
            nodes = index.nodes.len(),
            vectors = index.base.len(),
            "tree index built"
        );
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.base.dimension()
    }

    fn build_node(&mut self, items: Vec<u32>, rng: &mut SplitMix64) -> u32 {
        if items.len() <= self.params.leaf_size {
            self.nodes.push(Node::Leaf(items));
            return (self.nodes.len() - 1) as u32;
        }

        let (normal, offset, left_items, right_items) = self.choose_split(&items, rng);
        let left = self.build_node(left_items, rng);
        let right = self.build_node(right_items, rng);
        self.nodes.push(Node::Split {
            normal,
            offset,
            left,
            right,
        });
        (self.nodes.len() - 1) as u32
    }

    /// Pick a hyperplane between two random members and partition the items
    /// by which side they fall on. Degenerate draws (all items on one side)
    /// are retried a few times, then fall back to an arbitrary even split so
    /// construction always terminates.
    fn choose_split(
        &self,
        items: &[u32],
        rng: &mut SplitMix64,
    ) -> (Vec<f32>, f32, Vec<u32>, Vec<u32>) {
        const ATTEMPTS: usize = 3;

        for _ in 0..ATTEMPTS {
            let a = items[rng.next_below(items.len())];
            let b = items[rng.next_below(items.len())];
            if a == b {
                continue;
            }

            let va = self.base.vector(a as usize);
            let vb = self.base.vector(b as usize);
            let normal: Vec<f32> = va.iter().zip(vb.iter()).map(|(x, y)| x - y).collect();
            let midpoint: Vec<f32> = va
                .iter()
                .zip(vb.iter())
                .map(|(x, y)| (x + y) * 0.5)
                .collect();
            let offset = dot(&normal, &midpoint);

            let mut left = Vec::new();
            let mut right = Vec::new();
            for &item in items {
                let margin = dot(&normal, self.base.vector(item as usize)) - offset;
                if margin > 0.0 || (margin == 0.0 && rng.next_u64() & 1 == 1) {
                    right.push(item);
                } else {
                    left.push(item);
                }
            }

            if !left.is_empty() && !right.is_empty() {
                return (normal, offset, left, right);
            }
        }

        // All draws degenerate (e.g. duplicated vectors): split down the
        // middle so the recursion still bottoms out.
        let mid = items.len() / 2;
        let normal = vec![0.0; self.base.dimension()];
        (normal, 0.0, items[..mid].to_vec(), items[mid..].to_vec())
    }

    /// Approximate ranking: best-first traversal of the forest followed by
    /// exact rescoring of the candidate pool.
    pub fn rank(&self, query: &[f32], top_k: usize) -> Result<Vec<usize>> {
        self.base.check_query(query)?;

        let budget = self
            .params
            .search_budget
            .unwrap_or_else(|| self.params.tree_count.saturating_mul(top_k.max(1)))
            .max(top_k);

        let mut heap: BinaryHeap<QueueEntry> = self
            .roots
            .iter()
            .map(|&node| QueueEntry {
                priority: f32::INFINITY,
                node,
            })
            .collect();

        let mut seen = vec![false; self.base.len()];
        let mut candidates = Vec::new();

        while let Some(entry) = heap.pop() {
            if candidates.len() >= budget {
                break;
            }
            match &self.nodes[entry.node as usize] {
                Node::Leaf(items) => {
                    for &item in items {
                        if !seen[item as usize] {
                            seen[item as usize] = true;
                            candidates.push(item as usize);
                        }
                    }
                }
                Node::Split {
                    normal,
                    offset,
                    left,
                    right,
                } => {
                    let margin = dot(normal, query) - offset;
                    heap.push(QueueEntry {
                        priority: entry.priority.min(margin),
                        node: *right,
                    });
                    heap.push(QueueEntry {
                        priority: entry.priority.min(-margin),
                        node: *left,
                    });
                }
            }
        }

        Ok(self.base.rescore(&candidates, query, top_k))
    }
}

/// Heap entry ordering traversal by distance to the splitting planes.
struct QueueEntry {
    priority: f32,
    node: u32,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.node == other.node
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| self.node.cmp(&other.node))
    }
}
