//! Feed-forward NEAT genome used as a driving controller.
//!
//! Node ids are stable across the population: inputs come first, then the
//! bias node, then the outputs. Hidden nodes created by splitting a
//! connection get an id derived from the split connection's endpoints, so
//! the same structural mutation in two genomes yields the same node and the
//! same innovation numbers. That keeps crossover alignment meaningful without
//! a global innovation registry.

use crate::model::{Controller, EvolutionConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

const WEIGHT_LIMIT: f64 = 5.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeKind {
    Input,
    Bias,
    Hidden,
    Output,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: usize,
    pub kind: NodeKind,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
    pub enabled: bool,
    pub innovation: usize,
}

/// FNV-1a over the endpoint pair.
#[must_use]
pub fn innovation_id(from: usize, to: usize) -> usize {
    let key = (from as u64) << 32 | (to as u64);
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for byte in key.to_le_bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3_u64);
    }
    (hash as usize) & 0x7FFF_FFFF
}

/// Id of the hidden node created by splitting `from -> to`.
#[must_use]
pub fn split_node_id(from: usize, to: usize) -> usize {
    let key = (from as u64) << 32 | (to as u64);
    let mut hash = 0x8422_2325_cbf2_9ce4_u64;
    for byte in key.to_le_bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3_u64);
    }
    (hash as usize % 1_000_000) + 1000
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Brain {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    pub inputs: usize,
    pub outputs: usize,
    /// Node indices in evaluation order (not serialized).
    #[serde(skip)]
    order: Vec<usize>,
    /// Incoming `(source node index, connection index)` per node (not serialized).
    #[serde(skip)]
    incoming: Vec<Vec<(usize, usize)>>,
    #[serde(skip)]
    values: Vec<f64>,
}

impl Brain {
    /// Minimal topology: every input and the bias wired straight to every output.
    pub fn new_random_with_rng<R: Rng>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        let mut nodes: Vec<Node> = (0..inputs)
            .map(|id| Node {
                id,
                kind: NodeKind::Input,
            })
            .collect();
        nodes.push(Node {
            id: inputs,
            kind: NodeKind::Bias,
        });
        let first_output = inputs + 1;
        nodes.extend((first_output..first_output + outputs).map(|id| Node {
            id,
            kind: NodeKind::Output,
        }));

        let mut connections = Vec::with_capacity((inputs + 1) * outputs);
        for from in 0..=inputs {
            for to in first_output..first_output + outputs {
                connections.push(Connection {
                    from,
                    to,
                    weight: rng.gen_range(-1.0..1.0),
                    enabled: true,
                    innovation: innovation_id(from, to),
                });
            }
        }

        let mut brain = Self {
            nodes,
            connections,
            inputs,
            outputs,
            order: Vec::new(),
            incoming: Vec::new(),
            values: Vec::new(),
        };
        brain.rebuild();
        brain
    }

    fn output_id(&self, i: usize) -> usize {
        self.inputs + 1 + i
    }

    fn index_map(&self) -> HashMap<usize, usize> {
        self.nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect()
    }

    #[must_use]
    pub fn hidden_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.kind == NodeKind::Hidden).count()
    }

    #[must_use]
    pub fn enabled_connections(&self) -> usize {
        self.connections.iter().filter(|c| c.enabled).count()
    }

    /// Recomputes the evaluation order (Kahn's algorithm over enabled edges).
    pub fn rebuild(&mut self) {
        let index = self.index_map();
        let n = self.nodes.len();
        let mut incoming = vec![Vec::new(); n];
        let mut outgoing = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];

        for (ci, conn) in self.connections.iter_mut().enumerate() {
            if !conn.enabled {
                continue;
            }
            match (index.get(&conn.from), index.get(&conn.to)) {
                (Some(&f), Some(&t)) => {
                    incoming[t].push((f, ci));
                    outgoing[f].push(t);
                    in_degree[t] += 1;
                }
                _ => conn.enabled = false,
            }
        }

        let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(i) = queue.pop_front() {
            order.push(i);
            for &t in &outgoing[i] {
                in_degree[t] -= 1;
                if in_degree[t] == 0 {
                    queue.push_back(t);
                }
            }
        }

        self.order = order;
        self.incoming = incoming;
        self.values = vec![0.0; n];
    }

    /// `true` if `to` can reach `from` along enabled edges, i.e. adding
    /// `from -> to` would close a cycle.
    fn creates_cycle(&self, from: usize, to: usize) -> bool {
        if from == to {
            return true;
        }
        let mut adjacency: HashMap<usize, Vec<usize>> = HashMap::new();
        for c in self.connections.iter().filter(|c| c.enabled) {
            adjacency.entry(c.from).or_default().push(c.to);
        }
        let mut seen = HashSet::new();
        let mut stack = vec![to];
        while let Some(node) = stack.pop() {
            if node == from {
                return true;
            }
            if seen.insert(node) {
                if let Some(next) = adjacency.get(&node) {
                    stack.extend(next.iter().copied());
                }
            }
        }
        false
    }

    /// Feeds `inputs` forward; missing inputs read as zero.
    pub fn forward(&mut self, inputs: &[f64]) -> Vec<f64> {
        if self.values.len() != self.nodes.len() {
            self.rebuild();
        }
        for v in &mut self.values {
            *v = 0.0;
        }

        for &i in &self.order {
            let node = &self.nodes[i];
            let value = match node.kind {
                NodeKind::Input => inputs.get(node.id).copied().unwrap_or(0.0),
                NodeKind::Bias => 1.0,
                NodeKind::Hidden | NodeKind::Output => {
                    let sum: f64 = self.incoming[i]
                        .iter()
                        .map(|&(from, ci)| self.values[from] * self.connections[ci].weight)
                        .sum();
                    sum.tanh()
                }
            };
            self.values[i] = value;
        }

        let index = self.index_map();
        (0..self.outputs)
            .map(|i| {
                index
                    .get(&self.output_id(i))
                    .map_or(0.0, |&idx| self.values[idx])
            })
            .collect()
    }

    pub fn mutate_with_config<R: Rng>(&mut self, config: &EvolutionConfig, rng: &mut R) {
        let rate = config.mutation_rate;
        let amount = f64::from(config.mutation_amount);

        for conn in &mut self.connections {
            if amount > 0.0 && rng.gen::<f32>() < rate {
                conn.weight += rng.gen_range(-amount..amount);
                conn.weight = conn.weight.clamp(-WEIGHT_LIMIT, WEIGHT_LIMIT);
            }
        }

        if rng.gen::<f32>() < config.add_connection_rate {
            self.add_connection(rng);
        }
        if rng.gen::<f32>() < config.split_connection_rate {
            self.split_connection(rng);
        }
        self.rebuild();
    }

    fn add_connection<R: Rng>(&mut self, rng: &mut R) {
        let from = self.nodes[rng.gen_range(0..self.nodes.len())].id;
        let target = &self.nodes[rng.gen_range(0..self.nodes.len())];
        if matches!(target.kind, NodeKind::Input | NodeKind::Bias) {
            return;
        }
        let to = target.id;
        let innovation = innovation_id(from, to);
        if self.connections.iter().any(|c| c.innovation == innovation) || self.creates_cycle(from, to) {
            return;
        }
        self.connections.push(Connection {
            from,
            to,
            weight: rng.gen_range(-1.0..1.0),
            enabled: true,
            innovation,
        });
    }

    fn split_connection<R: Rng>(&mut self, rng: &mut R) {
        if self.connections.is_empty() {
            return;
        }
        let idx = rng.gen_range(0..self.connections.len());
        if !self.connections[idx].enabled {
            return;
        }
        let Connection { from, to, weight, .. } = self.connections[idx];
        let hidden = split_node_id(from, to);
        if self.nodes.iter().any(|n| n.id == hidden) {
            return;
        }

        self.connections[idx].enabled = false;
        self.nodes.push(Node {
            id: hidden,
            kind: NodeKind::Hidden,
        });
        self.connections.push(Connection {
            from,
            to: hidden,
            weight: 1.0,
            enabled: true,
            innovation: innovation_id(from, hidden),
        });
        self.connections.push(Connection {
            from: hidden,
            to,
            weight,
            enabled: true,
            innovation: innovation_id(hidden, to),
        });
    }

    /// Matching genes are inherited at random, disjoint and excess genes from `self`.
    pub fn crossover_with_rng<R: Rng>(&self, other: &Brain, rng: &mut R) -> Brain {
        let theirs: HashMap<usize, &Connection> =
            other.connections.iter().map(|c| (c.innovation, c)).collect();
        let connections: Vec<Connection> = self
            .connections
            .iter()
            .map(|mine| match theirs.get(&mine.innovation) {
                Some(&other_gene) if rng.gen_bool(0.5) => other_gene.clone(),
                _ => mine.clone(),
            })
            .collect();

        let mut child = Brain {
            nodes: self.nodes.clone(),
            connections,
            inputs: self.inputs,
            outputs: self.outputs,
            order: Vec::new(),
            incoming: Vec::new(),
            values: Vec::new(),
        };
        child.rebuild();
        child
    }
}

impl Controller for Brain {
    fn activate(&mut self, inputs: &[f64]) -> Vec<f64> {
        self.forward(inputs)
    }
}
