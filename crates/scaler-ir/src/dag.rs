//! Wire graph of a noisy stabilizer circuit.
//!
//! Every qubit and every measurement record is a wire. Operations are
//! spliced onto the wires they touch, so the graph orders operations by
//! their data dependencies while node order keeps program order.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::Instruction;
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node of the wire graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Start of a wire.
    In(WireId),
    /// End of a wire.
    Out(WireId),
    /// An operation.
    Op(Instruction),
}

impl DagNode {
    /// The operation, if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }

    /// Whether this node occupies a time step: every operation except noise.
    #[inline]
    fn is_timed(&self) -> bool {
        self.instruction().is_some_and(|inst| !inst.is_noise())
    }
}

/// A wire: a qubit or a measurement record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A qubit.
    Qubit(QubitId),
    /// A measurement record.
    Clbit(ClbitId),
}

/// One segment of a wire between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this segment belongs to.
    pub wire: WireId,
}

/// Wire graph of a circuit.
///
/// `front` holds the last node on each wire, so appending an operation
/// costs O(1) per operand. A record wire carries exactly one operation,
/// the measurement that writes it.
#[derive(Debug, Clone, Default)]
pub struct CircuitDag {
    graph: DiGraph<DagNode, DagEdge, u32>,
    inputs: FxHashMap<WireId, NodeIndex>,
    outputs: FxHashMap<WireId, NodeIndex>,
    front: FxHashMap<WireId, NodeIndex>,
    writers: FxHashMap<ClbitId, NodeIndex>,
    num_qubits: usize,
    num_noise: usize,
}

impl CircuitDag {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a qubit wire. Adding a wire twice is a no-op.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.add_wire(WireId::Qubit(qubit)) {
            self.num_qubits += 1;
        }
    }

    /// Add a measurement record wire. Adding a wire twice is a no-op.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        self.add_wire(WireId::Clbit(clbit));
    }

    fn add_wire(&mut self, wire: WireId) -> bool {
        if self.inputs.contains_key(&wire) {
            return false;
        }
        let start = self.graph.add_node(DagNode::In(wire));
        let end = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(start, end, DagEdge { wire });
        self.inputs.insert(wire, start);
        self.outputs.insert(wire, end);
        self.front.insert(wire, start);
        true
    }

    /// Append an operation after everything already on its wires.
    ///
    /// Rejects wrong arity, unknown or repeated qubits, unknown records and
    /// records that an earlier measurement already wrote.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        let op = || Some(instruction.name().to_string());

        if let Some(expected) = instruction.expected_arity() {
            let got = instruction.qubits.len();
            if expected as usize != got {
                return Err(IrError::QubitCountMismatch {
                    op: instruction.name().to_string(),
                    expected,
                    got: got as u32,
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !self.inputs.contains_key(&WireId::Qubit(qubit)) {
                return Err(IrError::QubitNotFound { qubit, op: op() });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit { qubit, op: op() });
            }
        }
        for &clbit in &instruction.clbits {
            if !self.inputs.contains_key(&WireId::Clbit(clbit)) {
                return Err(IrError::ClbitNotFound { clbit, op: op() });
            }
            if self.writers.contains_key(&clbit) {
                return Err(IrError::RecordRewritten { clbit });
            }
        }

        let wires: Vec<WireId> = instruction
            .qubits
            .iter()
            .map(|&q| WireId::Qubit(q))
            .chain(instruction.clbits.iter().map(|&c| WireId::Clbit(c)))
            .collect();
        let clbits = instruction.clbits.clone();
        if instruction.is_noise() {
            self.num_noise += 1;
        }
        let node = self.graph.add_node(DagNode::Op(instruction));

        for wire in wires {
            let end = self.outputs[&wire];
            let last = self.front[&wire];
            let closing = self
                .graph
                .edges_directed(last, Direction::Outgoing)
                .find(|e| e.weight().wire == wire && e.target() == end)
                .map(|e| e.id())
                .ok_or_else(|| IrError::InvalidDag(format!("wire {wire:?} is not closed")))?;
            self.graph.remove_edge(closing);
            self.graph.add_edge(last, node, DagEdge { wire });
            self.graph.add_edge(node, end, DagEdge { wire });
            self.front.insert(wire, node);
        }
        for clbit in clbits {
            self.writers.insert(clbit, node);
        }

        Ok(node)
    }

    /// Operations in program order.
    ///
    /// Nodes are only appended after their predecessors on every wire, so
    /// node order is topological. Noise-site numbering depends on this
    /// order being stable.
    pub fn topological_ops(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
    }

    /// The operation at `node`.
    #[inline]
    pub fn instruction(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node).and_then(DagNode::instruction)
    }

    /// The measurement that writes `clbit`.
    pub fn record_writer(&self, clbit: ClbitId) -> Option<&Instruction> {
        self.writers
            .get(&clbit)
            .and_then(|&node| self.instruction(node))
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.inputs.len() - self.num_qubits
    }

    /// Number of operations, noise included.
    #[inline]
    pub fn num_ops(&self) -> usize {
        self.graph.node_count().saturating_sub(2 * self.inputs.len())
    }

    /// Number of noise channels.
    #[inline]
    pub fn num_noise_locations(&self) -> usize {
        self.num_noise
    }

    /// Length of the longest dependency chain of gates, measurements and
    /// resets. Noise channels take no time step.
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.graph.node_count()];
        let mut deepest = 0;
        // Operation predecessors always have smaller indices. Out nodes may
        // not, but nothing reads their depth.
        for node in self.graph.node_indices() {
            let before = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|e| depths[e.source().index()])
                .max()
                .unwrap_or(0);
            let here = before + usize::from(self.graph[node].is_timed());
            depths[node.index()] = here;
            deepest = deepest.max(here);
        }
        deepest
    }

    /// The underlying petgraph graph.
    pub fn graph(&self) -> &DiGraph<DagNode, DagEdge, u32> {
        &self.graph
    }

    /// Check that every wire runs unbroken from its start to its end and
    /// that every record has exactly one writer on its wire.
    pub fn verify_integrity(&self) -> IrResult<()> {
        if petgraph::algo::is_cyclic_directed(&self.graph) {
            return Err(IrError::InvalidDag("graph contains a cycle".into()));
        }
        for (&wire, &start) in &self.inputs {
            let end = self
                .outputs
                .get(&wire)
                .copied()
                .ok_or_else(|| IrError::InvalidDag(format!("wire {wire:?} has no end")))?;
            let steps = self.walk(wire, start, end)?;
            if let WireId::Clbit(clbit) = wire {
                let written = usize::from(self.writers.contains_key(&clbit));
                if steps != written {
                    return Err(IrError::InvalidDag(format!(
                        "record {clbit} carries {steps} operations"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Follow `wire` from `start` to `end`, counting operations on the way.
    fn walk(&self, wire: WireId, start: NodeIndex, end: NodeIndex) -> IrResult<usize> {
        let mut current = start;
        let mut ops = 0;
        while current != end {
            if ops > self.graph.node_count() {
                return Err(IrError::InvalidDag(format!("wire {wire:?} does not terminate")));
            }
            current = self
                .graph
                .edges_directed(current, Direction::Outgoing)
                .find(|e| e.weight().wire == wire)
                .map(|e| e.target())
                .ok_or_else(|| {
                    IrError::InvalidDag(format!("wire {wire:?} is broken after {current:?}"))
                })?;
            if current != end {
                ops += 1;
            }
        }
        Ok(ops)
    }
}
