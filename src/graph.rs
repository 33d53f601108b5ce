//! Audio graph - owns nodes and message queues

use std::marker::PhantomData;

use dasp_graph::{Buffer, Input, NodeData, Processor};
use hashbrown::HashMap;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::node::{AudioNode, NodeId, ProcessContext};

/// Capacity of each node's message queue
pub(crate) const MESSAGE_QUEUE_SIZE: usize = 64;

/// Internal handle to send messages to a node in an AudioGraph
pub(crate) struct NodeHandle<M: Send + 'static> {
    pub(crate) id: NodeId,
    pub(crate) sender: Producer<M>,
    pub(crate) _marker: PhantomData<M>,
}

impl<M: Send + 'static> NodeHandle<M> {
    pub fn id(&self) -> NodeId {
        self.id
    }
}

// Type-erased wrapper so we can store heterogeneous nodes
trait ErasedNode: Send {
    fn process_erased(&mut self, ctx: &ProcessContext, inputs: &[Input], outputs: &mut [Buffer]);
}

struct NodeWrapper<N: AudioNode> {
    node: N,
    receiver: Consumer<N::Message>,
}

impl<N: AudioNode> ErasedNode for NodeWrapper<N> {
    fn process_erased(&mut self, ctx: &ProcessContext, inputs: &[Input], outputs: &mut [Buffer]) {
        // Split borrow to avoid conflict between receiver and node
        let receiver = &mut self.receiver;
        let node = &mut self.node;

        let messages = std::iter::from_fn(|| receiver.pop().ok());
        node.process(ctx, messages, inputs, outputs);
    }
}

// Adapter for dasp_graph
struct DaspAdapter {
    node: Box<dyn ErasedNode>,
    /// Stamped by the graph before each block
    ctx: ProcessContext,
}

impl dasp_graph::Node for DaspAdapter {
    fn process(&mut self, inputs: &[Input], outputs: &mut [Buffer]) {
        self.node.process_erased(&self.ctx, inputs, outputs);
    }
}

// Stable indices: releasing a finished tone must not renumber the other nodes.
type InnerGraph = StableGraph<NodeData<DaspAdapter>, ()>;

/// An audio processing graph at a fixed sample rate
pub(crate) struct AudioGraph {
    graph: InnerGraph,
    processor: Processor<InnerGraph>,
    sample_rate: u32,
    /// Index of the first frame of the next block
    frame: u64,

    node_indices: HashMap<NodeId, NodeIndex>,
    next_node_id: u32,

    terminal: Option<NodeIndex>,
}

impl AudioGraph {
    /// Create a new graph with the given sample rate
    pub fn new(sample_rate: u32) -> Self {
        Self {
            graph: InnerGraph::with_capacity(64, 64),
            processor: Processor::with_capacity(64),
            sample_rate,
            frame: 0,
            node_indices: HashMap::new(),
            next_node_id: 0,
            terminal: None,
        }
    }

    /// Frames processed so far
    pub fn frames(&self) -> u64 {
        self.frame
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node_indices.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.node_indices.len()
    }

    /// Add a node, returns a handle for sending messages
    pub fn add<N: AudioNode>(&mut self, node: N) -> NodeHandle<N::Message> {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let (producer, consumer) = RingBuffer::new(MESSAGE_QUEUE_SIZE);

        let num_outputs = node.num_outputs();
        let wrapper = NodeWrapper { node, receiver: consumer };
        let adapter = DaspAdapter {
            node: Box::new(wrapper),
            ctx: self.context(),
        };

        let node_data = match num_outputs {
            2 => NodeData::new2(adapter),
            // 0 outputs = sink, but dasp_graph still needs a buffer for inputs
            _ => NodeData::new1(adapter),
        };

        let idx = self.graph.add_node(node_data);
        self.node_indices.insert(id, idx);

        NodeHandle {
            id,
            sender: producer,
            _marker: PhantomData,
        }
    }

    /// Connect output of `from` to input of `to`.
    ///
    /// Returns `false` if either node is not in the graph.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> bool {
        match (self.node_indices.get(&from), self.node_indices.get(&to)) {
            (Some(&from_idx), Some(&to_idx)) => {
                self.graph.add_edge(from_idx, to_idx, ());
                true
            }
            _ => false,
        }
    }

    /// Remove a node and all of its edges.
    ///
    /// Returns `false` if the node was not in the graph.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(idx) = self.node_indices.remove(&id) else {
            return false;
        };
        if self.terminal == Some(idx) {
            self.terminal = None;
        }
        self.graph.remove_node(idx).is_some()
    }

    /// Set which node to process to (typically a sink)
    pub fn set_terminal(&mut self, id: NodeId) {
        self.terminal = self.node_indices.get(&id).copied();
    }

    /// Process one block of audio through the graph
    pub fn process(&mut self) {
        if let Some(terminal) = self.terminal {
            let ctx = self.context();
            for &idx in self.node_indices.values() {
                self.graph[idx].node.ctx = ctx;
            }
            self.processor.process(&mut self.graph, terminal);
        }
        self.frame += Buffer::LEN as u64;
    }

    fn context(&self) -> ProcessContext {
        ProcessContext {
            sample_rate: self.sample_rate,
            buffer_size: Buffer::LEN,
            frame: self.frame,
        }
    }
}
