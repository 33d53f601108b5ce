//! Graph-based audio engine.

use std::marker::PhantomData;

use hashbrown::HashMap;
use rtrb::Producer;
use tracing::{debug, warn};

use crate::backend::AudioBackend;
use crate::error::BackendError;
use crate::graph::AudioGraph;
use crate::node::{AudioNode, NodeId};
use crate::nodes::{Bus, Gain, GainMessage, Oscillator, OscillatorMessage};
use crate::wave::PeriodicWave;

#[cfg(feature = "cpal_sink")]
use crate::device::CpalDevice;

/// A handle for sending messages to a node added with [`Engine::add`].
///
/// Messages are buffered in a lock-free ring buffer and processed at the start
/// of the next audio block. If the buffer is full, [`Handle::send`] returns
/// `Err(msg)` with the message that couldn't be sent.
pub struct Handle<M: Send + 'static> {
    pub(crate) node_id: NodeId,
    pub(crate) sender: Producer<M>,
    pub(crate) _marker: PhantomData<M>,
}

impl<M: Send + 'static> Handle<M> {
    /// Send a message to the node.
    pub fn send(&mut self, msg: M) -> Result<(), M> {
        self.sender.push(msg).map_err(|rtrb::PushError::Full(m)| m)
    }

    pub fn id(&self) -> NodeId {
        self.node_id
    }
}

/// The audio engine - owns the node graph and renders it block by block.
///
/// Every engine has an output bus (a summing [`Bus`]) that is its
/// [`destination`](AudioBackend::destination). The bus feeds the output sink
/// when one is configured; without a sink the engine still renders, which is
/// useful for tests and offline work.
///
/// ```
/// # use toneport::{AudioBackend, Engine, RtrbSink};
/// let (producer, mut consumer) = rtrb::RingBuffer::new(4096);
/// let mut engine = Engine::new(48_000).with_output(RtrbSink::mono(producer));
///
/// let wave = engine.create_periodic_wave(vec![0.0, 0.0], vec![0.0, 1.0]);
/// let osc = engine.create_oscillator(440.0, &wave).unwrap();
/// let bus = engine.destination();
/// engine.connect(osc, bus).unwrap();
/// engine.start(osc, 0.0);
///
/// engine.process();
/// assert_eq!(consumer.slots(), 64);
/// ```
///
/// # Processing Audio
///
/// Call [`process`](Self::process) repeatedly, paced to real time when a
/// device sink is attached. Each call renders 64 frames and advances
/// [`current_time`](AudioBackend::current_time).
pub struct Engine {
    graph: AudioGraph,
    sample_rate: u32,
    /// Summing bus every tone ends up on
    bus: NodeId,
    /// The output sink node (e.g., CpalSink)
    sink_node: Option<NodeId>,

    oscillators: HashMap<NodeId, Producer<OscillatorMessage>>,
    gains: HashMap<NodeId, Producer<GainMessage>>,
}

impl Engine {
    /// Create an engine with an explicit sample rate and no output sink.
    pub fn new(sample_rate: u32) -> Self {
        let mut graph = AudioGraph::new(sample_rate);
        let bus = graph.add(Bus::new()).id();
        graph.set_terminal(bus);

        Self {
            graph,
            sample_rate,
            bus,
            sink_node: None,
            oscillators: HashMap::new(),
            gains: HashMap::new(),
        }
    }

    /// Create an engine playing through the system's default output device.
    #[cfg(feature = "cpal_sink")]
    pub fn default_output() -> Result<Self, BackendError> {
        let device = CpalDevice::default_output().ok_or(BackendError::NoOutputDevice)?;
        debug!(device = device.name(), sample_rate = device.sample_rate(), "opening output device");
        let sink = device.create_sink()?;
        Ok(Self::new(device.sample_rate()).with_output(sink))
    }

    /// Attach an output sink fed by the bus (builder pattern).
    pub fn with_output<S: AudioNode<Message = ()>>(mut self, sink: S) -> Self {
        if let Some(old) = self.sink_node.take() {
            self.graph.remove(old);
        }
        let sink = self.graph.add(sink).id();
        self.graph.connect(self.bus, sink);
        self.graph.set_terminal(sink);
        self.sink_node = Some(sink);
        self
    }

    /// Get the output sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of nodes in the graph, including the bus and the sink
    pub fn node_count(&self) -> usize {
        self.graph.len()
    }

    /// Whether `node` is still part of the graph
    pub fn contains(&self, node: NodeId) -> bool {
        self.graph.contains(node)
    }

    /// Add a custom node to the graph.
    ///
    /// Returns a [`Handle`] for sending messages to it; connect it with
    /// [`AudioBackend::connect`] using [`Handle::id`].
    pub fn add<N: AudioNode>(&mut self, node: N) -> Handle<N::Message> {
        let handle = self.graph.add(node);
        Handle {
            node_id: handle.id(),
            sender: handle.sender,
            _marker: PhantomData,
        }
    }

    /// Process one block of audio (64 frames).
    pub fn process(&mut self) {
        self.graph.process();
    }

    fn send_gain(&mut self, gain: NodeId, msg: GainMessage) -> Result<(), BackendError> {
        let sender = self.gains.get_mut(&gain).ok_or(BackendError::UnknownNode)?;
        sender.push(msg).map_err(|_| BackendError::QueueFull)
    }

    fn send_oscillator(&mut self, source: NodeId, msg: OscillatorMessage) {
        match self.oscillators.get_mut(&source) {
            Some(sender) => {
                if sender.push(msg).is_err() {
                    warn!(?source, ?msg, "oscillator queue full, message dropped");
                }
            }
            None => warn!(?source, ?msg, "no such oscillator"),
        }
    }
}

impl AudioBackend for Engine {
    type Node = NodeId;

    fn current_time(&self) -> f64 {
        self.graph.frames() as f64 / self.sample_rate as f64
    }

    fn destination(&self) -> NodeId {
        self.bus
    }

    fn create_oscillator(&mut self, frequency: f32, wave: &PeriodicWave) -> Result<NodeId, BackendError> {
        let handle = self.graph.add(Oscillator::new(frequency, wave));
        let id = handle.id();
        self.oscillators.insert(id, handle.sender);
        Ok(id)
    }

    fn create_gain(&mut self, value: f32) -> Result<NodeId, BackendError> {
        let handle = self.graph.add(Gain::new(value));
        let id = handle.id();
        self.gains.insert(id, handle.sender);
        Ok(id)
    }

    fn set_value_at_time(&mut self, gain: NodeId, value: f32, at: f64) -> Result<(), BackendError> {
        self.send_gain(gain, GainMessage::SetValueAtTime { value, at })
    }

    fn exponential_ramp_to_value_at_time(&mut self, gain: NodeId, value: f32, end: f64) -> Result<(), BackendError> {
        self.send_gain(gain, GainMessage::ExponentialRampToValueAtTime { value, end })
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), BackendError> {
        if self.graph.connect(from, to) {
            Ok(())
        } else {
            Err(BackendError::UnknownNode)
        }
    }

    fn start(&mut self, source: NodeId, at: f64) {
        self.send_oscillator(source, OscillatorMessage::Start(at));
    }

    fn stop(&mut self, source: NodeId, at: f64) {
        self.send_oscillator(source, OscillatorMessage::Stop(at));
    }

    fn release(&mut self, node: NodeId) {
        if node == self.bus || Some(node) == self.sink_node {
            return;
        }
        self.oscillators.remove(&node);
        self.gains.remove(&node);
        if self.graph.remove(node) {
            debug!(?node, "released node");
        }
    }
}
