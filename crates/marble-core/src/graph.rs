//! Typed render graph, declared as data and built once.
//!
//! A [`GraphSpec`] collects nodes and edges; [`GraphSpec::build`] validates the
//! topology and freezes it into an [`AudioGraph`] with adjacency lists, a
//! topological render order, and preallocated per-node buffers. Nothing in the
//! graph changes after build; all live control goes through the nodes' shared
//! parameters.
//!
//! Edge semantics: output channel `c` of `from` is summed into input port
//! `port + c` of `to`. A mono source feeding port 2 of a four-port node only
//! touches port 2; a stereo source feeding port 0 of a stereo node fills
//! ports 0 and 1.

use crate::backend::AudioRenderer;
use crate::node::RenderNode;
use crate::{Error, Result};
use std::collections::VecDeque;

/// Index of a node inside its graph.
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub port: usize,
}

/// Graph under construction.
#[derive(Default)]
pub struct GraphSpec {
    nodes: Vec<Box<dyn RenderNode>>,
    edges: Vec<Edge>,
    sink: Option<NodeId>,
}

impl GraphSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning its id.
    pub fn node(&mut self, node: Box<dyn RenderNode>) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn connect(&mut self, from: NodeId, to: NodeId, port: usize) -> &mut Self {
        self.edges.push(Edge { from, to, port });
        self
    }

    /// Mark the node whose outputs feed the device.
    pub fn sink(&mut self, id: NodeId) -> &mut Self {
        self.sink = Some(id);
        self
    }

    pub fn build(self, sample_rate: f64) -> Result<AudioGraph> {
        let GraphSpec {
            mut nodes,
            edges,
            sink,
        } = self;
        let count = nodes.len();

        let sink = sink.ok_or_else(|| Error::InvalidGraph("no sink node".into()))?;
        if sink >= count {
            return Err(Error::InvalidGraph(format!("sink {} does not exist", sink)));
        }
        if nodes[sink].outputs() == 0 {
            return Err(Error::InvalidGraph(format!(
                "sink '{}' has no outputs",
                nodes[sink].name()
            )));
        }

        let mut upstream: Vec<Vec<Edge>> = vec![Vec::new(); count];
        let mut downstream: Vec<Vec<NodeId>> = vec![Vec::new(); count];

        for edge in &edges {
            if edge.from >= count || edge.to >= count {
                return Err(Error::InvalidGraph(format!(
                    "edge {} -> {} references a missing node",
                    edge.from, edge.to
                )));
            }
            if edge.from == edge.to {
                return Err(Error::InvalidGraph(format!(
                    "'{}' is connected to itself",
                    nodes[edge.from].name()
                )));
            }
            let width = nodes[edge.from].outputs();
            if edge.port + width > nodes[edge.to].inputs() {
                return Err(Error::InvalidGraph(format!(
                    "'{}' ({} ch) does not fit port {} of '{}' ({} ports)",
                    nodes[edge.from].name(),
                    width,
                    edge.port,
                    nodes[edge.to].name(),
                    nodes[edge.to].inputs()
                )));
            }
            upstream[edge.to].push(*edge);
            downstream[edge.from].push(edge.to);
        }

        let order = topological_order(&upstream, &downstream)?;

        // Only nodes that can reach the sink are rendered.
        let mut feeds_sink = vec![false; count];
        feeds_sink[sink] = true;
        let mut stack = vec![sink];
        while let Some(id) = stack.pop() {
            for edge in &upstream[id] {
                if !feeds_sink[edge.from] {
                    feeds_sink[edge.from] = true;
                    stack.push(edge.from);
                }
            }
        }
        let order: Vec<NodeId> = order.into_iter().filter(|&id| feeds_sink[id]).collect();
        let pruned = count - order.len();
        if pruned > 0 {
            tracing::debug!(pruned, "nodes unreachable from sink will not render");
        }

        for node in nodes.iter_mut() {
            node.set_sample_rate(sample_rate);
        }

        let inputs = nodes.iter().map(|n| vec![0.0; n.inputs()]).collect();
        let outputs = nodes.iter().map(|n| vec![0.0; n.outputs()]).collect();

        tracing::debug!(nodes = count, edges = edges.len(), "audio graph built");

        Ok(AudioGraph {
            nodes,
            upstream,
            order,
            sink,
            inputs,
            outputs,
            sample_rate,
        })
    }
}

/// Kahn's algorithm; any leftover node means a cycle.
fn topological_order(upstream: &[Vec<Edge>], downstream: &[Vec<NodeId>]) -> Result<Vec<NodeId>> {
    let count = upstream.len();
    let mut pending: Vec<usize> = upstream.iter().map(Vec::len).collect();
    let mut ready: VecDeque<NodeId> = (0..count).filter(|&id| pending[id] == 0).collect();
    let mut order = Vec::with_capacity(count);

    while let Some(id) = ready.pop_front() {
        order.push(id);
        for &next in &downstream[id] {
            pending[next] -= 1;
            if pending[next] == 0 {
                ready.push_back(next);
            }
        }
    }

    if order.len() != count {
        return Err(Error::InvalidGraph("graph contains a cycle".into()));
    }
    Ok(order)
}

/// Built render graph.
pub struct AudioGraph {
    nodes: Vec<Box<dyn RenderNode>>,
    upstream: Vec<Vec<Edge>>,
    order: Vec<NodeId>,
    sink: NodeId,
    inputs: Vec<Vec<f32>>,
    outputs: Vec<Vec<f32>>,
    sample_rate: f64,
}

impl AudioGraph {
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes in the order they are ticked.
    pub fn render_order(&self) -> &[NodeId] {
        &self.order
    }

    /// Number of channels the sink produces.
    pub fn sink_channels(&self) -> usize {
        self.outputs[self.sink].len()
    }

    pub fn reset(&mut self) {
        for node in self.nodes.iter_mut() {
            node.reset();
        }
    }

    /// Render one frame; returns the sink's outputs.
    #[inline]
    pub fn tick_frame(&mut self) -> &[f32] {
        for &id in &self.order {
            let input = &mut self.inputs[id];
            input.fill(0.0);
            for edge in &self.upstream[id] {
                for (c, sample) in self.outputs[edge.from].iter().enumerate() {
                    input[edge.port + c] += *sample;
                }
            }
            self.nodes[id].tick(&self.inputs[id], &mut self.outputs[id]);
        }
        &self.outputs[self.sink]
    }

    /// Render interleaved frames into `output`.
    ///
    /// Extra device channels are zeroed; a mono device gets the average of the
    /// sink's channels.
    pub fn render(&mut self, output: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        for frame in output.chunks_mut(channels) {
            let sink = self.tick_frame();
            if channels == 1 {
                frame[0] = sink.iter().sum::<f32>() / sink.len() as f32;
            } else {
                for (ch, slot) in frame.iter_mut().enumerate() {
                    *slot = sink.get(ch).copied().unwrap_or(0.0);
                }
            }
        }
    }
}

impl AudioRenderer for AudioGraph {
    fn render(&mut self, output: &mut [f32], channels: usize) {
        AudioGraph::render(self, output, channels);
    }
}
