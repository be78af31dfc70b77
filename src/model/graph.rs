use bincode::{Decode, Encode};

/// A molecule encoded as a typed graph, ready for a graph-learning model.
///
/// Node rows in `x` are `[one-hot atom type | atomic number, aromatic, sp, sp2, sp3, num_hs]`.
/// Edges are directed; every bond contributes both directions, sorted by
/// `src * num_nodes + dst`.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct GraphSample {
    pub x: Vec<Vec<f32>>,
    pub z: Vec<u8>,
    pub pos: Vec<[f32; 3]>,
    pub edge_index: Vec<[usize; 2]>,
    pub edge_type: Vec<usize>,
    pub edge_attr: Vec<Vec<f32>>,
    pub y: Vec<f32>,
    /// Source column of every entry in `y`.
    pub y_columns: Vec<usize>,
    pub name: String,
    pub smiles: String,
    /// Position of the molecule in the source structure file.
    pub idx: usize,
}

impl GraphSample {
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.z.len()
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edge_index.len()
    }

    pub fn node_feature_dim(&self) -> usize {
        self.x.first().map_or(0, Vec::len)
    }

    pub fn edge_feature_dim(&self) -> usize {
        self.edge_attr.first().map_or(0, Vec::len)
    }
}

/// Cumulative node and edge offsets of a [`Collection`].
///
/// `nodes[i]..nodes[i + 1]` is the flat node range of sample `i` when all samples
/// are laid end to end; `edges` works the same way.
#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
pub struct Slices {
    pub nodes: Vec<usize>,
    pub edges: Vec<usize>,
}

impl Slices {
    fn build(samples: &[GraphSample]) -> Self {
        let mut nodes = Vec::with_capacity(samples.len() + 1);
        let mut edges = Vec::with_capacity(samples.len() + 1);
        nodes.push(0);
        edges.push(0);
        for sample in samples {
            nodes.push(nodes[nodes.len() - 1] + sample.num_nodes());
            edges.push(edges[edges.len() - 1] + sample.num_edges());
        }
        Self { nodes, edges }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Encode, Decode)]
pub struct Collection {
    samples: Vec<GraphSample>,
    slices: Slices,
}

impl Collection {
    pub fn new(samples: Vec<GraphSample>) -> Self {
        let slices = Slices::build(&samples);
        Self { samples, slices }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GraphSample> {
        self.samples.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GraphSample> {
        self.samples.iter()
    }

    pub fn samples(&self) -> &[GraphSample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<GraphSample> {
        self.samples
    }

    pub fn slices(&self) -> &Slices {
        &self.slices
    }

    pub fn total_nodes(&self) -> usize {
        self.slices.nodes.last().copied().unwrap_or(0)
    }

    pub fn total_edges(&self) -> usize {
        self.slices.edges.last().copied().unwrap_or(0)
    }

    pub fn node_range(&self, index: usize) -> Option<std::ops::Range<usize>> {
        let start = *self.slices.nodes.get(index)?;
        let end = *self.slices.nodes.get(index + 1)?;
        Some(start..end)
    }

    pub fn edge_range(&self, index: usize) -> Option<std::ops::Range<usize>> {
        let start = *self.slices.edges.get(index)?;
        let end = *self.slices.edges.get(index + 1)?;
        Some(start..end)
    }

    /// Checks that the stored slices agree with the samples, e.g. after decoding.
    pub fn slices_consistent(&self) -> bool {
        self.slices == Slices::build(&self.samples)
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a GraphSample;
    type IntoIter = std::slice::Iter<'a, GraphSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
