use fxhash::{FxHashMap, FxHashSet};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use itertools::Itertools;
use petgraph::{ algo::astar, graph::{ EdgeIndex, Graph, NodeIndex }, visit::EdgeRef };
use rayon::{iter::{IntoParallelIterator, ParallelIterator}, ThreadPoolBuilder};
use serde_derive::Deserialize;

use crate::{
    config::Config,
    error::{Error, Result},
    np_core::{parameters::{ PB_CHARS, PB_TEMPLATES, PROPAGATION_SPEED_KM_PER_MS, THREADS }, Region},
    utils, Edge, Node, SD,
};

#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub node: Node,
    pub name: String,
    /// CORE / METRO tags, sorted by precedence
    pub regions: Vec<Region>,
    /// Every other tag
    pub islands: Vec<String>,
}

impl NodeInfo {
    pub fn new(index: usize, name: &str, tags: &[String]) -> Self {
        let (regions, islands) = Region::partition_tags(tags);
        Self {
            node: Node::new(index),
            name: name.to_string(),
            regions,
            islands,
        }
    }

    pub fn has_region(&self, region: Region) -> bool {
        self.regions.contains(&region)
    }

    pub fn shares_island(&self, other: &NodeInfo) -> bool {
        self.islands.iter().any(|island| other.islands.contains(island))
    }
}

#[derive(Debug, Clone)]
pub struct FiberLink {
    pub edge: Edge,
    pub length_km: f64,
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone)]
pub struct RouteCandidate {
    pub node_route: Vec<usize>,
    pub edge_route: Vec<Edge>,
    pub lengths_km: Vec<f64>,
}

impl RouteCandidate {
    pub fn new(node_route: Vec<usize>, edge_route: Vec<Edge>, lengths_km: Vec<f64>) -> RouteCandidate {
        RouteCandidate {
            node_route,
            edge_route,
            lengths_km,
        }
    }

    pub fn length_km(&self) -> f64 {
        self.lengths_km.iter().sum()
    }

    pub fn propagation_delay_ms(&self) -> f64 {
        self.length_km() / PROPAGATION_SPEED_KM_PER_MS
    }
}

/// Limits applied to candidate paths. Non-positive limits mean "no limit".
#[derive(Debug, Clone, Copy)]
pub struct PathConstraints {
    pub k: usize,
    pub max_propagation_delay_ms: f64,
    pub max_route_length_km: f64,
}

impl PathConstraints {
    pub fn from_config(config: &Config) -> Self {
        Self {
            k: config.network.k,
            max_propagation_delay_ms: config.network.max_propagation_delay_ms,
            max_route_length_km: config.network.max_route_length_km,
        }
    }

    fn admits(&self, route: &RouteCandidate) -> bool {
        let within_delay = self.max_propagation_delay_ms <= 0.0
            || route.propagation_delay_ms() <= self.max_propagation_delay_ms;
        let within_length = self.max_route_length_km <= 0.0
            || route.length_km() <= self.max_route_length_km;

        within_delay && within_length
    }
}

pub trait CandidatePathProvider {
    /// At most `constraints.k` routes from `sd.src` to `sd.dst`, shortest first.
    fn compute_candidate_paths(&self, sd: &SD, constraints: &PathConstraints) -> Vec<RouteCandidate>;
}

#[derive(Debug, Deserialize)]
struct TopologyFile {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "node")]
    nodes: Vec<NodeEntry>,
    #[serde(default, rename = "link")]
    links: Vec<LinkEntry>,
}

#[derive(Debug, Deserialize)]
struct NodeEntry {
    id: usize,
    #[serde(default)]
    name: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LinkEntry {
    src: usize,
    dst: usize,
    length_km: f64,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "default_bidirectional")]
    bidirectional: bool,
}

fn default_bidirectional() -> bool {
    true
}

#[derive(Debug)]
pub struct Topology {
    /// トポロジの名前
    pub name: String,
    pub nodes: Vec<NodeInfo>,
    pub links: Vec<FiberLink>,
    link_index: FxHashMap<Edge, usize>,
    graph: Graph<usize, f64>,
}

impl Topology {
    pub fn new(config: &Config) -> Result<Topology> {
        let contents = utils::read_file(&config.network.topology)?;
        Self::from_toml_str(&contents)
    }

    /// Nodes are `[[node]]` tables with a dense `id`, links are `[[link]]` tables.
    pub fn from_toml_str(contents: &str) -> Result<Topology> {
        let file: TopologyFile = toml::from_str(contents)?;

        let mut entries = file.nodes;
        entries.sort_by_key(|n| n.id);
        for (index, entry) in entries.iter().enumerate() {
            if entry.id != index {
                return Err(Error::InvalidTopology(format!("node ids must be 0..{} without gaps, found {}", entries.len(), entry.id)));
            }
        }
        let nodes = entries
            .iter()
            .map(|n| NodeInfo::new(n.id, &n.name, &n.tags))
            .collect();

        let mut links = vec![];
        for entry in &file.links {
            let (regions, _) = Region::partition_tags(&entry.tags);
            let edge = Edge::new(entry.src, entry.dst);
            links.push(FiberLink { edge, length_km: entry.length_km, regions: regions.clone() });
            if entry.bidirectional {
                links.push(FiberLink { edge: edge.reversed(), length_km: entry.length_km, regions });
            }
        }

        Self::from_parts(&file.name, nodes, links)
    }

    pub fn from_parts(name: &str, nodes: Vec<NodeInfo>, links: Vec<FiberLink>) -> Result<Topology> {
        if nodes.is_empty() {
            return Err(Error::EmptyTopology);
        }
        if links.is_empty() {
            return Err(Error::NoLinks);
        }

        let mut link_index = FxHashMap::default();
        for (index, link) in links.iter().enumerate() {
            for node in [link.edge.src, link.edge.dst] {
                if node.index() >= nodes.len() {
                    return Err(Error::UnknownNode(node.index()));
                }
            }
            if link.edge.src == link.edge.dst {
                return Err(Error::InvalidTopology(format!("link {} is a self loop", link.edge)));
            }
            if link.length_km <= 0.0 {
                return Err(Error::InvalidTopology(format!("link {} has non-positive length", link.edge)));
            }
            if link.regions.is_empty() {
                return Err(Error::InvalidTopology(format!("link {} has no CORE/METRO tag", link.edge)));
            }
            if link_index.insert(link.edge, index).is_some() {
                return Err(Error::InvalidTopology(format!("link {} is declared twice", link.edge)));
            }
        }

        // グラフの作成
        let mut graph = Graph::<usize, f64>::new();
        for node in &nodes {
            graph.add_node(node.node.index());
        }
        for link in &links {
            graph.add_edge(NodeIndex::new(link.edge.src.into()), NodeIndex::new(link.edge.dst.into()), link.length_km);
        }

        Ok(Topology {
            name: name.to_string(),
            nodes,
            links,
            link_index,
            graph,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains_node(&self, node: Node) -> bool {
        node.index() < self.nodes.len()
    }

    pub fn node(&self, node: Node) -> Result<&NodeInfo> {
        self.nodes.get(node.index()).ok_or(Error::UnknownNode(node.index()))
    }

    pub fn link(&self, edge: &Edge) -> Result<&FiberLink> {
        self.link_index
            .get(edge)
            .map(|&index| &self.links[index])
            .ok_or(Error::UnknownLink(*edge))
    }

    /// Shortest route by km that avoids `removed_nodes` and `removed_edges`.
    fn shortest_route(
        &self,
        src: NodeIndex,
        dst: NodeIndex,
        removed_nodes: &FxHashSet<NodeIndex>,
        removed_edges: &FxHashSet<EdgeIndex>,
    ) -> Option<(f64, Vec<NodeIndex>)> {
        let (length_km, route) = astar(
            &self.graph,
            src,
            |n| n == dst,
            |e| {
                let removed = removed_edges.contains(&e.id())
                    || removed_nodes.contains(&e.source())
                    || removed_nodes.contains(&e.target());
                if removed { f64::INFINITY } else { *e.weight() }
            },
            |_| 0.0,
        )?;

        length_km.is_finite().then_some((length_km, route))
    }

    fn route_length_km(&self, route: &[NodeIndex]) -> f64 {
        route
            .windows(2)
            .filter_map(|w| self.graph.find_edge(w[0], w[1]))
            .filter_map(|e| self.graph.edge_weight(e))
            .sum()
    }

    /// The `k` shortest loopless routes by km, shortest first (Yen).
    /// Equal lengths go to fewer hops, then to the route found first.
    fn k_shortest_routes(&self, src: NodeIndex, dst: NodeIndex, k: usize) -> Vec<Vec<NodeIndex>> {
        if k == 0 {
            return vec![];
        }

        let no_nodes = FxHashSet::default();
        let no_edges = FxHashSet::default();
        let Some((_, first)) = self.shortest_route(src, dst, &no_nodes, &no_edges) else {
            return vec![];
        };

        let mut shortest: Vec<Vec<NodeIndex>> = vec![first];
        let mut pending: Vec<(f64, Vec<NodeIndex>)> = vec![];

        while shortest.len() < k {
            let Some(last) = shortest.last().cloned() else {
                break;
            };

            for i in 0..last.len() - 1 {
                let root = &last[..=i];
                let removed_edges: FxHashSet<EdgeIndex> = shortest
                    .iter()
                    .filter(|route| route.len() > i + 1 && route[..=i] == *root)
                    .filter_map(|route| self.graph.find_edge(route[i], route[i + 1]))
                    .collect();
                let removed_nodes: FxHashSet<NodeIndex> = root[..i].iter().copied().collect();

                let Some((spur_km, spur)) = self.shortest_route(last[i], dst, &removed_nodes, &removed_edges) else {
                    continue;
                };

                let mut route = root[..i].to_vec();
                route.extend(spur);
                if shortest.contains(&route) || pending.iter().any(|(_, r)| *r == route) {
                    continue;
                }
                pending.push((self.route_length_km(root) + spur_km, route));
            }

            let next = pending
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.0.total_cmp(&b.0).then_with(|| a.1.len().cmp(&b.1.len())))
                .map(|(index, _)| index);
            match next {
                Some(index) => shortest.push(pending.remove(index).1),
                None => break,
            }
        }

        shortest
    }
}

impl CandidatePathProvider for Topology {
    fn compute_candidate_paths(&self, sd: &SD, constraints: &PathConstraints) -> Vec<RouteCandidate> {
        if sd.src == sd.dst || !self.contains_node(sd.src) || !self.contains_node(sd.dst) {
            return vec![];
        }

        let src = NodeIndex::new(sd.src.into());
        let dst = NodeIndex::new(sd.dst.into());

        // lengths and delays grow along the ranking, so the limits only cut its tail
        self.k_shortest_routes(src, dst, constraints.k)
            .into_iter()
            .map(|route| {
                let node_route: Vec<usize> = route.iter().map(|n| n.index()).collect();
                let edge_route: Vec<Edge> = node_route.windows(2).map(|w| Edge::new(w[0], w[1])).collect();
                let lengths_km = edge_route
                    .iter()
                    .map(|edge| self.link_index.get(edge).map_or(0.0, |&i| self.links[i].length_km))
                    .collect();
                RouteCandidate::new(node_route, edge_route, lengths_km)
            })
            .filter(|route| constraints.admits(route))
            .collect()
    }
}

/// Candidate paths for every distinct node pair in `sds`, computed in parallel.
pub fn compute_route_candidates<P: CandidatePathProvider + Sync>(
    provider: &P,
    sds: &[SD],
    constraints: &PathConstraints,
    show_progress: bool,
) -> Result<FxHashMap<SD, Vec<RouteCandidate>>> {
    let unique_sds: Vec<SD> = sds.iter().copied().unique().collect();

    let pb = ProgressBar::new(unique_sds.len() as u64);
    if show_progress {
        if let Ok(style) = ProgressStyle::default_bar().template(PB_TEMPLATES) {
            pb.set_style(style.progress_chars(PB_CHARS));
        }
        pb.set_message("candidate paths");
    } else {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(THREADS)
        .build()?;
    let route_candidates_vec: Vec<(SD, Vec<RouteCandidate>)> = pool.install(|| {
        unique_sds.into_par_iter().map(|sd| {
            let candidates = provider.compute_candidate_paths(&sd, constraints);
            pb.inc(1);
            (sd, candidates)
        }).collect()
    });
    pb.finish_and_clear();

    Ok(route_candidates_vec.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"
        name = "square"

        [[node]]
        id = 0
        tags = ["METRO", "west"]
        [[node]]
        id = 1
        tags = ["CORE"]
        [[node]]
        id = 2
        tags = ["CORE"]
        [[node]]
        id = 3
        tags = ["METRO", "east"]

        [[link]]
        src = 0
        dst = 1
        length_km = 100.0
        tags = ["METRO"]
        [[link]]
        src = 1
        dst = 3
        length_km = 100.0
        tags = ["CORE"]
        [[link]]
        src = 0
        dst = 2
        length_km = 50.0
        tags = ["METRO"]
        [[link]]
        src = 2
        dst = 3
        length_km = 60.0
        tags = ["CORE"]
    "#;

    fn constraints(k: usize) -> PathConstraints {
        PathConstraints { k, max_propagation_delay_ms: -1.0, max_route_length_km: -1.0 }
    }

    #[test]
    fn toml_topology_is_loaded_bidirectionally() {
        let topology = Topology::from_toml_str(SQUARE).unwrap();

        assert_eq!(topology.name, "square");
        assert_eq!(topology.node_count(), 4);
        assert_eq!(topology.links.len(), 8);
        assert_eq!(topology.link(&Edge::new(3, 2)).unwrap().length_km, 60.0);
        assert_eq!(topology.nodes[0].islands, vec!["west".to_string()]);
        assert!(matches!(topology.link(&Edge::new(0, 3)), Err(Error::UnknownLink(_))));
    }

    #[test]
    fn candidates_are_ranked_by_length() {
        let topology = Topology::from_toml_str(SQUARE).unwrap();
        let candidates = topology.compute_candidate_paths(&SD::new(0, 3), &constraints(5));

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].node_route, vec![0, 2, 3]);
        assert_eq!(candidates[0].length_km(), 110.0);
        assert_eq!(candidates[1].node_route, vec![0, 1, 3]);

        let candidates = topology.compute_candidate_paths(&SD::new(0, 3), &constraints(1));
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn length_and_delay_limits_filter_candidates() {
        let topology = Topology::from_toml_str(SQUARE).unwrap();
        let sd = SD::new(0, 3);

        let by_length = PathConstraints { max_route_length_km: 150.0, ..constraints(5) };
        assert_eq!(topology.compute_candidate_paths(&sd, &by_length).len(), 1);

        // 110km takes 0.55ms
        let by_delay = PathConstraints { max_propagation_delay_ms: 0.5, ..constraints(5) };
        assert!(topology.compute_candidate_paths(&sd, &by_delay).is_empty());
    }

    #[test]
    fn parallel_precompute_covers_each_pair_once() {
        let topology = Topology::from_toml_str(SQUARE).unwrap();
        let sds = vec![SD::new(0, 3), SD::new(0, 3), SD::new(1, 2)];
        let candidates = compute_route_candidates(&topology, &sds, &constraints(5), false).unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[&SD::new(1, 2)].len(), 2);
    }

    #[test]
    fn broken_topologies_are_rejected() {
        assert!(matches!(Topology::from_parts("x", vec![], vec![]), Err(Error::EmptyTopology)));

        let nodes = vec![NodeInfo::new(0, "a", &[]), NodeInfo::new(1, "b", &[])];
        assert!(matches!(Topology::from_parts("x", nodes.clone(), vec![]), Err(Error::NoLinks)));

        let untagged = vec![FiberLink { edge: Edge::new(0, 1), length_km: 10.0, regions: vec![] }];
        assert!(matches!(Topology::from_parts("x", nodes.clone(), untagged), Err(Error::InvalidTopology(_))));

        let dangling = vec![FiberLink { edge: Edge::new(0, 7), length_km: 10.0, regions: vec![Region::Core] }];
        assert!(matches!(Topology::from_parts("x", nodes, dangling), Err(Error::UnknownNode(7))));
    }

    #[test]
    fn longer_hop_routes_win_when_they_are_shorter_in_km() {
        let nodes = (0..5).map(|i| NodeInfo::new(i, "", &["CORE".to_string()])).collect();
        let mut links = vec![];
        for (src, dst, length_km) in [(0, 1, 5000.0), (0, 2, 100.0), (2, 3, 100.0), (3, 4, 100.0), (4, 1, 100.0)] {
            let link = FiberLink { edge: Edge::new(src, dst), length_km, regions: vec![Region::Core] };
            links.push(FiberLink { edge: link.edge.reversed(), ..link.clone() });
            links.push(link);
        }
        let topology = Topology::from_parts("detour", nodes, links).unwrap();

        let candidates = topology.compute_candidate_paths(&SD::new(0, 1), &constraints(5));
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].node_route, vec![0, 2, 3, 4, 1]);
        assert_eq!(candidates[0].length_km(), 400.0);
        assert_eq!(candidates[1].node_route, vec![0, 1]);

        let candidates = topology.compute_candidate_paths(&SD::new(0, 1), &constraints(1));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].length_km(), 400.0);
    }

    #[test]
    fn yen_ranking_lists_every_route_of_a_grid_in_order() {
        // 0 - 1 - 2
        // |   |   |
        // 3 - 4 - 5
        let nodes = (0..6).map(|i| NodeInfo::new(i, "", &["METRO".to_string()])).collect();
        let mut links = vec![];
        for (src, dst, length_km) in [(0, 1, 10.0), (1, 2, 10.0), (3, 4, 12.0), (4, 5, 12.0), (0, 3, 5.0), (1, 4, 5.0), (2, 5, 5.0)] {
            let link = FiberLink { edge: Edge::new(src, dst), length_km, regions: vec![Region::Metro] };
            links.push(FiberLink { edge: link.edge.reversed(), ..link.clone() });
            links.push(link);
        }
        let topology = Topology::from_parts("grid", nodes, links).unwrap();

        let candidates = topology.compute_candidate_paths(&SD::new(0, 5), &constraints(10));
        let lengths: Vec<f64> = candidates.iter().map(|c| c.length_km()).collect();

        assert_eq!(candidates.len(), 4);
        assert_eq!(lengths, vec![25.0, 27.0, 29.0, 37.0]);
        assert_eq!(candidates[0].node_route, vec![0, 1, 2, 5]);
        assert!(candidates.iter().all(|c| c.node_route.iter().unique().count() == c.node_route.len()));
    }
}
