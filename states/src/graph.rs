use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt::{Debug, Formatter},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError<T>
where
    T: Debug,
{
    #[error("Cycle detected in dependency graph, from {:?}", .0)]
    CycleDetected(DepRoute<T>),
    #[error("Duplicate edge detected in dependency graph, from {:?} to {:?}", .0.route[0], .0.route[1])]
    DuplicateEdge(DepRoute<T>),
}

/// A path through the graph, first node to last.
pub struct DepRoute<T> {
    route: Vec<T>,
}

impl<T> Debug for DepRoute<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let len = self.route.len();
        if len == 0 {
            return write!(f, "[]");
        }
        for item in &self.route[..len - 1] {
            write!(f, "{item:?} -> ")?;
        }
        write!(f, "{:?}", self.route[len - 1])
    }
}

/// Directed dependency graph: an edge `from -> to` means `to` must be
/// recomputed after `from` changes.
#[derive(Debug, Default)]
pub struct Graph<Node>
where
    Node: Debug + Copy + Ord,
{
    edges: Vec<(Node, Node)>,
}

impl<Node> Graph<Node>
where
    Node: Debug + Copy + Ord,
{
    pub fn new() -> Self {
        Self { edges: Vec::new() }
    }

    pub fn add_edge(&mut self, from: Node, to: Node) {
        self.edges.push((from, to));
    }

    /// Direct successors of `node`, erroring on a duplicated edge.
    fn successors(&self, node: Node) -> Result<BTreeSet<Node>, TopologyError<Node>> {
        let mut collected = BTreeSet::new();
        for (from, to) in &self.edges {
            if *from == node && !collected.insert(*to) {
                return Err(TopologyError::DuplicateEdge(DepRoute {
                    route: vec![node, *to],
                }));
            }
        }
        Ok(collected)
    }

    /// All transitive successors of `node` (the nodes to mark dirty when
    /// `node` changes). BFS over the edge list; collected-check keeps cycles
    /// from looping forever.
    pub fn descendants(&self, node: Node) -> BTreeSet<Node> {
        let mut collected = BTreeSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(node);
        while let Some(current) = queue.pop_front() {
            for (from, to) in &self.edges {
                if *from == current && collected.insert(*to) {
                    queue.push_back(*to);
                }
            }
        }
        collected
    }

    /// Kahn's algorithm. Returns every node of the graph in dependency
    /// order, or the offending route on a cycle or duplicate edge.
    pub fn topology_sort(&self) -> Result<Vec<Node>, TopologyError<Node>> {
        let mut in_degree = BTreeMap::<Node, usize>::new();
        for (from, to) in &self.edges {
            in_degree.entry(*from).or_insert(0);
            *in_degree.entry(*to).or_insert(0) += 1;
        }

        let mut order = Vec::with_capacity(in_degree.len());
        while !in_degree.is_empty() {
            // BTreeMap iteration makes the pick deterministic.
            let Some(node) = in_degree
                .iter()
                .find(|(_, degree)| **degree == 0)
                .map(|(node, _)| *node)
            else {
                let remaining: Vec<Node> = in_degree.keys().copied().collect();
                let route = self.find_cycle(&remaining).unwrap_or_default();
                return Err(TopologyError::CycleDetected(DepRoute { route }));
            };
            in_degree.remove(&node);
            order.push(node);
            for next in self.successors(node)? {
                if let Some(degree) = in_degree.get_mut(&next) {
                    *degree -= 1;
                }
            }
        }
        Ok(order)
    }

    /// DFS among `nodes` to reconstruct one concrete cycle for the error
    /// message.
    fn find_cycle(&self, nodes: &[Node]) -> Option<Vec<Node>> {
        let mut visited = BTreeSet::new();
        for &start in nodes {
            if visited.contains(&start) {
                continue;
            }
            let mut path = Vec::new();
            if let Some(cycle) = self.dfs_cycle(start, nodes, &mut visited, &mut path) {
                return Some(cycle);
            }
        }
        None
    }

    fn dfs_cycle(
        &self,
        current: Node,
        nodes: &[Node],
        visited: &mut BTreeSet<Node>,
        path: &mut Vec<Node>,
    ) -> Option<Vec<Node>> {
        if let Some(pos) = path.iter().position(|&n| n == current) {
            let mut cycle = path[pos..].to_vec();
            cycle.push(current);
            return Some(cycle);
        }
        if !visited.insert(current) {
            return None;
        }
        path.push(current);
        for next in self.successors(current).unwrap_or_default() {
            if !nodes.contains(&next) {
                continue;
            }
            if let Some(cycle) = self.dfs_cycle(next, nodes, visited, path) {
                return Some(cycle);
            }
        }
        path.pop();
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_graph_build() {
        let mut graph: Graph<u32> = Graph::new();
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);
        graph.add_edge(1, 3);

        assert_eq!(graph.edges.len(), 3);
    }

    #[test]
    fn simple_topology_sort() {
        let mut graph: Graph<u32> = Graph::new();
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);
        graph.add_edge(1, 3);

        let order = graph.topology_sort().expect("acyclic graph must sort");
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn descendants_are_transitive() {
        let mut graph: Graph<u32> = Graph::new();
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);
        graph.add_edge(4, 5);

        let reachable = graph.descendants(1);
        assert!(reachable.contains(&2));
        assert!(reachable.contains(&3));
        assert!(!reachable.contains(&4));
        assert!(!reachable.contains(&5));
    }

    #[test]
    fn cycle_topology_sort() {
        let mut graph: Graph<u32> = Graph::new();
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);
        graph.add_edge(3, 1);

        let result = graph.topology_sort();
        match result {
            Err(TopologyError::CycleDetected(dep_route)) => {
                let err_str = format!("{}", TopologyError::CycleDetected(dep_route));
                assert!(err_str.contains("Cycle detected"));
                assert!(err_str.contains("->"));
            }
            _ => panic!("Expected CycleDetected error"),
        }
    }

    #[test]
    fn duplicate_edge_detection_error_msg() {
        let mut graph: Graph<u32> = Graph::new();
        graph.add_edge(1, 2);
        graph.add_edge(1, 2);

        let result = graph.topology_sort();
        match result {
            Err(TopologyError::DuplicateEdge(dep_route)) => {
                let debug_str = format!("{dep_route:?}");
                assert!(debug_str.contains("1 -> 2"));

                let err_str = format!("{}", TopologyError::DuplicateEdge(dep_route));
                assert!(err_str.contains("Duplicate edge detected"));
                assert!(err_str.contains("from 1 to 2"));
            }
            _ => panic!("Expected DuplicateEdge error"),
        }
    }
}
