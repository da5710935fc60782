//! Monte Carlo Tree Search (MCTS) with UCB1 selection.
//!
//! Each iteration runs four phases:
//! - Selection: descend through fully expanded nodes by UCB1
//! - Expansion: add one random untried action as a new child
//! - Simulation: random playout from the new child
//! - Backpropagation: credit the result along the path back to the root
//!
//! Nodes live in a flat arena (`Vec<TreeNode>`) and refer to their parent and
//! children by index. The tree is built for a single decision and dropped
//! afterwards; nothing is reused between turns.

use std::fmt;
use std::time::{Duration, Instant};

use fastrand::Rng;
use log::{debug, trace};

use crate::board::{Board, Color, Point, point_name};
use crate::constants::{KOMI, N_SIMS, PASSES_TO_END, UCB_EXPLORATION};
use crate::playout::mcplayout;
use crate::position::{legal_moves_strict, make_move};
use crate::scoring::score_board_with_komi;

/// Index of a node in the search arena.
pub type NodeId = usize;

/// The root is always the first node in the arena.
pub const ROOT: NodeId = 0;

/// A move choice: a stone at a point, or a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Play(Point),
    Pass,
}

impl Action {
    pub fn point(self) -> Option<Point> {
        match self {
            Action::Play(pt) => Some(pt),
            Action::Pass => None,
        }
    }

    /// Go-style name such as `"E5"` or `"pass"`.
    pub fn name(self, size: usize) -> String {
        match self {
            Action::Play(pt) => point_name(pt, size),
            Action::Pass => "pass".into(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Play((row, col)) => write!(f, "({row},{col})"),
            Action::Pass => write!(f, "pass"),
        }
    }
}

/// A node in the MCTS search tree.
pub struct TreeNode {
    /// Position at this node
    pub board: Board,
    /// Player to move at this node
    pub to_move: Color,
    /// Ko point in force for `to_move`
    pub ko: Option<Point>,
    pub parent: Option<NodeId>,
    /// Action that led here from the parent (`None` at the root)
    pub action: Option<Action>,
    pub children: Vec<NodeId>,
    /// Number of wins (winrate = wins/visits)
    pub wins: u32,
    /// Number of visits
    pub visits: u32,
    /// Consecutive passes leading to this node
    pub passes: u32,
    /// Actions not yet expanded; filled on first use
    untried: Option<Vec<Action>>,
}

impl TreeNode {
    fn new(
        board: Board,
        to_move: Color,
        ko: Option<Point>,
        parent: Option<NodeId>,
        action: Option<Action>,
        passes: u32,
    ) -> Self {
        Self {
            board,
            to_move,
            ko,
            parent,
            action,
            children: Vec::new(),
            wins: 0,
            visits: 0,
            passes,
            untried: None,
        }
    }

    /// Calculate the winrate for this node.
    #[inline]
    pub fn winrate(&self) -> f64 {
        if self.visits > 0 {
            self.wins as f64 / self.visits as f64
        } else {
            -0.1 // Indicate unvisited
        }
    }
}

/// Search parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Iterations to run
    pub simulations: usize,
    /// UCB1 exploration constant
    pub exploration: f64,
    /// Komi used when scoring playouts
    pub komi: f64,
    /// RNG seed; `None` seeds from the environment
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            simulations: N_SIMS,
            exploration: UCB_EXPLORATION,
            komi: KOMI,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn with_simulations(simulations: usize) -> Self {
        Self {
            simulations,
            ..Self::default()
        }
    }

    fn rng(&self) -> Rng {
        match self.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        }
    }
}

/// Visit statistics of one root child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildStats {
    pub action: Action,
    pub visits: u32,
    pub wins: u32,
}

/// Summary of a finished search.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Chosen action (most visited root child)
    pub action: Action,
    pub simulations: usize,
    /// Plies played across all playouts
    pub playout_plies: usize,
    /// Nodes in the arena, root included
    pub tree_size: usize,
    pub root_visits: u32,
    pub children: Vec<ChildStats>,
    pub elapsed: Duration,
}

/// A search tree for one decision.
pub struct SearchTree {
    nodes: Vec<TreeNode>,
    /// Color whose wins are counted
    perspective: Color,
    exploration: f64,
    komi: f64,
}

impl SearchTree {
    /// Create a tree rooted at `board` with `to_move` to play.
    pub fn new(board: &Board, to_move: Color, ko: Option<Point>) -> Self {
        let root = TreeNode::new(board.clone(), to_move, ko, None, None, 0);
        Self {
            nodes: vec![root],
            perspective: to_move,
            exploration: UCB_EXPLORATION,
            komi: KOMI,
        }
    }

    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn with_komi(mut self, komi: f64) -> Self {
        self.komi = komi;
        self
    }

    #[inline]
    pub fn root(&self) -> &TreeNode {
        &self.nodes[ROOT]
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    /// Number of nodes in the arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Run `simulations` iterations. Returns the total playout plies.
    pub fn run(&mut self, simulations: usize, rng: &mut Rng) -> usize {
        let mut plies = 0;
        for _ in 0..simulations {
            let leaf = self.descend();
            let leaf = self.expand(leaf, rng);
            let (win, n) = self.simulate(leaf, rng);
            plies += n;
            self.update(leaf, win);
        }
        plies
    }

    /// Most visited root child, or pass if the root was never expanded.
    pub fn best_move(&self) -> Action {
        let mut best: Option<&TreeNode> = None;
        for &c in &self.root().children {
            let child = &self.nodes[c];
            if best.is_none_or(|b| child.visits > b.visits) {
                best = Some(child);
            }
        }
        best.and_then(|n| n.action).unwrap_or(Action::Pass)
    }

    /// Untried actions of a node, computed on first access.
    fn untried(&mut self, id: NodeId) -> &mut Vec<Action> {
        let node = &mut self.nodes[id];
        if node.untried.is_none() {
            let mut actions: Vec<Action> = legal_moves_strict(&node.board, node.to_move, node.ko)
                .into_iter()
                .map(Action::Play)
                .collect();
            actions.push(Action::Pass);
            node.untried = Some(actions);
        }
        node.untried.get_or_insert_with(Vec::new)
    }

    /// UCB1 score of a non-root node; unvisited nodes score infinity.
    fn ucb1(&self, id: NodeId) -> f64 {
        let node = &self.nodes[id];
        if node.visits == 0 {
            return f64::INFINITY;
        }
        let parent_visits = node.parent.map_or(node.visits, |p| self.nodes[p].visits);
        let v = node.visits as f64;
        node.wins as f64 / v + self.exploration * ((parent_visits as f64).ln() / v).sqrt()
    }

    /// Child with the highest UCB1 score (first one on ties).
    fn best_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for &c in &self.nodes[id].children {
            let score = self.ucb1(c);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((c, score));
            }
        }
        best.map(|(c, _)| c)
    }

    /// Selection: follow UCB1 while the current node is fully expanded.
    fn descend(&mut self) -> NodeId {
        let mut id = ROOT;
        while self.untried(id).is_empty() {
            match self.best_child(id) {
                Some(child) => id = child,
                None => break,
            }
        }
        id
    }

    /// Expansion: add one random untried action under `id` and return the
    /// new child, or `id` itself if the node is terminal or fully expanded.
    fn expand(&mut self, id: NodeId, rng: &mut Rng) -> NodeId {
        if self.nodes[id].passes >= PASSES_TO_END {
            return id;
        }
        let untried = self.untried(id);
        if untried.is_empty() {
            return id;
        }
        let i = rng.usize(..untried.len());
        let action = untried.swap_remove(i);

        let parent = &self.nodes[id];
        let mut board = parent.board.clone();
        let (ko, passes) = match action {
            Action::Pass => (None, parent.passes + 1),
            Action::Play(pt) => {
                let ko = make_move(&mut board, pt, parent.to_move, parent.ko)
                    .ok()
                    .and_then(|o| o.ko);
                (ko, 0)
            }
        };
        let child = TreeNode::new(board, parent.to_move.opponent(), ko, Some(id), Some(action), passes);

        let child_id = self.nodes.len();
        self.nodes.push(child);
        self.nodes[id].children.push(child_id);
        child_id
    }

    /// Simulation: random playout from `id`. Returns whether the search's
    /// color won, and the number of plies played.
    fn simulate(&self, id: NodeId, rng: &mut Rng) -> (bool, usize) {
        let node = &self.nodes[id];
        let mut board = node.board.clone();
        let plies = mcplayout(&mut board, node.to_move, node.ko, node.passes, rng);
        let win = score_board_with_komi(&board, self.komi).is_win_for(self.perspective);
        (win, plies)
    }

    /// Backpropagation from `leaf` to the root.
    ///
    /// A node is credited with the win when its parent's mover is the
    /// search's color (the root always counts wins), else with the loss.
    fn update(&mut self, leaf: NodeId, win: bool) {
        let mut cur = Some(leaf);
        while let Some(id) = cur {
            let parent = self.nodes[id].parent;
            let credit = match parent {
                Some(p) if self.nodes[p].to_move != self.perspective => !win,
                _ => win,
            };
            let node = &mut self.nodes[id];
            node.visits += 1;
            if credit {
                node.wins += 1;
            }
            cur = parent;
        }
    }

    fn child_stats(&self) -> Vec<ChildStats> {
        self.root()
            .children
            .iter()
            .filter_map(|&c| {
                let n = &self.nodes[c];
                n.action.map(|action| ChildStats {
                    action,
                    visits: n.visits,
                    wins: n.wins,
                })
            })
            .collect()
    }
}

/// Run a full search for `color` and report the chosen action.
pub fn tree_search(
    board: &Board,
    color: Color,
    ko: Option<Point>,
    config: &SearchConfig,
) -> SearchReport {
    let start = Instant::now();
    let mut rng = config.rng();
    let mut tree = SearchTree::new(board, color, ko)
        .with_exploration(config.exploration)
        .with_komi(config.komi);

    let playout_plies = tree.run(config.simulations, &mut rng);
    let action = tree.best_move();

    let report = SearchReport {
        action,
        simulations: config.simulations,
        playout_plies,
        tree_size: tree.len(),
        root_visits: tree.root().visits,
        children: tree.child_stats(),
        elapsed: start.elapsed(),
    };
    debug!(
        "{color} search: {} sims, {} nodes, {} playout plies in {:?} -> {}",
        report.simulations,
        report.tree_size,
        report.playout_plies,
        report.elapsed,
        action.name(board.size())
    );
    dump_children(&tree, board.size());
    report
}

/// Choose a move for `color` with the given simulation budget.
///
/// Returns [`Action::Pass`] when no search node was ever expanded.
pub fn choose_move(board: &Board, color: Color, ko: Option<Point>, simulations: usize) -> Action {
    tree_search(board, color, ko, &SearchConfig::with_simulations(simulations)).action
}

/// Trace the statistics of the root's children.
fn dump_children(tree: &SearchTree, size: usize) {
    for &c in &tree.root().children {
        let child = tree.node(c);
        trace!(
            "move {} v={} w={} wr={:.3}",
            child.action.map_or_else(|| "-".to_string(), |a| a.name(size)),
            child.visits,
            child.wins,
            child.winrate()
        );
    }
}
