use super::node::Node;
use crate::game::Game;
use crate::game::Move;
use crate::Probability;
use crate::Utility;

/// the search tree as an arena: a flat vector of nodes addressed by
/// index, root at zero. one search owns one tree; it is grown during
/// that search and dropped with it, never shared.
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn seed(game: Game) -> Self {
        Self {
            nodes: vec![Node::new(game, None, None, 1.0)],
        }
    }

    pub fn root(&self) -> &Node {
        self.at(0)
    }
    pub fn at(&self, index: usize) -> &Node {
        self.nodes.get(index).expect("index minted by this tree")
    }
    pub fn at_mut(&mut self, index: usize) -> &mut Node {
        self.nodes.get_mut(index).expect("index minted by this tree")
    }
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// descend from the root by puct score until a childless node:
    /// either unexpanded or terminal.
    pub fn select(&self, exploration: f64) -> usize {
        let mut head = 0;
        loop {
            match self.at(head).children().is_empty() {
                true => return head,
                false => head = self.favorite(head, exploration),
            }
        }
    }
    /// the highest-scoring child. strict comparison in insertion
    /// order breaks ties toward the earliest sibling.
    fn favorite(&self, parent: usize, exploration: f64) -> usize {
        let n = self.at(parent).visits() as f64;
        let mut best = (f64::NEG_INFINITY, 0);
        for &index in self.at(parent).children() {
            let child = self.at(index);
            let exploit = child.q();
            let explore = exploration * child.prior() * n.sqrt() / (1.0 + child.visits() as f64);
            let score = exploit + explore;
            if score > best.0 {
                best = (score, index);
            }
        }
        best.1
    }

    pub fn grow(&mut self, parent: usize, game: Game, edge: Move, prior: Probability) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node::new(game, Some(edge), Some(parent), prior));
        self.at_mut(parent).adopt(index);
        index
    }

    /// bank an evaluation up the parent chain. the value arrives
    /// from the perspective of the player to move at the leaf; each
    /// node stores it from the perspective of the player who moved
    /// into that node, so the sign flips on arrival and again at
    /// every step up.
    pub fn backpropagate(&mut self, leaf: usize, value: Utility) {
        let mut v = -value;
        let mut head = Some(leaf);
        while let Some(index) = head {
            let node = self.at_mut(index);
            node.visit(v);
            v = -v;
            head = node.parent();
        }
    }

    /// virtual loss along the root path while a leaf waits in an
    /// evaluation batch; sign > 0 applies, sign < 0 reverts.
    pub(crate) fn reserve(&mut self, leaf: usize, sign: i64) {
        let mut head = Some(leaf);
        while let Some(index) = head {
            let node = self.at_mut(index);
            node.reserve(sign);
            head = node.parent();
        }
    }

    /// visit-count distribution over board slots at the root, the
    /// supervised policy target. siblings landing on the same slot
    /// pool their visits. an unvisited root yields uniform.
    pub fn pi(&self) -> [Probability; crate::SLOTS] {
        let total: usize = self
            .root()
            .children()
            .iter()
            .map(|&c| self.at(c).visits())
            .sum();
        if total == 0 {
            return [1.0 / crate::SLOTS as f64; crate::SLOTS];
        }
        let mut pi = [0.0; crate::SLOTS];
        for &index in self.root().children() {
            let child = self.at(index);
            let slot = child.edge().expect("non-root nodes carry an edge").slot;
            pi[slot] += child.visits() as f64 / total as f64;
        }
        pi
    }

    /// the recommended move: most visits, ties broken by higher
    /// prior, then insertion order. None until some child has been
    /// visited, which callers turn into a random-move fallback.
    pub fn best(&self) -> Option<Move> {
        let mut best: Option<&Node> = None;
        for &index in self.root().children() {
            let child = self.at(index);
            best = match best {
                None => Some(child),
                Some(b)
                    if child.visits() > b.visits()
                        || (child.visits() == b.visits() && child.prior() > b.prior()) =>
                {
                    Some(child)
                }
                keep => keep,
            };
        }
        best.filter(|b| b.visits() > 0).and_then(|b| b.edge())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Player;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn sapling() -> Tree {
        let mut rng = SmallRng::seed_from_u64(40);
        let game = Game::root(&mut rng);
        let mut tree = Tree::seed(game.clone());
        for (m, prior) in game.valid_moves().into_iter().zip([0.5, 0.3, 0.2]) {
            let child = game.apply(m).unwrap();
            tree.grow(0, child, m, prior);
        }
        tree
    }

    #[test]
    fn selection_prefers_the_highest_prior_among_fresh_children() {
        let mut tree = sapling();
        tree.at_mut(0).visit(0.0);
        let leaf = tree.select(1.0);
        assert!(leaf == 1);
        assert!(tree.at(leaf).prior() == 0.5);
    }

    #[test]
    fn backpropagation_flips_perspective_on_the_way_up() {
        let mut tree = sapling();
        tree.backpropagate(1, 1.0);
        // the leaf banks the mover-into perspective, the root flips
        assert!(tree.at(1).visits() == 1);
        assert!(tree.at(1).q() == -1.0);
        assert!(tree.root().visits() == 1);
        assert!(tree.root().q() == 1.0);
    }

    #[test]
    fn pi_pools_visits_by_slot_and_normalizes() {
        let mut tree = sapling();
        tree.backpropagate(1, 1.0);
        tree.backpropagate(1, 0.0);
        tree.backpropagate(2, -1.0);
        let pi = tree.pi();
        assert!((pi.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        let first = tree.at(1).edge().unwrap().slot;
        let second = tree.at(2).edge().unwrap().slot;
        assert!((pi[first] - 2.0 / 3.0).abs() < 1e-9);
        assert!((pi[second] - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn pi_is_uniform_before_any_visit() {
        let tree = sapling();
        assert!(tree.pi() == [1.0 / 9.0; crate::SLOTS]);
        assert!(tree.best() == None);
    }

    #[test]
    fn best_breaks_visit_ties_by_prior() {
        let mut tree = sapling();
        tree.backpropagate(1, 0.0);
        tree.backpropagate(2, 0.0);
        let best = tree.best().unwrap();
        assert!(best == tree.at(1).edge().unwrap());
        assert!(best.player == Player::P1);
    }
}
