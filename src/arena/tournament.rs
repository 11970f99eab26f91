use super::elo;
use super::elo::Entry;
use super::ratings::Match;
use super::ratings::Ratings;
use super::record::Record;
use crate::game::Game;
use crate::game::Player;
use crate::players::Agent;
use colored::Colorize;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::collections::HashSet;

/// round-robin scheduler. every pair of active agents meets once for
/// a fixed number of games with randomized seating; ratings update
/// after every game, agents falling under the cutoff leave the pool
/// after each matchup, and a leaderboard goes out every few matchups.
pub struct Tournament {
    agents: Vec<Box<dyn Agent>>,
    entries: Vec<Entry>,
    active: Vec<bool>,
    games: usize,
    cutoff: f64,
    interval: usize,
    deck_size: usize,
    hand_size: usize,
    max_rounds: usize,
    pairs: BTreeMap<(String, String), Record>,
    history: Vec<Match>,
    rng: SmallRng,
}

impl Tournament {
    pub fn new(agents: Vec<Box<dyn Agent>>, games: usize, cutoff: f64, interval: usize, seed: u64) -> Self {
        let entries: Vec<Entry> = agents.iter().map(|a| Entry::new(a.name())).collect();
        let distinct: HashSet<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert!(distinct.len() == entries.len(), "agent names must be distinct");
        let active = vec![true; agents.len()];
        Self {
            agents,
            entries,
            active,
            games,
            cutoff,
            interval,
            deck_size: crate::DECK_SIZE,
            hand_size: crate::HAND_SIZE,
            max_rounds: crate::MAX_ROUNDS,
            pairs: BTreeMap::new(),
            history: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// table rules for every game played here.
    pub fn rules(mut self, deck_size: usize, hand_size: usize, max_rounds: usize) -> Self {
        self.deck_size = deck_size;
        self.hand_size = hand_size;
        self.max_rounds = max_rounds;
        self
    }

    /// play every remaining pair among active agents, then report.
    pub fn run(&mut self) -> &[Entry] {
        let mut played: HashSet<(usize, usize)> = HashSet::new();
        let mut matchups = 0;
        while let Some((i, j)) = self.unplayed(&played) {
            self.matchup(i, j);
            played.insert((i, j));
            self.prune();
            matchups += 1;
            if self.interval > 0 && matchups % self.interval == 0 {
                self.leaderboard();
            }
        }
        log::info!("final standings after {} matchups", matchups);
        self.leaderboard();
        &self.entries
    }

    /// the first unplayed active pair in index order.
    fn unplayed(&self, played: &HashSet<(usize, usize)>) -> Option<(usize, usize)> {
        for i in 0..self.agents.len() {
            for j in i + 1..self.agents.len() {
                if self.active[i] && self.active[j] && !played.contains(&(i, j)) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// one full match: n games with coin-flipped seating, rating and
    /// record updates after each game.
    fn matchup(&mut self, i: usize, j: usize) {
        log::info!("{} vs {}", self.entries[i].name, self.entries[j].name);
        for _ in 0..self.games {
            let flip = self.rng.random_bool(0.5);
            let (first, second) = if flip { (j, i) } else { (i, j) };
            let first_score = self.game(first, second);
            let score = if flip { 1.0 - first_score } else { first_score };
            let (a, b) = elo::update(self.entries[i].rating, self.entries[j].rating, score);
            self.entries[i].rating = a;
            self.entries[j].rating = b;
            self.entries[i].absorb(score);
            self.entries[j].absorb(1.0 - score);
            self.record(i, j, score);
        }
    }

    /// play one game to termination; `one` sits as the first player.
    /// a failed or illegal move loses on the spot for its side.
    fn game(&mut self, one: usize, two: usize) -> f64 {
        let mut game = Game::new(self.deck_size, self.hand_size, self.max_rounds, &mut self.rng);
        while !game.is_over() {
            let seat = game.turn();
            let index = match seat {
                Player::P1 => one,
                _ => two,
            };
            let m = match self.agents[index].act(&game) {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("{} forfeits: {}", self.entries[index].name, e);
                    return Self::forfeit(seat);
                }
            };
            game = match game.apply(m) {
                Ok(child) => child,
                Err(e) => {
                    log::warn!("{} forfeits: {}", self.entries[index].name, e);
                    return Self::forfeit(seat);
                }
            };
        }
        match game.winner() {
            Player::P1 => 1.0,
            Player::P2 => 0.0,
            Player::None => 0.5,
        }
    }
    fn forfeit(seat: Player) -> f64 {
        match seat {
            Player::P1 => 0.0,
            _ => 1.0,
        }
    }

    /// order-independent pair bookkeeping: (A, B) and (B, A) land on
    /// the same key, tallied from the lexicographically first name.
    fn record(&mut self, i: usize, j: usize, score: f64) {
        let (i, j, score) = match self.entries[i].name <= self.entries[j].name {
            true => (i, j, score),
            false => (j, i, 1.0 - score),
        };
        let key = (self.entries[i].name.clone(), self.entries[j].name.clone());
        self.pairs.entry(key).or_default().absorb(score);
        self.history.push(Match {
            model1: self.entries[i].name.clone(),
            model2: self.entries[j].name.clone(),
            result: score,
            new_rating1: self.entries[i].rating,
            new_rating2: self.entries[j].rating,
            timestamp: Self::now(),
            game_count: self.history.len() + 1,
            comment: "round-robin".to_string(),
        });
    }
    fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time moves slow")
            .as_secs()
    }

    /// drop agents under the cutoff from future pairings. zero
    /// disables pruning entirely.
    fn prune(&mut self) {
        if self.cutoff <= 0.0 {
            return;
        }
        for (index, entry) in self.entries.iter().enumerate() {
            if self.active[index] && entry.rating < self.cutoff {
                self.active[index] = false;
                log::info!("pruning {} at {:.0}", entry.name, entry.rating);
            }
        }
    }

    fn leaderboard(&self) {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| {
            self.entries[b]
                .rating
                .partial_cmp(&self.entries[a].rating)
                .expect("ratings are finite")
        });
        for (place, index) in order.into_iter().enumerate() {
            let entry = &self.entries[index];
            let line = format!("{:>2}. {}", place + 1, entry);
            match self.active[index] {
                true => log::info!("{}", line.bright_green()),
                false => log::info!("{}", line.dimmed()),
            }
        }
    }

    /// the result table: one row per agent, rating rounded, win
    /// percentage to one decimal, then the head-to-head section.
    pub fn csv(&self) -> String {
        let mut out = String::from("Agent,ELO,Wins,Losses,Draws,Win%\n");
        let mut order: Vec<&Entry> = self.entries.iter().collect();
        order.sort_by(|a, b| b.rating.partial_cmp(&a.rating).expect("ratings are finite"));
        for entry in order {
            out.push_str(&format!(
                "{},{},{},{},{},{:.1}\n",
                entry.name,
                entry.rating.round() as i64,
                entry.wins,
                entry.losses,
                entry.draws,
                entry.percentage(),
            ));
        }
        out.push_str("\nHead-to-Head Results:\n");
        out.push_str("Agent 1,Agent 2,Agent 1 Wins,Agent 2 Wins,Draws\n");
        for ((a, b), record) in self.pairs.iter() {
            out.push_str(&format!(
                "{},{},{},{},{}\n",
                a, b, record.wins, record.losses, record.draws
            ));
        }
        out
    }

    /// rating state in the persistable shape.
    pub fn ratings(&self) -> Ratings {
        let mut ratings = Ratings::default();
        for entry in self.entries.iter() {
            ratings.model_ratings.insert(entry.name.clone(), entry.rating);
        }
        ratings.match_history = self.history.clone();
        ratings
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Error;
    use crate::game::Move;
    use crate::players::Random;

    /// forfeits every game by refusing to move.
    struct Forfeiter;
    impl Agent for Forfeiter {
        fn name(&self) -> String {
            "forfeiter".to_string()
        }
        fn act(&mut self, _: &Game) -> Result<Move, Error> {
            Err(Error::NoValidMoves)
        }
    }

    fn roster() -> Vec<Box<dyn Agent>> {
        vec![
            Box::new(Random::new(1)),
            Box::new(Forfeiter),
            Box::new(crate::players::Minimax::new(2)),
        ]
    }

    #[test]
    fn ratings_stay_zero_sum_across_a_tournament() {
        let mut tournament = Tournament::new(roster(), 4, 0.0, 0, 3);
        let entries = tournament.run().to_vec();
        let total: f64 = entries.iter().map(|e| e.rating).sum();
        assert!((total - 3.0 * crate::ELO_BASE).abs() < 1e-6);
    }

    #[test]
    fn a_swept_agent_falls_under_the_cutoff_and_leaves_the_pool() {
        let mut tournament = Tournament::new(roster(), 10, 1490.0, 0, 4);
        tournament.run();
        // ten straight forfeits sink the rating well below cutoff
        assert!(tournament.active[1] == false);
        assert!(tournament.entries[1].rating < 1490.0);
        assert!(tournament.entries[1].games() == 10);
        // the survivors still played each other afterwards
        let key = ("minimax-2".to_string(), "random".to_string());
        assert!(tournament.pairs.contains_key(&key));
    }

    #[test]
    fn forfeits_count_as_losses_for_the_failing_side() {
        let mut tournament = Tournament::new(
            vec![Box::new(Random::new(5)), Box::new(Forfeiter)],
            6,
            0.0,
            0,
            6,
        );
        tournament.run();
        assert!(tournament.entries[0].wins == 6);
        assert!(tournament.entries[1].losses == 6);
        assert!(tournament.entries[0].rating > tournament.entries[1].rating);
    }

    #[test]
    fn pair_keys_are_order_independent() {
        let mut tournament = Tournament::new(
            vec![Box::new(Forfeiter), Box::new(Random::new(7))],
            3,
            0.0,
            0,
            8,
        );
        tournament.run();
        // "forfeiter" sorts before "random" regardless of indices
        let record = tournament.pairs.get(&("forfeiter".to_string(), "random".to_string()));
        assert!(record.is_some());
        assert!(record.unwrap().losses == 3);
    }

    #[test]
    fn the_csv_has_the_expected_header_and_shape() {
        let mut tournament = Tournament::new(roster(), 2, 0.0, 0, 9);
        tournament.run();
        let csv = tournament.csv();
        assert!(csv.starts_with("Agent,ELO,Wins,Losses,Draws,Win%\n"));
        assert!(csv.contains("Head-to-Head Results:"));
        assert!(csv.contains("Agent 1,Agent 2,Agent 1 Wins,Agent 2 Wins,Draws"));
        assert!(csv.lines().count() >= 3 + 2 + 3);
    }
}
