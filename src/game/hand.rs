use super::card::Card;
use rand::Rng;
use rand::rngs::SmallRng;

/// a player's remaining placeable cards, ordered. moves reference
/// cards by index, and removal shifts the tail down, so the order is
/// observable.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    /// deal n cards drawn i.i.d. from the three types. the deck size
    /// is advisory and never enforced as a multiset constraint.
    pub fn deal(n: usize, rng: &mut SmallRng) -> Self {
        Self {
            cards: (0..n).map(|_| Card::from(rng.random_range(0..3u8))).collect(),
        }
    }
    pub fn len(&self) -> usize {
        self.cards.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
    pub fn get(&self, index: usize) -> Option<Card> {
        self.cards.get(index).copied()
    }
    pub(crate) fn remove(&mut self, index: usize) -> Card {
        assert!(index < self.cards.len(), "card index validated upstream");
        self.cards.remove(index)
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for card in self.cards.iter() {
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn removal_shifts_the_tail() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut hand = Hand::deal(5, &mut rng);
        let before = hand.cards.clone();
        let removed = hand.remove(1);
        assert!(removed == before[1]);
        assert!(hand.len() == 4);
        assert!(hand.get(1) == Some(before[2]));
        assert!(hand.get(3) == Some(before[4]));
    }

    #[test]
    fn deals_are_reproducible_under_a_seed() {
        let a = Hand::deal(5, &mut SmallRng::seed_from_u64(42));
        let b = Hand::deal(5, &mut SmallRng::seed_from_u64(42));
        assert!(a.cards == b.cards);
    }
}
