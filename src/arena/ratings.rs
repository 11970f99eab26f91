use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// rating state persisted between runs: current ratings, the full
/// match log, and provenance for each trained model.
#[derive(Debug, Serialize, Deserialize)]
pub struct Ratings {
    pub base_rating: f64,
    pub k_factor: f64,
    pub model_ratings: BTreeMap<String, f64>,
    pub match_history: Vec<Match>,
    pub model_metadata: BTreeMap<String, Metadata>,
}

/// one logged game between two rated models. the result is the
/// first-named side's score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub model1: String,
    pub model2: String,
    pub result: f64,
    pub new_rating1: f64,
    pub new_rating2: f64,
    pub timestamp: u64,
    pub game_count: usize,
    pub comment: String,
}

/// how a rated model came to be.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub description: String,
    pub created: String,
    pub hidden_size: usize,
    pub self_play_games: usize,
    pub epochs: usize,
    pub parameters: usize,
}

impl Default for Ratings {
    fn default() -> Self {
        Self {
            base_rating: crate::ELO_BASE,
            k_factor: crate::ELO_K,
            model_ratings: BTreeMap::new(),
            match_history: Vec::new(),
            model_metadata: BTreeMap::new(),
        }
    }
}

impl Ratings {
    pub fn load(path: &std::path::Path) -> Result<Self, crate::nn::Error> {
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }
    pub fn save(&self, path: &std::path::Path) -> Result<(), crate::nn::Error> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
    /// append one game and carry the new ratings forward.
    pub fn log(&mut self, game: Match) {
        self.model_ratings.insert(game.model1.clone(), game.new_rating1);
        self.model_ratings.insert(game.model2.clone(), game.new_rating2);
        self.match_history.push(game);
    }
    pub fn rating(&self, name: &str) -> f64 {
        self.model_ratings.get(name).copied().unwrap_or(self.base_rating)
    }
}
