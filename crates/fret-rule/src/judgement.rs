use serde::{Deserialize, Serialize};

/// One accuracy tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Judgement {
    pub name: String,
    /// Largest absolute timing error in milliseconds. None = unbounded (the miss tier).
    pub window_ms: Option<u32>,
    /// Base points for a note judged in this tier.
    pub score: u32,
    /// Accuracy weight (1.0 = full credit).
    pub accuracy: f64,
    /// Health change for modes that track health.
    #[serde(default)]
    pub health: f64,
}

impl Judgement {
    pub fn new(name: &str, window_ms: Option<u32>, score: u32, accuracy: f64) -> Self {
        Self {
            name: name.to_string(),
            window_ms,
            score,
            accuracy,
            health: 0.0,
        }
    }

    /// Window in seconds.
    pub fn window(&self) -> f64 {
        self.window_ms
            .map_or(f64::INFINITY, |ms| f64::from(ms) / 1000.0)
    }

    /// Whether a timing error (seconds, either sign) falls inside this tier.
    pub fn contains(&self, error: f64) -> bool {
        error.abs() <= self.window()
    }

    pub fn is_miss(&self) -> bool {
        self.window_ms.is_none()
    }
}

/// Accuracy tiers ordered from tightest to loosest window; the last tier is the miss tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Judgement>", into = "Vec<Judgement>")]
pub struct JudgementTable {
    tiers: Vec<Judgement>,
}

impl JudgementTable {
    /// Build a table. Tiers are sorted tightest first, and an unbounded
    /// `Miss` tier is appended when the table has none.
    pub fn new(mut tiers: Vec<Judgement>) -> Self {
        tiers.sort_by_key(|j| j.window_ms.map_or(u64::MAX, u64::from));
        if tiers.last().is_none_or(|j| !j.is_miss()) {
            tiers.push(Judgement::new("Miss", None, 0, 0.0));
        }
        Self { tiers }
    }

    /// The single-tier table used by the five-fret mode.
    pub fn hero() -> Self {
        Self::new(vec![
            Judgement::new("Pass", Some(140), crate::NOTE_SCORE, 1.0),
            Judgement::new("Miss", None, 0, 0.0),
        ])
    }

    pub fn tiers(&self) -> &[Judgement] {
        &self.tiers
    }

    pub fn get(&self, index: usize) -> Option<&Judgement> {
        self.tiers.get(index)
    }

    /// Index of the first tier whose window contains the error, else the miss tier.
    pub fn judge_index(&self, error: f64) -> usize {
        self.tiers
            .iter()
            .position(|j| j.contains(error))
            .unwrap_or(self.miss_index())
    }

    pub fn judge(&self, error: f64) -> &Judgement {
        &self.tiers[self.judge_index(error)]
    }

    pub fn miss_index(&self) -> usize {
        self.tiers.len() - 1
    }

    pub fn miss(&self) -> &Judgement {
        &self.tiers[self.miss_index()]
    }

    /// Widest bounded window in seconds: how far from a chord a hit may land.
    pub fn hit_window(&self) -> f64 {
        self.tiers
            .iter()
            .filter_map(|j| j.window_ms)
            .max()
            .map_or(0.0, |ms| f64::from(ms) / 1000.0)
    }
}

impl From<Vec<Judgement>> for JudgementTable {
    fn from(tiers: Vec<Judgement>) -> Self {
        Self::new(tiers)
    }
}

impl From<JudgementTable> for Vec<Judgement> {
    fn from(table: JudgementTable) -> Self {
        table.tiers
    }
}

impl Default for JudgementTable {
    fn default() -> Self {
        Self::hero()
    }
}
