//! Pipeline configuration with documented constants
//!
//! All tuning numbers for scoring, disambiguation, and batch execution
//! are collected here with explanations of their purpose and how they
//! interact with each other.

/// Configuration for the command pipeline
///
/// These values are tuning defaults rather than load-bearing
/// invariants. Changing them shifts how eagerly the parser guesses
/// versus how often it asks the player to choose.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    // === DISAMBIGUATION ===
    /// Minimum score gap between the top two candidates before the
    /// parser picks the leader without asking
    ///
    /// With default scoring weights, one matched adjective moves a
    /// candidate by more than this margin, so "iron key" never prompts
    /// when both keys are in scope but "key" alone does.
    pub disambiguation_margin: f32,

    /// Maximum number of candidates offered in a disambiguation prompt
    ///
    /// Prompts longer than a handful of options read as a menu, not a
    /// question.
    pub max_disambiguation_options: usize,

    // === BATCH EXECUTION ===
    /// Maximum number of targets an ALL-expansion may produce
    ///
    /// Expansion truncates to this cap preserving scope-enumeration
    /// order, bounding worst-case batch work per command.
    pub max_batch_targets: usize,

    // === SCORING WEIGHTS ===
    /// Bonus for an exact lemma match of the entity's name
    pub exact_name_bonus: f32,

    /// Bonus for a word matching one of the entity's synonyms
    ///
    /// Below the exact-name bonus so "sword" beats "blade" when both
    /// name the same entity differently.
    pub synonym_bonus: f32,

    /// Bonus per matched adjective
    ///
    /// Must exceed the disambiguation margin relative to competing
    /// candidates: an adjective is what distinguishes "brass key"
    /// from "iron key".
    pub adjective_bonus: f32,

    /// Bonus for a partial (substring) name match
    pub partial_name_bonus: f32,

    /// Bonus when the candidate is currently visible to the actor
    pub visible_bonus: f32,

    /// Bonus when the candidate is currently reachable by the actor
    pub reachable_bonus: f32,

    /// Recency bonus numerator
    ///
    /// A recently-mentioned entity gains `recency_bonus / (1 + n)`
    /// where n is its position in the mention list (most recent
    /// first), so ties break toward the entity under discussion.
    pub recency_bonus: f32,

    /// Score assigned to a pronoun resolving to the most recent mention
    ///
    /// Distinguished high value: a pronoun is not fuzzy, it either
    /// refers to the last mention or fails.
    pub pronoun_score: f32,

    /// Minimum score a match must reach to survive filtering
    ///
    /// Eliminates zero and near-zero noise matches from candidate
    /// lists before disambiguation looks at them.
    pub score_floor: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            disambiguation_margin: 30.0,
            max_disambiguation_options: 5,

            max_batch_targets: 50,

            exact_name_bonus: 60.0,
            synonym_bonus: 45.0,
            adjective_bonus: 25.0,
            partial_name_bonus: 15.0,
            visible_bonus: 10.0,
            reachable_bonus: 5.0,
            recency_bonus: 20.0,
            pronoun_score: 100.0,
            score_floor: 5.0,
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.disambiguation_margin <= 0.0 {
            return Err("disambiguation_margin must be positive".into());
        }

        if self.max_disambiguation_options < 2 {
            return Err(format!(
                "max_disambiguation_options ({}) must be >= 2 to offer a choice",
                self.max_disambiguation_options
            ));
        }

        if self.max_batch_targets == 0 {
            return Err("max_batch_targets must be at least 1".into());
        }

        // Match tiers must be ordered or disambiguation stops meaning anything
        if self.exact_name_bonus <= self.synonym_bonus
            || self.synonym_bonus <= self.partial_name_bonus
        {
            return Err(format!(
                "scoring tiers must be ordered: exact ({}) > synonym ({}) > partial ({})",
                self.exact_name_bonus, self.synonym_bonus, self.partial_name_bonus
            ));
        }

        if self.score_floor >= self.pronoun_score {
            return Err(format!(
                "score_floor ({}) must be below pronoun_score ({})",
                self.score_floor, self.pronoun_score
            ));
        }

        Ok(())
    }
}
