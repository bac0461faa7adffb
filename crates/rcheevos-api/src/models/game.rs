use super::achievement::{Achievement, Leaderboard};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server assigned game identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub i64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server assigned achievement set identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetId(pub i64);

impl fmt::Display for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Grouping of an achievement set inside its game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementSetType {
    Core,
    Bonus,
    Specialty,
    Exclusive,
}

impl AchievementSetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementSetType::Core => "core",
            AchievementSetType::Bonus => "bonus",
            AchievementSetType::Specialty => "specialty",
            AchievementSetType::Exclusive => "exclusive",
        }
    }
}

impl fmt::Display for AchievementSetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementSetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "core" => Ok(AchievementSetType::Core),
            "bonus" => Ok(AchievementSetType::Bonus),
            "specialty" => Ok(AchievementSetType::Specialty),
            "exclusive" => Ok(AchievementSetType::Exclusive),
            other => Err(format!("Unknown achievement set type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementSet {
    pub id: SetId,
    pub game_id: GameId,
    pub title: Option<String>,
    pub set_type: AchievementSetType,
    pub icon_url: String,
    pub achievements: Vec<Achievement>,
    pub leaderboards: Vec<Leaderboard>,
}

/// Full catalog snapshot of a game. Always replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub title: String,
    pub icon_url: String,
    pub rich_presence_patch: Option<String>,
    pub sets: Vec<AchievementSet>,
}

impl Game {
    pub fn achievements(&self) -> impl Iterator<Item = &Achievement> {
        self.sets.iter().flat_map(|set| set.achievements.iter())
    }

    pub fn leaderboards(&self) -> impl Iterator<Item = &Leaderboard> {
        self.sets.iter().flat_map(|set| set.leaderboards.iter())
    }

    pub fn core_set(&self) -> Option<&AchievementSet> {
        self.sets
            .iter()
            .find(|set| set.set_type == AchievementSetType::Core)
    }
}
