use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_FORMAT_VERSION: &str = "7.1";

/// Top-level document printed by the replay parser.
#[derive(Debug, Clone, Deserialize)]
pub struct DecodedReplay {
    #[serde(rename = "Properties")]
    pub properties: MatchProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MatchProperties {
    #[serde(deserialize_with = "flexible_u64")]
    pub match_start_epoch: u64,
    pub date: String,
    #[serde(default)]
    pub team0_score: Option<i32>,
    #[serde(default)]
    pub team1_score: Option<i32>,
    #[serde(rename = "bForfeit", default)]
    pub forfeit: Option<bool>,
    #[serde(default)]
    pub goals: Vec<DecodedGoal>,
    #[serde(default)]
    pub player_stats: Vec<DecodedPlayer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecodedGoal {
    #[serde(rename = "PlayerName")]
    pub player_name: String,
    #[serde(rename = "PlayerTeam", default)]
    pub player_team: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DecodedPlayer {
    pub name: String,
    pub team: i32,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub goals: i32,
    #[serde(default)]
    pub assists: i32,
    #[serde(default)]
    pub saves: i32,
    #[serde(default)]
    pub shots: i32,
    #[serde(rename = "OnlineID", default, deserialize_with = "optional_flexible_u64")]
    pub online_id: Option<u64>,
    // Unique net id, emitted as a list of single-key objects
    #[serde(rename = "PlayerID", default)]
    pub player_id: Vec<Value>,
}

impl DecodedPlayer {
    pub fn epic_account_id(&self) -> Option<&str> {
        self.player_id
            .iter()
            .filter_map(|entry| entry.get("EpicAccountId"))
            .filter_map(Value::as_str)
            .find(|id| !id.is_empty())
    }

    pub fn platform(&self) -> Option<&str> {
        self.player_id
            .iter()
            .filter_map(|entry| entry.get("Platform"))
            .filter_map(|platform| platform.get("Value"))
            .filter_map(Value::as_str)
            .find(|value| !value.is_empty())
    }
}

/// Stats file written by the in-game plugin before this tool runs.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalStatsRecord {
    #[serde(rename = "MMR_Before")]
    pub mmr_before: f64,
    #[serde(rename = "MMR_After")]
    pub mmr_after: f64,
    #[serde(rename = "Goals", default)]
    pub goals: Vec<Map<String, Value>>,
    #[serde(rename = "Playlist")]
    pub playlist: i64,
    #[serde(rename = "FormatVersion", default)]
    pub format_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalEntry {
    #[serde(rename = "ScorerName")]
    pub scorer_name: String,
    #[serde(rename = "GoalClip", default, skip_serializing_if = "Option::is_none")]
    pub goal_clip: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayerInfo {
    pub name: String,
    pub team: i32,
    pub score: i32,
    pub goals: i32,
    pub assists: i32,
    pub saves: i32,
    pub shots: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic_account_id: Option<String>,
    #[serde(rename = "OnlineID", default, skip_serializing_if = "Option::is_none")]
    pub online_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MatchRecord {
    pub format_version: String,
    pub team0_score: i32,
    pub team1_score: i32,
    pub start_epoch: u64,
    pub start_date: String,
    pub start_time: String,
    #[serde(rename = "LocalMMRBefore")]
    pub local_mmr_before: f64,
    #[serde(rename = "LocalMMRAfter")]
    pub local_mmr_after: f64,
    pub match_player_info: Vec<PlayerInfo>,
    pub goals: Vec<GoalEntry>,
    pub playlist: i64,
    #[serde(rename = "bForfeit")]
    pub forfeit: bool,
}

impl MatchRecord {
    pub fn match_id(&self) -> String {
        self.start_epoch.to_string()
    }

    pub fn local_goal_count(&self, local_player: &str) -> usize {
        self.goals
            .iter()
            .filter(|goal| goal.scorer_name == local_player)
            .count()
    }
}

/// Pointer document kept per playlist so the latest rating can be read without a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LatestPlaylistStats {
    #[serde(rename = "CurrentMMR")]
    pub current_mmr: f64,
    pub last_played_date: String,
    pub last_played_time: String,
    pub latest_match_id: u64,
}

impl From<&MatchRecord> for LatestPlaylistStats {
    fn from(record: &MatchRecord) -> Self {
        Self {
            current_mmr: record.local_mmr_after,
            last_played_date: record.start_date.clone(),
            last_played_time: record.start_time.clone(),
            latest_match_id: record.start_epoch,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

impl NumberOrString {
    fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| E::custom(format!("expected an integer, got {:?}", s))),
        }
    }
}

// The parser prints 64-bit properties either as numbers or as strings
fn flexible_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer)?.into_u64()
}

fn optional_flexible_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        // A zero id means the parser had no online id for the player, so it is
        // stored as absent rather than as the literal "0"
        Some(value) => value.into_u64().map(|id| Some(id).filter(|id| *id != 0)),
    }
}
