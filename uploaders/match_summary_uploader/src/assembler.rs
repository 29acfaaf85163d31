use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::clips::ClipFile;
use crate::error::{Result, SummaryError};
use crate::storage::{clip_key, ObjectStore};
use crate::types::{
    DecodedGoal, DecodedPlayer, GoalEntry, LocalStatsRecord, MatchProperties, MatchRecord,
    PlayerInfo, DEFAULT_FORMAT_VERSION,
};

/// Gives each plugin goal the scorer recorded for the goal at the same position in the replay.
///
/// Both lists describe the same match in the same order. A length mismatch, a goal
/// credited to different teams by the two sources, or a replay goal without a
/// scorer means they cannot be paired.
pub fn assign_scorers(
    local_goals: Vec<Map<String, Value>>,
    decoded_goals: &[DecodedGoal],
) -> Result<Vec<GoalEntry>> {
    if local_goals.len() != decoded_goals.len() {
        return Err(SummaryError::GoalCountMismatch {
            decoded: decoded_goals.len(),
            local: local_goals.len(),
        });
    }

    local_goals
        .into_iter()
        .zip(decoded_goals)
        .enumerate()
        .map(|(index, (mut details, decoded))| {
            if decoded.player_name.trim().is_empty() {
                return Err(SummaryError::EmptyScorer { index });
            }
            let local_team = details.get("Team").and_then(Value::as_i64);
            if let (Some(local), Some(decoded_team)) = (local_team, decoded.player_team) {
                if local != decoded_team {
                    return Err(SummaryError::GoalOrderMismatch {
                        index,
                        decoded: decoded_team,
                        local,
                    });
                }
            }
            details.remove("ScorerName");
            details.remove("GoalClip");
            Ok(GoalEntry {
                scorer_name: decoded.player_name.clone(),
                goal_clip: None,
                details,
            })
        })
        .collect()
}

pub fn player_info(player: &DecodedPlayer) -> PlayerInfo {
    PlayerInfo {
        name: player.name.clone(),
        team: player.team,
        score: player.score,
        goals: player.goals,
        assists: player.assists,
        saves: player.saves,
        shots: player.shots,
        epic_account_id: player.epic_account_id().map(str::to_string),
        online_id: player.online_id,
        platform: player.platform().map(str::to_string),
    }
}

/// Splits the replay's `"YYYY-MM-DD HH-MM-SS"` date into its date and time parts.
pub fn split_match_date(date: &str) -> Result<(String, String)> {
    match date.trim().split_once(' ') {
        Some((day, time)) if !day.is_empty() && !time.trim().is_empty() => {
            Ok((day.to_string(), time.trim().to_string()))
        }
        _ => Err(SummaryError::MalformedDate(date.to_string())),
    }
}

pub fn build_match_record(props: &MatchProperties, stats: LocalStatsRecord) -> Result<MatchRecord> {
    let goals = assign_scorers(stats.goals, &props.goals)?;
    let (start_date, start_time) = split_match_date(&props.date)?;

    let record = MatchRecord {
        format_version: stats
            .format_version
            .unwrap_or_else(|| DEFAULT_FORMAT_VERSION.to_string()),
        team0_score: props.team0_score.unwrap_or(0),
        team1_score: props.team1_score.unwrap_or(0),
        start_epoch: props.match_start_epoch,
        start_date,
        start_time,
        local_mmr_before: stats.mmr_before,
        local_mmr_after: stats.mmr_after,
        match_player_info: props.player_stats.iter().map(player_info).collect(),
        goals,
        playlist: stats.playlist,
        forfeit: props.forfeit.unwrap_or(false),
    };

    info!(
        match_id = record.start_epoch,
        goals = record.goals.len(),
        players = record.match_player_info.len(),
        "Assembled match record"
    );
    Ok(record)
}

/// Uploads one clip per local-player goal, in order, and records each clip's locator
/// on its goal. The number of clips must equal the number of local goals. Returns the
/// clips that were consumed; their local files are left in place for the caller to
/// remove once the record has been persisted.
pub async fn attach_clips(
    record: &mut MatchRecord,
    local_player: &str,
    clips: &[ClipFile],
    store: &dyn ObjectStore,
) -> Result<Vec<ClipFile>> {
    let local_goals = record.local_goal_count(local_player);
    // A leftover clip would sort ahead of the next match's clips and shift every pairing
    if clips.len() != local_goals {
        warn!(
            "{} clip files for {} local goals; refusing to pair them",
            clips.len(),
            local_goals
        );
        return Err(SummaryError::ClipCountMismatch {
            local_goals,
            clips: clips.len(),
        });
    }

    let match_id = record.match_id();
    let mut consumed = Vec::with_capacity(local_goals);
    let mut next_clip = clips.iter();
    for goal in record.goals.iter_mut().filter(|goal| goal.scorer_name == local_player) {
        let Some(clip) = next_clip.next() else { break };
        let extension = clip
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "mp4".to_string());
        let key = clip_key(&match_id, consumed.len() + 1, &extension);
        goal.goal_clip = Some(store.upload_file(&clip.path, &key).await?);
        consumed.push(clip.clone());
    }

    info!("Attached {} clips to match {}", consumed.len(), match_id);
    Ok(consumed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn decoded(name: &str, team: Option<i64>) -> DecodedGoal {
        DecodedGoal {
            player_name: name.to_string(),
            player_team: team,
        }
    }

    fn local(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn properties(value: Value) -> MatchProperties {
        serde_json::from_value(value).unwrap()
    }

    fn stats(goals: Vec<Value>) -> LocalStatsRecord {
        LocalStatsRecord {
            mmr_before: 1000.0,
            mmr_after: 1009.0,
            goals: goals.into_iter().map(local).collect(),
            playlist: 11,
            format_version: None,
        }
    }

    #[test]
    fn test_assign_scorers_by_position() {
        let goals = assign_scorers(
            vec![local(json!({"GoalTime": 10})), local(json!({"GoalTime": 20}))],
            &[decoded("A", None), decoded("BrickBoned", None)],
        )
        .unwrap();
        assert_eq!(goals[0].scorer_name, "A");
        assert_eq!(goals[1].scorer_name, "BrickBoned");
        assert_eq!(goals[1].details.get("GoalTime"), Some(&json!(20)));
    }

    #[test]
    fn test_assign_scorers_length_mismatch() {
        let err = assign_scorers(vec![local(json!({}))], &[decoded("A", None), decoded("B", None)])
            .unwrap_err();
        assert!(matches!(
            err,
            SummaryError::GoalCountMismatch { decoded: 2, local: 1 }
        ));
    }

    #[test]
    fn test_assign_scorers_team_mismatch() {
        let err = assign_scorers(
            vec![local(json!({"Team": 0})), local(json!({"Team": 1}))],
            &[decoded("A", Some(1)), decoded("B", Some(0))],
        )
        .unwrap_err();
        assert!(matches!(err, SummaryError::GoalOrderMismatch { index: 0, .. }));
    }

    #[test]
    fn test_assign_scorers_empty_scorer() {
        let err = assign_scorers(
            vec![local(json!({"Team": 1})), local(json!({"Team": 0}))],
            &[decoded("A", Some(1)), decoded("", Some(0))],
        )
        .unwrap_err();
        assert!(matches!(err, SummaryError::EmptyScorer { index: 1 }));
    }

    #[test]
    fn test_split_match_date() {
        assert_eq!(
            split_match_date("2024-03-05 21-14-33").unwrap(),
            ("2024-03-05".to_string(), "21-14-33".to_string())
        );
        assert!(split_match_date("2024-03-05").is_err());
        assert!(split_match_date("").is_err());
    }

    #[test]
    fn test_defaults_for_missing_optional_fields() {
        let props = properties(json!({
            "MatchStartEpoch": 1709673273,
            "Date": "2024-03-05 21-14-33",
            "PlayerStats": [{"Name": "BrickBoned", "Team": 0}]
        }));
        let record = build_match_record(&props, stats(vec![])).unwrap();
        assert_eq!(record.team0_score, 0);
        assert_eq!(record.team1_score, 0);
        assert!(!record.forfeit);
        assert_eq!(record.format_version, DEFAULT_FORMAT_VERSION);
        assert_eq!(record.start_date, "2024-03-05");
        assert_eq!(record.start_time, "21-14-33");
        assert_eq!(record.local_mmr_after, 1009.0);
        assert_eq!(record.match_player_info[0].epic_account_id, None);
        assert_eq!(record.match_player_info[0].platform, None);
    }

    #[test]
    fn test_forfeit_and_scores_carried_over() {
        let props = properties(json!({
            "MatchStartEpoch": "1709673273",
            "Date": "2024-03-05 21-14-33",
            "Team0Score": 3,
            "Team1Score": 1,
            "bForfeit": true,
            "Goals": [
                {"PlayerName": "A", "PlayerTeam": 1},
                {"PlayerName": "BrickBoned", "PlayerTeam": 0}
            ]
        }));
        let record =
            build_match_record(&props, stats(vec![json!({"Team": 1}), json!({"Team": 0})])).unwrap();
        assert_eq!(record.team0_score, 3);
        assert_eq!(record.team1_score, 1);
        assert!(record.forfeit);
        assert_eq!(record.goals.len(), 2);
        assert!(record.goals.iter().all(|goal| !goal.scorer_name.is_empty()));
        assert_eq!(record.local_goal_count("BrickBoned"), 1);
    }

    #[test]
    fn test_player_info_optional_ids() {
        let player: DecodedPlayer = serde_json::from_value(json!({
            "Name": "BrickBoned",
            "Team": 0,
            "Score": 420,
            "Goals": 2,
            "Assists": 1,
            "Saves": 3,
            "Shots": 5,
            "OnlineID": 12345,
            "PlayerID": [
                {"Uid": "0"},
                {"NpId": {}},
                {"EpicAccountId": "abc"},
                {"Platform": {"Value": "OnlinePlatform_Epic"}}
            ]
        }))
        .unwrap();
        let info = player_info(&player);
        assert_eq!(
            info,
            PlayerInfo {
                name: "BrickBoned".to_string(),
                team: 0,
                score: 420,
                goals: 2,
                assists: 1,
                saves: 3,
                shots: 5,
                epic_account_id: Some("abc".to_string()),
                online_id: Some(12345),
                platform: Some("OnlinePlatform_Epic".to_string()),
            }
        );
    }
}
