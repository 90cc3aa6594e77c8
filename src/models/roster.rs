//! Teams and roster players.

use serde::{Deserialize, Serialize};

use super::{PlayerId, TeamId};

/// A team as stored (abbreviation is the filter key used by callers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: TeamId,
    pub abbreviation: String,
    pub full_name: String,
}

/// An active roster player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub full_name: String,
    pub position: String,
    pub team_id: TeamId,
}

impl PlayerRecord {
    /// Case-insensitive substring match on the full name.
    pub fn name_matches(&self, query: &str) -> bool {
        self.full_name
            .to_lowercase()
            .contains(&query.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str) -> PlayerRecord {
        PlayerRecord {
            id: "p1".into(),
            full_name: name.to_string(),
            position: "G".to_string(),
            team_id: "bos".into(),
        }
    }

    #[test]
    fn test_name_matches_case_insensitive() {
        let p = player("Jayson Tatum");
        assert!(p.name_matches("tatum"));
        assert!(p.name_matches("JAYSON"));
        assert!(p.name_matches("son ta"));
        assert!(!p.name_matches("brown"));
    }

    #[test]
    fn test_name_matches_empty_query() {
        // Empty filter matches everyone
        assert!(player("Anyone").name_matches(""));
    }
}
