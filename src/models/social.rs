use serde::{Deserialize, Serialize};

/// Platform engagement counters attached to an entry (`socialdata`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialData {
    pub id: i64,
    pub entry_id: i64,
    #[serde(default)]
    pub thumbs_up: Option<i64>,
    #[serde(default)]
    pub thumbs_down: Option<i64>,
    #[serde(default)]
    pub view_count: Option<i64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub upvote_ratio: Option<f64>,
    #[serde(default)]
    pub upvote_diff: Option<i64>,
    #[serde(default)]
    pub upvote_view_ratio: Option<f64>,
    #[serde(default)]
    pub stars: Option<i64>,
    #[serde(default)]
    pub followers_count: Option<i64>,
    #[serde(default)]
    pub date_updated: Option<String>,
}

impl SocialData {
    /// Compact one-line-per-counter rendering used by the analyzer.
    pub fn display_lines(&self) -> Vec<String> {
        if let (Some(views), Some(up), Some(down)) = (self.view_count, self.thumbs_up, self.thumbs_down) {
            return vec![format!("V:{} TU:{} TD:{}", views, up, down)];
        }

        let mut lines = Vec::new();
        let counters = [self.view_count, self.thumbs_up, self.thumbs_down];
        for value in counters.into_iter().flatten().filter(|v| *v != 0) {
            lines.push(format!("F:{}", value));
        }
        if let Some(diff) = self.upvote_diff.filter(|v| *v != 0) {
            lines.push(format!("S:{}", diff));
        }
        if let Some(ratio) = self.upvote_ratio.filter(|v| *v != 0.0) {
            lines.push(format!("S:{}", ratio));
        }
        if let Some(followers) = self.followers_count.filter(|v| *v != 0) {
            lines.push(format!("F:{}", followers));
        }
        if let Some(stars) = self.stars.filter(|v| *v != 0) {
            lines.push(format!("S:{}", stars));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_video_stats_on_one_line() {
        let social = SocialData {
            view_count: Some(10),
            thumbs_up: Some(3),
            thumbs_down: Some(1),
            ..Default::default()
        };
        assert_eq!(social.display_lines(), vec!["V:10 TU:3 TD:1"]);
    }

    #[test]
    fn partial_stats_skip_empty_counters() {
        let social = SocialData {
            stars: Some(123),
            followers_count: Some(45),
            upvote_diff: Some(0),
            ..Default::default()
        };
        assert_eq!(social.display_lines(), vec!["F:45", "S:123"]);
    }
}
