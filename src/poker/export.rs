use super::models::Story;
use super::statistics::compute_statistics;

const HEADERS: [&str; 6] = [
    "Story Title",
    "Description",
    "Votes",
    "Average",
    "Mode",
    "Final Estimate",
];

/// Render the story history as a CSV report, one row per story
pub fn stories_to_csv(stories: &[Story]) -> String {
    let mut lines = Vec::with_capacity(stories.len() + 1);
    lines.push(HEADERS.join(","));

    for story in stories {
        let stats = compute_statistics(&story.votes);
        let votes = story
            .votes
            .iter()
            .map(|v| format!("{}:{}", v.user_name, v.value))
            .collect::<Vec<_>>()
            .join("; ");

        let row = [
            quoted(&story.title),
            quoted(story.description.as_deref().unwrap_or_default()),
            escaped(&votes),
            stats.average,
            stats.mode,
            escaped(story.final_estimate.as_deref().unwrap_or_default()),
        ];
        lines.push(row.join(","));
    }

    lines.join("\n")
}

/// File name for a report generated on the given date
pub fn export_file_name(date: chrono::NaiveDate) -> String {
    format!("planning-poker-results-{}.csv", date.format("%Y-%m-%d"))
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn escaped(field: &str) -> String {
    if field.contains(&[',', '"', '\n'][..]) {
        quoted(field)
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poker::models::{Vote, VoteValue};

    fn vote(name: &str, value: VoteValue) -> Vote {
        Vote {
            user_id: name.to_lowercase(),
            user_name: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_csv_has_header_and_row_per_story() {
        let mut first = Story::new("s1".into(), "Login flow".into(), Some("OAuth".into()));
        first.votes = vec![
            vote("Ana", VoteValue::Five),
            vote("Bo", VoteValue::Five),
            vote("Cy", VoteValue::Eight),
        ];
        first.final_estimate = Some("5".into());
        let second = Story::new("s2".into(), "Say \"hi\"".into(), None);

        let csv = stories_to_csv(&[first, second]);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "Story Title,Description,Votes,Average,Mode,Final Estimate"
        );
        assert_eq!(
            lines[1],
            "\"Login flow\",\"OAuth\",Ana:5; Bo:5; Cy:8,6.0,5,5"
        );
        assert_eq!(lines[2], "\"Say \"\"hi\"\"\",\"\",,N/A,N/A,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_file_name_uses_iso_date() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            export_file_name(date),
            "planning-poker-results-2024-03-09.csv"
        );
    }
}
