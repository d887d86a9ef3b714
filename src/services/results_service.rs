use crate::models::session::{ParticipantResult, SessionResults};
use std::cmp::Ordering;

pub const SCORE_BUCKETS: [&str; 5] = ["0-20%", "20-40%", "40-60%", "60-80%", "80-100%"];

#[derive(Debug, Clone)]
pub struct RankedResult {
    pub rank: usize,
    pub result: ParticipantResult,
    pub percentage: f64,
}

/// What the results page charts, derived from the server's per-participant rows.
#[derive(Debug, Clone)]
pub struct ResultsSummary {
    pub code: String,
    pub quiz_title: Option<String>,
    pub leaderboard: Vec<RankedResult>,
    pub average_percentage: f64,
    pub highest_percentage: f64,
    pub lowest_percentage: f64,
    pub distribution: [usize; 5],
}

pub fn summarize(results: &SessionResults) -> ResultsSummary {
    let mut rows = results.participants.clone();
    rows.sort_by(compare_results);

    // Ties on score and time share a rank.
    let mut leaderboard: Vec<RankedResult> = Vec::with_capacity(rows.len());
    for (idx, result) in rows.into_iter().enumerate() {
        let rank = match leaderboard.last() {
            Some(prev)
                if prev.result.score == result.score
                    && prev.result.time_taken_seconds == result.time_taken_seconds =>
            {
                prev.rank
            }
            _ => idx + 1,
        };
        let percentage = result.percentage();
        leaderboard.push(RankedResult {
            rank,
            result,
            percentage,
        });
    }

    let mut distribution = [0usize; 5];
    for entry in &leaderboard {
        distribution[bucket(entry.percentage)] += 1;
    }

    let percentages: Vec<f64> = leaderboard.iter().map(|r| r.percentage).collect();
    let (average, highest, lowest) = if percentages.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        (
            percentages.iter().sum::<f64>() / percentages.len() as f64,
            percentages.iter().cloned().fold(f64::MIN, f64::max),
            percentages.iter().cloned().fold(f64::MAX, f64::min),
        )
    };

    ResultsSummary {
        code: results.code.clone(),
        quiz_title: results.quiz_title.clone(),
        leaderboard,
        average_percentage: average,
        highest_percentage: highest,
        lowest_percentage: lowest,
        distribution,
    }
}

fn compare_results(a: &ParticipantResult, b: &ParticipantResult) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| {
            let ta = a.time_taken_seconds.unwrap_or(u32::MAX);
            let tb = b.time_taken_seconds.unwrap_or(u32::MAX);
            ta.cmp(&tb)
        })
        .then_with(|| a.name.cmp(&b.name))
}

fn bucket(percentage: f64) -> usize {
    ((percentage / 20.0).floor() as usize).min(4)
}
