// Achievements: tick, score and discovery milestones plus combination
// discoveries, recorded in an append-only log.
//
// `pending_milestones()` is a pure function of the progress counters and the
// log; the sim calls it once per tick and appends whatever it returns. Each
// milestone and each combination appears in the log at most once.

use crate::config::AchievementParams;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Milestone {
    OneMinuteGardener,
    FiveMinuteGardener,
    BotanistSupreme,
    MasterGardener,
}

impl Milestone {
    pub const ALL: [Milestone; 4] = [
        Milestone::OneMinuteGardener,
        Milestone::FiveMinuteGardener,
        Milestone::BotanistSupreme,
        Milestone::MasterGardener,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Milestone::OneMinuteGardener => "One Minute Gardener",
            Milestone::FiveMinuteGardener => "Five Minute Gardener",
            Milestone::BotanistSupreme => "Botanist Supreme",
            Milestone::MasterGardener => "Master Gardener",
        }
    }

    fn reached(self, progress: &Progress, params: &AchievementParams) -> bool {
        match self {
            Milestone::OneMinuteGardener => progress.elapsed_ticks == params.one_minute_ticks,
            Milestone::FiveMinuteGardener => progress.elapsed_ticks == params.five_minute_ticks,
            Milestone::BotanistSupreme => progress.rare_discoveries >= params.botanist_rare_count,
            Milestone::MasterGardener => progress.score >= params.master_score,
        }
    }
}

/// The monotonic counters milestones are judged on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub elapsed_ticks: u64,
    pub score: u64,
    pub rare_discoveries: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AchievementKind {
    Milestone(Milestone),
    Combination { combo_id: String, message: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementEntry {
    pub name: String,
    pub kind: AchievementKind,
    pub unlocked_at_tick: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementLog {
    entries: Vec<AchievementEntry>,
}

impl AchievementLog {
    pub fn entries(&self) -> &[AchievementEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_milestone(&self, milestone: Milestone) -> bool {
        self.entries
            .iter()
            .any(|e| e.kind == AchievementKind::Milestone(milestone))
    }

    pub fn has_combination(&self, combo_id: &str) -> bool {
        self.entries.iter().any(|e| {
            matches!(&e.kind, AchievementKind::Combination { combo_id: id, .. } if id == combo_id)
        })
    }

    /// Append an entry unless an entry of the same kind is already logged.
    /// Returns whether it was appended.
    pub fn unlock(&mut self, entry: AchievementEntry) -> bool {
        let duplicate = match &entry.kind {
            AchievementKind::Milestone(m) => self.has_milestone(*m),
            AchievementKind::Combination { combo_id, .. } => self.has_combination(combo_id),
        };
        if duplicate {
            return false;
        }
        self.entries.push(entry);
        true
    }
}

/// Milestones reached by `progress` that are not yet in `log`.
pub fn pending_milestones(
    progress: &Progress,
    params: &AchievementParams,
    log: &AchievementLog,
) -> Vec<Milestone> {
    Milestone::ALL
        .into_iter()
        .filter(|m| !log.has_milestone(*m) && m.reached(progress, params))
        .collect()
}
