//! Career phase progress shown on the dashboard.

use serde::Serialize;

use crate::ikigai::dialogue::TOTAL_QUESTIONS;
use crate::models::ikigai::IkigaiData;
use crate::models::project::Project;

pub struct CareerPhase {
    pub id: i32,
    pub name: &'static str,
    pub description: &'static str,
    pub tasks: [&'static str; 3],
}

pub const CAREER_PHASES: [CareerPhase; 4] = [
    CareerPhase {
        id: 1,
        name: "Introspection",
        description: "Understand your likes, skills, values, and career direction",
        tasks: ["Complete Ikigai profile", "Take skills assessment", "Define values"],
    },
    CareerPhase {
        id: 2,
        name: "Exploration",
        description: "Research career paths, connect with mentors, identify projects",
        tasks: ["Research AI roles", "Connect with 3 mentors", "Identify 2 projects"],
    },
    CareerPhase {
        id: 3,
        name: "Reflection",
        description: "Analyze feedback, refine direction, prepare for applications",
        tasks: ["Get mentor feedback", "Refine resume", "Practice interviews"],
    },
    CareerPhase {
        id: 4,
        name: "Action",
        description: "Apply for roles, network, showcase projects, interview",
        tasks: ["Apply to 10 roles", "Complete portfolio", "Share on social media"],
    },
];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PhaseProgress {
    pub id: i32,
    pub name: &'static str,
    pub description: &'static str,
    pub tasks: Vec<&'static str>,
    /// Percent, 0..=100.
    pub progress: u32,
    pub current: bool,
}

/// Share of the questionnaire answered, in percent.
pub fn ikigai_completion(data: &IkigaiData) -> u32 {
    let answered = data.all_answers().count().min(TOTAL_QUESTIONS);
    (answered * 100 / TOTAL_QUESTIONS) as u32
}

/// Mean completion of the given projects, 0 when there are none.
pub fn mean_project_progress(projects: &[Project]) -> u32 {
    if projects.is_empty() {
        return 0;
    }
    let sum: i64 = projects.iter().map(|p| p.progress.clamp(0, 100) as i64).sum();
    (sum / projects.len() as i64) as u32
}

/// Earlier phases count as done and later ones as not started. The current
/// phase is measured by the Ikigai questionnaire during Introspection and by
/// project completion afterwards.
pub fn phase_progress(current_phase: i32, ikigai: &IkigaiData, projects: &[Project]) -> Vec<PhaseProgress> {
    CAREER_PHASES
        .iter()
        .map(|phase| {
            let progress = match phase.id.cmp(&current_phase) {
                std::cmp::Ordering::Less => 100,
                std::cmp::Ordering::Greater => 0,
                std::cmp::Ordering::Equal if phase.id == 1 => ikigai_completion(ikigai),
                std::cmp::Ordering::Equal => mean_project_progress(projects),
            };
            PhaseProgress {
                id: phase.id,
                name: phase.name,
                description: phase.description,
                tasks: phase.tasks.to_vec(),
                progress,
                current: phase.id == current_phase,
            }
        })
        .collect()
}

/// Floor of the mean phase progress.
pub fn overall_progress(phases: &[PhaseProgress]) -> u32 {
    if phases.is_empty() {
        return 0;
    }
    phases.iter().map(|p| p.progress).sum::<u32>() / phases.len() as u32
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::models::project::ProjectStatus;

    fn project(progress: i32) -> Project {
        Project {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "p".into(),
            description: String::new(),
            status: ProjectStatus::Ongoing,
            skills: vec![],
            start_date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            end_date: None,
            progress,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_introspection_tracks_ikigai_answers() {
        let ikigai = IkigaiData {
            what_i_love: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            ..Default::default()
        };
        let phases = phase_progress(1, &ikigai, &[]);
        assert_eq!(phases[0].progress, 25);
        assert!(phases[0].current);
        assert!(phases[1..].iter().all(|p| p.progress == 0));
    }

    #[test]
    fn test_later_phase_uses_projects() {
        let phases = phase_progress(2, &IkigaiData::default(), &[project(65), project(20)]);
        assert_eq!(phases[0].progress, 100);
        assert_eq!(phases[1].progress, 42);
        assert_eq!(phases[2].progress, 0);
    }

    #[test]
    fn test_overall_is_floored_mean() {
        let phases = phase_progress(2, &IkigaiData::default(), &[project(65)]);
        // (100 + 65 + 0 + 0) / 4 = 41.25
        assert_eq!(overall_progress(&phases), 41);
    }
}
