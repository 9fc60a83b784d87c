use crate::models::{Project, ProjectStatus};

/// How many recent projects each dashboard panel shows
pub const RECENT_LIMIT: usize = 3;

/// The in-memory project list, replaced wholesale on every completed fetch
#[derive(Debug, Default)]
pub struct Catalog {
    projects: Vec<Project>,
}

/// Per-status totals for the dashboard header
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub ongoing: usize,
    pub upcoming: usize,
    pub finished: usize,
}

impl Catalog {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    pub fn replace(&mut self, projects: Vec<Project>) {
        tracing::debug!(count = projects.len(), "Catalog replaced");
        self.projects = projects;
    }

    pub fn clear(&mut self) {
        self.projects.clear();
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn by_status<'a>(&'a self, status: &ProjectStatus) -> impl Iterator<Item = &'a Project> {
        self.projects.iter().filter(move |p| &p.status == status)
    }

    /// The last few projects of a category, newest first
    pub fn recent<'a>(&'a self, status: &ProjectStatus) -> Vec<&'a Project> {
        let matching: Vec<&Project> = self.by_status(status).collect();
        let start = matching.len().saturating_sub(RECENT_LIMIT);
        matching[start..].iter().rev().copied().collect()
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts {
            total: self.projects.len(),
            ..StatusCounts::default()
        };
        for project in &self.projects {
            match project.status {
                ProjectStatus::Ongoing => counts.ongoing += 1,
                ProjectStatus::Upcoming => counts.upcoming += 1,
                ProjectStatus::Finished => counts.finished += 1,
                ProjectStatus::Other(_) => {}
            }
        }
        counts
    }

    /// Projects whose name or location contains `query` (case-insensitive),
    /// restricted to `status` when given
    pub fn filter(&self, query: &str, status: Option<&ProjectStatus>) -> Vec<&Project> {
        let needle = query.trim().to_lowercase();
        self.projects
            .iter()
            .filter(|p| status.is_none_or(|s| &p.status == s))
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.location.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn project(id: &str, name: &str, location: &str, status: &str) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            location: location.to_string(),
            status: ProjectStatus::from_label(status),
            description: String::new(),
            photos: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn sample() -> Catalog {
        Catalog::new(vec![
            project("1", "Palm Residency", "Banani", "Ongoing"),
            project("2", "Lake View", "Gulshan", "Ongoing"),
            project("3", "Green Tower", "Dhanmondi", "Upcoming"),
            project("4", "Sky Nest", "Banani", "Ongoing"),
            project("5", "River Side", "Uttara", "Ongoing"),
            project("6", "Old Mill", "Mirpur", "ongoing"),
            project("7", "Hill Top", "Sylhet", "Finished"),
        ])
    }

    fn ids(projects: &[&Project]) -> Vec<String> {
        projects.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn recent_is_last_three_newest_first() {
        let catalog = sample();

        assert_eq!(ids(&catalog.recent(&ProjectStatus::Ongoing)), vec!["5", "4", "2"]);
        assert_eq!(ids(&catalog.recent(&ProjectStatus::Upcoming)), vec!["3"]);
    }

    #[test]
    fn recent_outlives_the_status_it_was_asked_for() {
        let catalog = sample();

        let recent = {
            let status = ProjectStatus::from_label("Finished");
            catalog.recent(&status)
        };

        assert_eq!(ids(&recent), vec!["7"]);
    }

    #[test]
    fn counts_use_exact_status_labels() {
        let counts = sample().counts();

        assert_eq!(
            counts,
            StatusCounts {
                total: 7,
                ongoing: 4,
                upcoming: 1,
                finished: 1,
            }
        );
    }

    #[test]
    fn filter_matches_name_or_location_case_insensitively() {
        let catalog = sample();

        assert_eq!(ids(&catalog.filter("banani", None)), vec!["1", "4"]);
        assert_eq!(ids(&catalog.filter("  TOWER ", None)), vec!["3"]);
        assert_eq!(catalog.filter("", None).len(), 7);
    }

    #[test]
    fn filter_combines_query_and_status() {
        let catalog = sample();

        assert_eq!(
            ids(&catalog.filter("banani", Some(&ProjectStatus::Ongoing))),
            vec!["1", "4"]
        );
        assert_eq!(ids(&catalog.filter("", Some(&ProjectStatus::Finished))), vec!["7"]);
        assert!(catalog.filter("nowhere", Some(&ProjectStatus::Ongoing)).is_empty());
    }

    #[test]
    fn replace_overwrites_the_whole_list() {
        let mut catalog = sample();
        catalog.replace(vec![project("9", "Solo", "Khulna", "Upcoming")]);

        assert_eq!(catalog.len(), 1);
        assert!(catalog.find("1").is_none());
        assert_eq!(catalog.find("9").map(|p| p.name.as_str()), Some("Solo"));

        catalog.clear();
        assert!(catalog.is_empty());
    }
}
