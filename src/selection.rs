use crate::models::Project;

/// The one highlighted project, shared by the table and the map.
///
/// The project is stored verbatim but always compared by id, since each
/// pipeline run hands the views fresh copies of the same records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    selected: Option<Project>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, project: Project) {
        self.selected = Some(project);
    }

    pub fn project(&self) -> Option<&Project> {
        self.selected.as_ref()
    }

    pub fn id(&self) -> Option<&str> {
        self.selected.as_ref().map(|p| p.id.as_str())
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.id() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectStatus;

    fn project(id: &str) -> Project {
        Project {
            id: id.to_string(),
            project_name: format!("Project {}", id),
            latitude: 0.0,
            longitude: 0.0,
            status: ProjectStatus::Active,
            last_updated: 0,
            description: None,
            budget: None,
            category: None,
        }
    }

    #[test]
    fn compares_by_id_not_by_contents() {
        let mut selection = Selection::new();
        assert!(!selection.is_selected("a"));

        selection.select(project("a"));
        let mut copy = project("a");
        copy.project_name = "Renamed copy".to_string();
        assert!(selection.is_selected(&copy.id));
        assert!(!selection.is_selected("b"));
        assert_eq!(selection.id(), Some("a"));
    }
}
