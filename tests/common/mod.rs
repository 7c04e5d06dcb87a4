#![allow(dead_code)]

use geo_dashboard::{Project, ProjectStatus};

/// Builds a project with the optional fields left empty.
pub fn make_project(id: &str, name: &str, status: ProjectStatus, last_updated: i64) -> Project {
    Project {
        id: id.to_string(),
        project_name: name.to_string(),
        latitude: 39.0,
        longitude: -98.0,
        status,
        last_updated,
        description: None,
        budget: None,
        category: None,
    }
}

/// Lake Rd (active, updated 100) and River Ln (pending, updated 200).
pub fn lake_and_river() -> Vec<Project> {
    vec![
        make_project("a", "Lake Rd", ProjectStatus::Active, 100),
        make_project("b", "River Ln", ProjectStatus::Pending, 200),
    ]
}

/// A store with every status, sparse optionals and repeated values.
pub fn mixed_store() -> Vec<Project> {
    let statuses = [
        ProjectStatus::Active,
        ProjectStatus::Pending,
        ProjectStatus::Completed,
        ProjectStatus::Cancelled,
        ProjectStatus::Unknown,
    ];
    let categories = ["Energy", "Parks", "Transportation"];
    (0..45)
        .map(|i| {
            let mut p = make_project(
                &format!("p{:02}", i),
                &format!("Site {} {}", ["Lake", "River", "Hill"][i % 3], i % 7),
                statuses[i % statuses.len()],
                (i as i64 * 37) % 11,
            );
            if i % 4 != 0 {
                p.category = Some(categories[i % categories.len()].to_string());
            }
            if i % 3 != 0 {
                p.budget = Some(((i * 7919) % 1000) as f64);
            }
            p.latitude = 30.0 + (i % 10) as f64;
            p
        })
        .collect()
}
