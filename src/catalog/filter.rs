//! Listing filters for the project catalog.

use serde::Deserialize;

use crate::models::Project;

/// Active predicates of the filter panel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    /// Free text matched against name, description and problem statement.
    #[serde(default, alias = "q")]
    pub search: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
}

impl ProjectFilter {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_province(mut self, province: impl Into<String>) -> Self {
        self.province = Some(province.into());
        self
    }

    /// Whether any predicate narrows the listing.
    pub fn has_active_filters(&self) -> bool {
        !self.search.is_empty() || self.category().is_some() || self.province().is_some()
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    fn province(&self) -> Option<&str> {
        self.province.as_deref().filter(|p| !p.is_empty())
    }

    /// Check a single project against every active predicate.
    pub fn matches(&self, project: &Project) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = project.name.to_lowercase().contains(&needle)
            || project.description.to_lowercase().contains(&needle)
            || project.problem_solved.to_lowercase().contains(&needle);

        let matches_category = self.category().map_or(true, |c| project.category == c);
        let matches_province = self
            .province()
            .map_or(true, |p| project.location.province == p);

        matches_search && matches_category && matches_province
    }
}

/// Projects satisfying the filter, in catalog order.
pub fn filter_projects<'a>(projects: &'a [Project], filter: &ProjectFilter) -> Vec<&'a Project> {
    projects.iter().filter(|p| filter.matches(p)).collect()
}

/// Results header text ("3 proyectos disponibles", "1 proyecto encontrado").
pub fn results_label(count: usize, filter: &ProjectFilter) -> String {
    let plural = if count != 1 { "s" } else { "" };
    let verb = if filter.has_active_filters() {
        "encontrado"
    } else {
        "disponible"
    };
    format!("{count} proyecto{plural} {verb}{plural}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::PROJECTS;

    fn names(projects: Vec<&Project>) -> Vec<&str> {
        projects.into_iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_no_filters_returns_everything() {
        let result = filter_projects(&PROJECTS, &ProjectFilter::default());
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_province_salta() {
        let filter = ProjectFilter::default().with_province("Salta");
        assert_eq!(
            names(filter_projects(&PROJECTS, &filter)),
            vec!["Comedor Escolar San Martín"]
        );
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        // name
        let by_name = ProjectFilter::default().with_search("BIBLIOTECA");
        assert_eq!(
            names(filter_projects(&PROJECTS, &by_name)),
            vec!["Biblioteca Comunitaria Quilmes"]
        );

        // problem statement only
        let by_problem = ProjectFilter::default().with_search("desnutrición");
        assert_eq!(
            names(filter_projects(&PROJECTS, &by_problem)),
            vec!["Comedor Escolar San Martín"]
        );

        // description only
        let by_description = ProjectFilter::default().with_search("alfabetización");
        assert_eq!(filter_projects(&PROJECTS, &by_description).len(), 1);
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let filter = ProjectFilter::default()
            .with_search("escuela")
            .with_category("Medio Ambiente")
            .with_province("Córdoba");
        assert_eq!(
            names(filter_projects(&PROJECTS, &filter)),
            vec!["Huerta Urbana Sustentable"]
        );

        let disjoint = ProjectFilter::default()
            .with_category("Medio Ambiente")
            .with_province("Salta");
        assert!(filter_projects(&PROJECTS, &disjoint).is_empty());
    }

    #[test]
    fn test_every_combination_matches_brute_force() {
        let searches = ["", "comedor", "educación", "zzz"];
        let categories = [None, Some("Educación y Tecnología"), Some("Salud")];
        let provinces = [None, Some("Buenos Aires"), Some("Salta")];

        for search in searches {
            for category in categories {
                for province in provinces {
                    let filter = ProjectFilter {
                        search: search.to_string(),
                        category: category.map(str::to_string),
                        province: province.map(str::to_string),
                    };
                    let expected: Vec<&str> = PROJECTS
                        .iter()
                        .filter(|p| {
                            let s = search.to_lowercase();
                            (p.name.to_lowercase().contains(&s)
                                || p.description.to_lowercase().contains(&s)
                                || p.problem_solved.to_lowercase().contains(&s))
                                && category.map_or(true, |c| p.category == c)
                                && province.map_or(true, |v| p.location.province == v)
                        })
                        .map(|p| p.id.as_str())
                        .collect();
                    let actual: Vec<&str> = filter_projects(&PROJECTS, &filter)
                        .into_iter()
                        .map(|p| p.id.as_str())
                        .collect();
                    assert_eq!(actual, expected, "filter {:?}", filter);
                }
            }
        }
    }

    #[test]
    fn test_empty_selections_are_inactive() {
        let filter = ProjectFilter {
            search: String::new(),
            category: Some(String::new()),
            province: Some(String::new()),
        };
        assert!(!filter.has_active_filters());
        assert_eq!(filter_projects(&PROJECTS, &filter).len(), 3);
    }

    #[test]
    fn test_results_label() {
        let none = ProjectFilter::default();
        assert_eq!(results_label(3, &none), "3 proyectos disponibles");
        let active = ProjectFilter::default().with_province("Salta");
        assert_eq!(results_label(1, &active), "1 proyecto encontrado");
    }
}
