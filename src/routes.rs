//! The three screens of the app and their paths.

use std::fmt;

use crate::template::TemplateId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Templates,
    Builder(TemplateId),
}

impl Route {
    /// Map a path to a screen. Anything unrecognized, including a builder
    /// path with an unknown template id, lands on [`Route::Landing`].
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Landing,
            ["templates"] => Route::Templates,
            ["builder", id] => id.parse().map(Route::Builder).unwrap_or(Route::Landing),
            _ => Route::Landing,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Templates => "/templates".to_string(),
            Route::Builder(template) => format!("/builder/{template}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_paths() {
        assert_eq!(Route::parse("/"), Route::Landing);
        assert_eq!(Route::parse(""), Route::Landing);
        assert_eq!(Route::parse("/templates"), Route::Templates);
        assert_eq!(Route::parse("/templates/"), Route::Templates);
        assert_eq!(Route::parse("/builder/modern"), Route::Builder(TemplateId::Modern));
        assert_eq!(Route::parse("/builder/technical?tab=2"), Route::Builder(TemplateId::Technical));
    }

    #[test]
    fn test_unknown_paths_land_home() {
        assert_eq!(Route::parse("/builder/retro"), Route::Landing);
        assert_eq!(Route::parse("/builder"), Route::Landing);
        assert_eq!(Route::parse("/admin"), Route::Landing);
    }

    #[test]
    fn test_path_renders_back() {
        for template in TemplateId::ALL {
            let route = Route::Builder(template);
            assert_eq!(Route::parse(&route.path()), route);
        }
        assert_eq!(Route::Templates.to_string(), "/templates");
    }
}
