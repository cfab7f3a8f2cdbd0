/// A named projection over the task list.
///
/// The fixed names are recognized case-insensitively; any other string is
/// treated as a project filter, so new projects need no registration here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    All,
    Today,
    Next7Days,
    Inbox,
    Completed,
    Focus,
    Project(String),
}

impl View {
    /// Interpret a view identifier string.
    pub fn parse(s: &str) -> View {
        match s.to_lowercase().as_str() {
            "all" => View::All,
            "today" => View::Today,
            "next7days" => View::Next7Days,
            "inbox" => View::Inbox,
            "completed" => View::Completed,
            "focus" => View::Focus,
            _ => View::Project(s.to_string()),
        }
    }

    /// The identifier string for this view
    pub fn as_str(&self) -> &str {
        match self {
            View::All => "all",
            View::Today => "today",
            View::Next7Days => "next7days",
            View::Inbox => "inbox",
            View::Completed => "completed",
            View::Focus => "focus",
            View::Project(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_names_parse_case_insensitively() {
        assert_eq!(View::parse("today"), View::Today);
        assert_eq!(View::parse("Next7Days"), View::Next7Days);
        assert_eq!(View::parse("COMPLETED"), View::Completed);
        assert_eq!(View::parse("focus"), View::Focus);
    }

    #[test]
    fn unknown_names_become_project_filters() {
        assert_eq!(View::parse("Work"), View::Project("Work".to_string()));
        assert_eq!(View::parse("Work").as_str(), "Work");
    }
}
