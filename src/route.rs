//! The dashboard's route table.
//!
//! Screens are addressed by the same paths the web client used, so the
//! binary can be opened onto any of them (`remedy /assistant`). Parsing is
//! total: anything off the table lands on `NotFound`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Consultations,
    Assistant,
    Records,
    Symptoms,
    Appointments,
    Profile,
    SignIn,
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let normalized = trimmed.strip_suffix('/').filter(|s| !s.is_empty()).unwrap_or(trimmed);
        match normalized {
            "" | "/" => Route::Home,
            "/consultations" => Route::Consultations,
            "/assistant" => Route::Assistant,
            "/records" => Route::Records,
            "/symptoms" => Route::Symptoms,
            "/appointments" => Route::Appointments,
            "/profile" => Route::Profile,
            "/sign-in" => Route::SignIn,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Consultations => "/consultations",
            Route::Assistant => "/assistant",
            Route::Records => "/records",
            Route::Symptoms => "/symptoms",
            Route::Appointments => "/appointments",
            Route::Profile => "/profile",
            Route::SignIn => "/sign-in",
            Route::NotFound => "/not-found",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Consultations => "Consultations",
            Route::Assistant => "AI Health Assistant",
            Route::Records => "Medical Records",
            Route::Symptoms => "Report Symptoms",
            Route::Appointments => "Appointments",
            Route::Profile => "Profile",
            Route::SignIn => "Sign In",
            Route::NotFound => "Page Not Found",
        }
    }

    /// Sidebar entries, in menu order.
    pub fn menu() -> [Route; 7] {
        [
            Route::Home,
            Route::Consultations,
            Route::Assistant,
            Route::Records,
            Route::Symptoms,
            Route::Appointments,
            Route::Profile,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_paths_parse_to_their_screens() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/assistant"), Route::Assistant);
        assert_eq!(Route::parse("/sign-in"), Route::SignIn);
        assert_eq!(Route::parse("/records"), Route::Records);
    }

    #[test]
    fn unknown_paths_fall_through_to_not_found() {
        assert_eq!(Route::parse("/nope"), Route::NotFound);
        assert_eq!(Route::parse("assistant"), Route::NotFound);
        assert_eq!(Route::parse("/records/123"), Route::NotFound);
    }

    #[test]
    fn trailing_slash_and_whitespace_are_tolerated() {
        assert_eq!(Route::parse(" /profile "), Route::Profile);
        assert_eq!(Route::parse("/consultations/"), Route::Consultations);
    }

    #[test]
    fn menu_paths_round_trip() {
        for route in Route::menu() {
            assert_eq!(Route::parse(route.path()), route);
        }
    }
}
