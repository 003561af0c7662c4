use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    Dashboard,
    ExamList,
    TakeExam {
        exam_id: String,
        question_id: Option<String>,
    },
    Review {
        exam_id: String,
    },
    Results,
    Tips,
    Settings,
    AdminExams,
    AdminNewExam,
    AdminEditExam {
        exam_id: String,
    },
    NotFound,
}

/// Who may open a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Only while signed out (login, register)
    GuestOnly,
    Protected,
    Admin,
}

impl Route {
    pub fn access(&self) -> Access {
        match self {
            Route::Home | Route::Tips | Route::NotFound => Access::Public,
            Route::Login | Route::Register => Access::GuestOnly,
            Route::Dashboard
            | Route::ExamList
            | Route::TakeExam { .. }
            | Route::Review { .. }
            | Route::Results
            | Route::Settings => Access::Protected,
            Route::AdminExams | Route::AdminNewExam | Route::AdminEditExam { .. } => Access::Admin,
        }
    }

    /// Parses a path such as `/exams/7/take?question=12`.
    ///
    /// Unknown paths map to `NotFound`.
    pub fn parse(path: &str) -> Route {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["dashboard"] => Route::Dashboard,
            ["exams"] => Route::ExamList,
            ["exams", id, "take"] => Route::TakeExam {
                exam_id: id.to_string(),
                question_id: query.and_then(|q| query_param(q, "question")),
            },
            ["exams", id, "take", question] => Route::TakeExam {
                exam_id: id.to_string(),
                question_id: Some(question.to_string()),
            },
            ["exams", id, "review"] => Route::Review {
                exam_id: id.to_string(),
            },
            ["results"] => Route::Results,
            ["tips"] => Route::Tips,
            ["settings"] => Route::Settings,
            ["admin", "exams"] => Route::AdminExams,
            ["admin", "exams", "new"] => Route::AdminNewExam,
            ["admin", "exams", id, "edit"] => Route::AdminEditExam {
                exam_id: id.to_string(),
            },
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::ExamList => "/exams".to_string(),
            Route::TakeExam {
                exam_id,
                question_id: Some(q),
            } => format!("/exams/{exam_id}/take?question={q}"),
            Route::TakeExam {
                exam_id,
                question_id: None,
            } => format!("/exams/{exam_id}/take"),
            Route::Review { exam_id } => format!("/exams/{exam_id}/review"),
            Route::Results => "/results".to_string(),
            Route::Tips => "/tips".to_string(),
            Route::Settings => "/settings".to_string(),
            Route::AdminExams => "/admin/exams".to_string(),
            Route::AdminNewExam => "/admin/exams/new".to_string(),
            Route::AdminEditExam { exam_id } => format!("/admin/exams/{exam_id}/edit"),
            Route::NotFound => "/404".to_string(),
        }
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
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
    fn take_exam_accepts_query_and_segment_forms() {
        assert_eq!(
            Route::parse("/exams/7/take?question=12"),
            Route::TakeExam {
                exam_id: "7".to_string(),
                question_id: Some("12".to_string())
            }
        );
        assert_eq!(
            Route::parse("/exams/7/take/12"),
            Route::parse("/exams/7/take?question=12")
        );
        assert_eq!(
            Route::parse("/exams/7/take"),
            Route::TakeExam {
                exam_id: "7".to_string(),
                question_id: None
            }
        );
    }

    #[test]
    fn paths_parse_back_to_the_same_route() {
        let routes = [
            Route::Home,
            Route::Review {
                exam_id: "3".to_string(),
            },
            Route::AdminEditExam {
                exam_id: "9".to_string(),
            },
            Route::AdminNewExam,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn unknown_path_is_not_found() {
        assert_eq!(Route::parse("/exams/1/cheat"), Route::NotFound);
    }
}
