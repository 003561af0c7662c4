use crate::models::{Exam, ExamResults, Question, Subject, UserAnswer};
use std::collections::{BTreeMap, HashMap};

/// Bucket for questions without a subject
pub const UNCATEGORIZED: &str = "uncategorized";

/// One row of the per-question review
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionReview {
    pub question_id: String,
    pub number: usize,
    pub selected_letter: Option<String>,
    pub correct_letter: Option<String>,
    pub is_correct: bool,
    pub points_earned: f64,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectBreakdown {
    pub subject_id: String,
    pub name: String,
    pub correct: usize,
    pub total: usize,
}

impl SubjectBreakdown {
    pub fn percentage(&self) -> f64 {
        percentage(self.correct as f64, self.total as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExamReport {
    pub exam_id: String,
    pub title: String,
    pub total_points: f64,
    pub earned_points: f64,
    pub correct: usize,
    pub incorrect: usize,
    pub unanswered: usize,
    pub passing_score: f64,
    pub subjects: Vec<SubjectBreakdown>,
    pub questions: Vec<QuestionReview>,
}

impl ExamReport {
    /// Grades each question by its single persisted answer.
    ///
    /// Correctness comes from the answer record when the server set it,
    /// otherwise from the option's `is_correct` flag.
    pub fn build(
        exam: &Exam,
        questions: &[Question],
        answers: &[UserAnswer],
        subjects: &[Subject],
    ) -> Self {
        let by_question: HashMap<&str, &UserAnswer> = answers
            .iter()
            .map(|a| (a.question_id.as_str(), a))
            .collect();
        let subject_names: HashMap<&str, &str> = subjects
            .iter()
            .map(|s| (s.id.as_str(), s.name.as_str()))
            .collect();

        let mut report = ExamReport {
            exam_id: exam.id.clone(),
            title: exam.title.clone(),
            total_points: 0.0,
            earned_points: 0.0,
            correct: 0,
            incorrect: 0,
            unanswered: 0,
            passing_score: exam.passing_score,
            subjects: Vec::new(),
            questions: Vec::with_capacity(questions.len()),
        };
        let mut buckets: BTreeMap<String, (usize, usize)> = BTreeMap::new();

        for (i, question) in questions.iter().enumerate() {
            let answer = by_question.get(question.id.as_str()).copied();
            let selected = answer.and_then(|a| question.option(&a.selected_option_id));
            let is_correct = match (answer, selected) {
                (Some(a), _) if a.is_correct.is_some() => a.is_correct == Some(true),
                (_, Some(option)) => option.is_correct == Some(true),
                _ => false,
            };
            let points_earned = match answer {
                Some(a) if a.points_earned > 0.0 => a.points_earned,
                Some(_) if is_correct => question.points,
                _ => 0.0,
            };

            report.total_points += question.points;
            report.earned_points += points_earned;
            match answer {
                None => report.unanswered += 1,
                Some(_) if is_correct => report.correct += 1,
                Some(_) => report.incorrect += 1,
            }

            let subject_id = question
                .subject_id
                .clone()
                .unwrap_or_else(|| UNCATEGORIZED.to_string());
            let bucket = buckets.entry(subject_id).or_insert((0, 0));
            bucket.1 += 1;
            if is_correct {
                bucket.0 += 1;
            }

            report.questions.push(QuestionReview {
                question_id: question.id.clone(),
                number: i + 1,
                selected_letter: selected.map(|o| o.letter.clone()),
                correct_letter: question.correct_option().map(|o| o.letter.clone()),
                is_correct,
                points_earned,
                points: question.points,
            });
        }

        report.subjects = buckets
            .into_iter()
            .map(|(subject_id, (correct, total))| SubjectBreakdown {
                name: subject_names
                    .get(subject_id.as_str())
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| subject_id.clone()),
                subject_id,
                correct,
                total,
            })
            .collect();
        report
    }

    pub fn percentage(&self) -> f64 {
        percentage(self.earned_points, self.total_points)
    }

    pub fn passed(&self) -> bool {
        self.percentage() >= self.passing_score
    }

    /// `(label, value)` pairs for the results chart
    pub fn chart_series(&self) -> Vec<(String, f64)> {
        self.subjects
            .iter()
            .map(|s| (s.name.clone(), s.percentage()))
            .collect()
    }

    /// Cross-check against the server's own totals; `true` when they agree
    pub fn matches(&self, results: &ExamResults) -> bool {
        (self.earned_points - results.earned_points).abs() < 1e-6
            && self.correct as u32 == results.correct_answers
    }
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        0.0
    } else {
        (part / whole * 100.0 * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerOption;

    fn option(id: &str, letter: &str, correct: bool) -> AnswerOption {
        AnswerOption {
            id: id.to_string(),
            letter: letter.to_string(),
            text: String::new(),
            is_correct: Some(correct),
        }
    }

    fn question(id: &str, subject: Option<&str>, points: f64) -> Question {
        Question {
            id: id.to_string(),
            exam_id: "e1".to_string(),
            text: String::new(),
            image_url: None,
            order: 0,
            points,
            subject_id: subject.map(str::to_string),
            options: vec![
                option(&format!("{id}-a"), "A", true),
                option(&format!("{id}-b"), "B", false),
            ],
        }
    }

    fn answer(question_id: &str, option_id: &str) -> UserAnswer {
        UserAnswer {
            id: format!("ans-{question_id}"),
            exam_id: "e1".to_string(),
            question_id: question_id.to_string(),
            selected_option_id: option_id.to_string(),
            is_correct: None,
            points_earned: 0.0,
            time_spent: 0,
            created_at: None,
            updated_at: None,
        }
    }

    fn exam() -> Exam {
        serde_json::from_value(serde_json::json!({
            "id": "e1",
            "title": "Prijemni",
            "passingScore": 50.0
        }))
        .unwrap()
    }

    #[test]
    fn report_counts_and_breaks_down_by_subject() {
        let questions = vec![
            question("q1", Some("math"), 2.0),
            question("q2", Some("math"), 1.0),
            question("q3", Some("physics"), 1.0),
            question("q4", None, 1.0),
        ];
        let answers = vec![answer("q1", "q1-a"), answer("q2", "q2-b"), answer("q3", "q3-a")];
        let subjects = vec![Subject {
            id: "math".to_string(),
            name: "Matematika".to_string(),
            sector_id: None,
        }];

        let report = ExamReport::build(&exam(), &questions, &answers, &subjects);

        assert_eq!((report.correct, report.incorrect, report.unanswered), (2, 1, 1));
        assert_eq!(report.total_points, 5.0);
        assert_eq!(report.earned_points, 3.0);
        assert_eq!(report.percentage(), 60.0);
        assert!(report.passed());

        let math = report.subjects.iter().find(|s| s.subject_id == "math").unwrap();
        assert_eq!(math.name, "Matematika");
        assert_eq!((math.correct, math.total), (1, 2));
        assert!(report.subjects.iter().any(|s| s.subject_id == UNCATEGORIZED));

        let row = &report.questions[1];
        assert_eq!(row.selected_letter.as_deref(), Some("B"));
        assert_eq!(row.correct_letter.as_deref(), Some("A"));
        assert!(!row.is_correct);
    }

    #[test]
    fn server_grading_wins_over_option_flags() {
        let questions = vec![question("q1", None, 1.0)];
        let mut graded = answer("q1", "q1-b");
        graded.is_correct = Some(true);
        graded.points_earned = 1.0;

        let report = ExamReport::build(&exam(), &questions, &[graded], &[]);
        assert_eq!(report.correct, 1);
        assert_eq!(report.earned_points, 1.0);
    }

    #[test]
    fn empty_exam_scores_zero() {
        let report = ExamReport::build(&exam(), &[], &[], &[]);
        assert_eq!(report.percentage(), 0.0);
        assert!(!report.passed());
        assert!(report.chart_series().is_empty());
    }
}
