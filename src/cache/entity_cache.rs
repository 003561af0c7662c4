use super::LruMap;
use crate::models::{Exam, Question, UserAnswer};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Process-wide entity cache, shared through `Arc`
#[derive(Debug)]
pub struct EntityCache {
    exams: Mutex<LruMap<String, Exam>>,
    questions: Mutex<LruMap<String, Arc<Vec<Question>>>>,
    answers: Mutex<LruMap<String, Vec<UserAnswer>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl EntityCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            exams: Mutex::new(LruMap::new(capacity)),
            questions: Mutex::new(LruMap::new(capacity)),
            answers: Mutex::new(LruMap::new(capacity)),
        }
    }

    pub fn exam(&self, exam_id: &str) -> Option<Exam> {
        lock(&self.exams).get(&exam_id.to_string()).cloned()
    }

    pub fn has_exam(&self, exam_id: &str) -> bool {
        lock(&self.exams).contains(&exam_id.to_string())
    }

    pub fn put_exam(&self, exam: Exam) {
        if let Some(evicted) = lock(&self.exams).insert(exam.id.clone(), exam) {
            debug!("Cache evicted exam {}", evicted);
        }
    }

    pub fn questions(&self, exam_id: &str) -> Option<Arc<Vec<Question>>> {
        lock(&self.questions).get(&exam_id.to_string()).cloned()
    }

    pub fn put_questions(&self, exam_id: &str, questions: Vec<Question>) -> Arc<Vec<Question>> {
        let questions = Arc::new(questions);
        lock(&self.questions).insert(exam_id.to_string(), Arc::clone(&questions));
        questions
    }

    pub fn answers(&self, exam_id: &str) -> Option<Vec<UserAnswer>> {
        lock(&self.answers).get(&exam_id.to_string()).cloned()
    }

    pub fn put_answers(&self, exam_id: &str, answers: Vec<UserAnswer>) {
        lock(&self.answers).insert(exam_id.to_string(), answers);
    }

    /// Next read goes to the network
    pub fn invalidate_answers(&self, exam_id: &str) {
        lock(&self.answers).remove(&exam_id.to_string());
    }

    /// Marks the cached exam completed so lists show it without a refetch
    pub fn mark_exam_completed(&self, exam_id: &str) {
        let mut exams = lock(&self.exams);
        if let Some(exam) = exams.get(&exam_id.to_string()).cloned() {
            exams.insert(
                exam.id.clone(),
                Exam {
                    is_completed: true,
                    ..exam
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exam(id: &str) -> Exam {
        serde_json::from_value(serde_json::json!({"id": id, "title": id})).unwrap()
    }

    #[test]
    fn exam_map_is_bounded() {
        let cache = EntityCache::new(2);
        cache.put_exam(exam("1"));
        cache.put_exam(exam("2"));
        cache.put_exam(exam("3"));

        assert!(!cache.has_exam("1"));
        assert!(cache.has_exam("2"));
        assert!(cache.has_exam("3"));
    }

    #[test]
    fn completion_is_reflected_in_cached_exam() {
        let cache = EntityCache::new(4);
        cache.put_exam(exam("1"));
        cache.mark_exam_completed("1");
        assert!(cache.exam("1").unwrap().is_completed);
    }

    #[test]
    fn invalidated_answers_are_gone() {
        let cache = EntityCache::new(4);
        cache.put_answers("1", Vec::new());
        assert!(cache.answers("1").is_some());
        cache.invalidate_answers("1");
        assert!(cache.answers("1").is_none());
    }
}
