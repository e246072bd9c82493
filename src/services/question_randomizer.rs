use rand::{seq::SliceRandom, Rng};

use crate::models::domain::Exam;

/// The exam as a candidate sees it on this request. Randomized exams get a
/// fresh uniform permutation of their questions; the stored exam is untouched.
pub fn present(exam: &Exam) -> Exam {
    present_with_rng(exam, &mut rand::thread_rng())
}

pub fn present_with_rng<R: Rng + ?Sized>(exam: &Exam, rng: &mut R) -> Exam {
    let mut view = exam.clone();
    if view.randomized {
        view.questions.shuffle(rng);
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{ExamCategory, Question, QuestionType};
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashMap;

    fn exam_with(count: usize, randomized: bool) -> Exam {
        let mut exam = Exam::new("Shuffle", ExamCategory::General, 30, "faculty-1");
        exam.randomized = randomized;
        exam.questions = (0..count)
            .map(|i| Question::free_text(QuestionType::Short, &format!("Question {}", i)))
            .collect();
        exam
    }

    fn ids(exam: &Exam) -> Vec<String> {
        exam.questions.iter().map(|q| q.id.clone()).collect()
    }

    #[test]
    fn randomized_view_is_a_permutation_and_store_is_untouched() {
        let exam = exam_with(12, true);
        let stored = ids(&exam);

        for _ in 0..20 {
            let view = present(&exam);
            let mut seen = ids(&view);
            let mut expected = stored.clone();
            seen.sort();
            expected.sort();
            assert_eq!(seen, expected);
        }

        assert_eq!(ids(&exam), stored);
    }

    #[test]
    fn non_randomized_view_keeps_stored_order() {
        let exam = exam_with(12, false);
        for _ in 0..10 {
            assert_eq!(ids(&present(&exam)), ids(&exam));
        }
    }

    #[test]
    fn every_ordering_is_about_equally_likely() {
        let exam = exam_with(3, true);
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts: HashMap<Vec<String>, usize> = HashMap::new();

        let trials = 6000;
        for _ in 0..trials {
            *counts.entry(ids(&present_with_rng(&exam, &mut rng))).or_default() += 1;
        }

        assert_eq!(counts.len(), 6);
        for count in counts.values() {
            assert!((800..=1200).contains(count), "skewed count {}", count);
        }
    }

    #[test]
    fn view_keeps_exam_metadata() {
        let exam = exam_with(4, true);
        let view = present(&exam);
        assert_eq!(view.id, exam.id);
        assert_eq!(view.title, exam.title);
        assert_eq!(view.duration_min, exam.duration_min);
    }
}
