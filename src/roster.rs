use std::{cmp::Ordering, collections::HashSet};

use itertools::Itertools;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::types::{Exercise, Fetch, Student};

/// Reduces a name to lowercase base letters, so `Émile` keys as `emile`.
fn base_letters(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Orders two names the way a reader expects: by base letters ignoring case
/// and accents, then by case-folded text so accented forms follow plain ones,
/// then byte-wise so the order stays total and deterministic.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Returns the students whose username is in `allow`, in directory order.
///
/// An empty allow-list keeps everyone. Anything but a ready directory yields
/// no students at all.
pub fn filter_students(students: &Fetch<Vec<Student>>, allow: &[String]) -> Vec<Student> {
    let Some(students) = students.ready() else {
        return Vec::new();
    };
    if allow.is_empty() {
        return students.clone();
    }

    let allow: HashSet<&str> = allow.iter().map(String::as_str).collect();
    students
        .iter()
        .filter(|s| allow.contains(s.username.as_str()))
        .cloned()
        .collect()
}

/// Returns the exercises whose name is in `allow`, sorted by name.
///
/// An empty allow-list keeps every exercise. Anything but a ready catalog
/// yields no exercises at all.
pub fn filter_exercises(exercises: &Fetch<Vec<Exercise>>, allow: &[String]) -> Vec<Exercise> {
    let Some(exercises) = exercises.ready() else {
        return Vec::new();
    };

    let allow: HashSet<&str> = allow.iter().map(String::as_str).collect();
    exercises
        .iter()
        .filter(|e| allow.is_empty() || allow.contains(e.name()))
        .cloned()
        .sorted_by(|a, b| compare_names(a.name(), b.name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[&str]) -> Fetch<Vec<Exercise>> {
        Fetch::Ready(names.iter().map(|n| Exercise::new(*n)).collect())
    }

    fn names(exercises: &[Exercise]) -> Vec<&str> {
        exercises.iter().map(Exercise::name).collect()
    }

    #[test]
    fn empty_allow_list_keeps_every_exercise_sorted() {
        let out = filter_exercises(&catalog(&["loops", "Arrays", "arrays", "maps"]), &[]);
        assert_eq!(names(&out), vec!["Arrays", "arrays", "loops", "maps"]);
    }

    #[test]
    fn accented_names_sort_with_their_base_letters() {
        let out = filter_exercises(&catalog(&["zeta", "Émile", "alpha", "emile", "Éclair"]), &[]);
        assert_eq!(names(&out), vec!["alpha", "Éclair", "emile", "Émile", "zeta"]);
    }

    #[test]
    fn allow_list_keeps_the_intersection() {
        let allow = vec!["maps".to_string(), "loops".to_string(), "missing".to_string()];
        let out = filter_exercises(&catalog(&["loops", "arrays", "maps"]), &allow);
        assert_eq!(names(&out), vec!["loops", "maps"]);
    }

    #[test]
    fn pending_or_failed_fetches_yield_nothing() {
        assert!(filter_exercises(&Fetch::Loading, &[]).is_empty());
        assert!(filter_students(&Fetch::Failed("boom".into()), &[]).is_empty());
    }

    #[test]
    fn students_keep_directory_order() {
        let students = Fetch::Ready(vec![
            Student::new(3, "zed"),
            Student::new(1, "ann"),
            Student::new(2, "bob"),
        ]);
        let allow = vec!["ann".to_string(), "zed".to_string()];

        let out = filter_students(&students, &allow);
        let usernames: Vec<_> = out.iter().map(|s| s.username.as_str()).collect();
        assert_eq!(usernames, vec!["zed", "ann"]);
        assert_eq!(filter_students(&students, &[]).len(), 3);
    }
}
