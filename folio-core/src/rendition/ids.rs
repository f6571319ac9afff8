//! Collision-free manifest ids

use crate::config::IdStrategy;
use uuid::Uuid;

/// Produces manifest ids that do not collide with existing ones
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    strategy: IdStrategy,
    counter: u64,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            counter: 0,
        }
    }

    /// `requested` (made a valid XML id) if free, otherwise a variant of it
    /// for which `taken` is false
    pub fn unique<F>(&mut self, requested: &str, taken: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        let base = sanitize(requested);
        let mut candidate = base.clone();

        while taken(&candidate) {
            candidate = match self.strategy {
                IdStrategy::RandomDigits => {
                    candidate.push(random_digit());
                    candidate
                }
                IdStrategy::Counter => {
                    self.counter += 1;
                    format!("{base}-{}", self.counter)
                }
                IdStrategy::Uuid => format!("{base}-{}", Uuid::new_v4().simple()),
            };
        }
        candidate
    }
}

fn random_digit() -> char {
    let digit = (Uuid::new_v4().as_u128() % 10) as u8;
    char::from(b'0' + digit)
}

/// Replace characters not allowed in an XML id; ids may not start with a digit
pub fn sanitize(id: &str) -> String {
    let mut clean: String = id
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match clean.chars().next() {
        None => "item".to_string(),
        Some(first) if !(first.is_alphabetic() || first == '_') => {
            clean.insert(0, '_');
            clean
        }
        Some(_) => clean,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_free_id_is_kept() {
        let mut ids = IdGenerator::default();
        assert_eq!(ids.unique("font_Arial", |_| false), "font_Arial");
    }

    #[test]
    fn test_random_digits_extend_requested_id() {
        let taken: HashSet<&str> = ["font_a", "font_a0", "font_a1"].into_iter().collect();
        let mut ids = IdGenerator::new(IdStrategy::RandomDigits);
        let id = ids.unique("font_a", |c| taken.contains(c));

        assert!(id.starts_with("font_a"));
        assert!(id.len() > "font_a".len());
        assert!(id["font_a".len()..].chars().all(|c| c.is_ascii_digit()));
        assert!(!taken.contains(id.as_str()));
    }

    #[test]
    fn test_counter_strategy() {
        let taken: HashSet<&str> = ["css", "css-1"].into_iter().collect();
        let mut ids = IdGenerator::new(IdStrategy::Counter);
        assert_eq!(ids.unique("css", |c| taken.contains(c)), "css-2");
    }

    #[test]
    fn test_uuid_strategy() {
        let mut ids = IdGenerator::new(IdStrategy::Uuid);
        let id = ids.unique("css", |c| c == "css");
        assert!(id.starts_with("css-"));
        assert_eq!(id.len(), "css-".len() + 32);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("font_My Font"), "font_My_Font");
        assert_eq!(sanitize("1st"), "_1st");
        assert_eq!(sanitize(""), "item");
        assert_eq!(sanitize("a:b/c"), "a_b_c");
    }
}
