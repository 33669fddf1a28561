//! Multi-pattern search over symbol sequences.
//!
//! Classic Aho-Corasick automaton: a keyword trie (goto function), failure links
//! computed breadth-first, and output sets that include the outputs reachable
//! through failure links.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

const ROOT: usize = 0;

#[derive(Clone, Debug)]
struct State<T> {
    goto: HashMap<T, usize>,
    failure: usize,
    /// Indices into `AhoCorasick::keywords`.
    output: Vec<usize>,
}

impl<T> Default for State<T> {
    fn default() -> Self {
        Self {
            goto: HashMap::new(),
            failure: ROOT,
            output: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AhoCorasick<T> {
    keywords: Vec<Vec<T>>,
    states: Vec<State<T>>,
}

impl<T: Eq + Hash + Clone> AhoCorasick<T> {
    /// Builds the automaton. Empty keywords can never be reported and are ignored.
    pub fn new<K>(keywords: impl IntoIterator<Item = K>) -> Self
    where
        K: Into<Vec<T>>,
    {
        let keywords: Vec<Vec<T>> = keywords
            .into_iter()
            .map(Into::into)
            .filter(|keyword: &Vec<T>| !keyword.is_empty())
            .collect();

        let mut states = vec![State::default()];

        for (index, keyword) in keywords.iter().enumerate() {
            let mut current = ROOT;
            for letter in keyword {
                current = match states[current].goto.get(letter) {
                    Some(&next) => next,
                    None => {
                        let next = states.len();
                        states.push(State::default());
                        states[current].goto.insert(letter.clone(), next);
                        next
                    }
                };
            }
            states[current].output.push(index);
        }

        let mut automaton = Self { keywords, states };
        automaton.build_failure_links();
        automaton
    }

    fn build_failure_links(&mut self) {
        let mut queue: VecDeque<usize> = self.states[ROOT].goto.values().copied().collect();

        while let Some(r) = queue.pop_front() {
            let transitions: Vec<(T, usize)> = self.states[r]
                .goto
                .iter()
                .map(|(letter, &s)| (letter.clone(), s))
                .collect();

            for (letter, s) in transitions {
                queue.push_back(s);

                let mut state = self.states[r].failure;
                while state != ROOT && !self.states[state].goto.contains_key(&letter) {
                    state = self.states[state].failure;
                }

                let failure = self.states[state]
                    .goto
                    .get(&letter)
                    .copied()
                    .unwrap_or(ROOT);

                self.states[s].failure = failure;
                let inherited = self.states[failure].output.clone();
                self.states[s].output.extend(inherited);
            }
        }
    }

    pub fn keywords(&self) -> &[Vec<T>] {
        &self.keywords
    }

    /// Lazily reports, for every input position at which at least one keyword
    /// ends, that position together with all keywords ending there.
    pub fn search<'a>(&'a self, input: &'a [T]) -> Search<'a, T> {
        Search {
            automaton: self,
            input,
            position: 0,
            state: ROOT,
        }
    }

    fn step(&self, mut state: usize, letter: &T) -> usize {
        loop {
            if let Some(&next) = self.states[state].goto.get(letter) {
                return next;
            }
            if state == ROOT {
                return ROOT;
            }
            state = self.states[state].failure;
        }
    }
}

pub struct Search<'a, T> {
    automaton: &'a AhoCorasick<T>,
    input: &'a [T],
    position: usize,
    state: usize,
}

impl<'a, T: Eq + Hash + Clone> Iterator for Search<'a, T> {
    type Item = (usize, Vec<&'a [T]>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(letter) = self.input.get(self.position) {
            let end = self.position;
            self.position += 1;
            self.state = self.automaton.step(self.state, letter);

            let output = &self.automaton.states[self.state].output;
            if !output.is_empty() {
                let found = output
                    .iter()
                    .map(|&index| self.automaton.keywords[index].as_slice())
                    .collect();
                return Some((end, found));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::AhoCorasick;

    fn all_matches(input: &[&str], keywords: &[&[&str]]) -> Vec<(usize, Vec<Vec<String>>)> {
        let keywords: Vec<Vec<String>> = keywords
            .iter()
            .map(|k| k.iter().map(|s| s.to_string()).collect())
            .collect();
        let input: Vec<String> = input.iter().map(|s| s.to_string()).collect();

        let automaton = AhoCorasick::new(keywords);
        automaton
            .search(&input)
            .map(|(end, found)| (end, found.into_iter().map(|k| k.to_vec()).collect()))
            .collect()
    }

    #[test]
    fn single_symbol() {
        let matches = all_matches(&["a"], &[&["a"]]);
        assert_eq!(matches, vec![(0, vec![vec![String::from("a")]])]);
    }

    #[test]
    fn no_match() {
        assert!(all_matches(&["a"], &[&["b"]]).is_empty());
        assert!(all_matches(&["a"], &[&[""]]).is_empty());
        assert!(all_matches(&[""], &[&["a"]]).is_empty());
    }

    #[test]
    fn empty_keywords_or_input() {
        assert!(all_matches(&["a"], &[&[]]).is_empty());
        assert!(all_matches(&["a"], &[]).is_empty());
        assert!(all_matches(&[], &[&["a"]]).is_empty());
        assert!(all_matches(&[], &[]).is_empty());
    }

    #[test]
    fn empty_keywords_are_dropped() {
        let automaton = AhoCorasick::new([vec![1, 2], vec![], vec![3]]);
        assert_eq!(automaton.keywords(), [vec![1, 2], vec![3]]);
    }

    #[test]
    fn reports_end_position() {
        let matches = all_matches(&["a", "b", "c"], &[&["a"]]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0, 0);

        let matches = all_matches(&["a", "b", "c"], &[&["a", "b"]]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0, 1);
        assert_eq!(matches[0].1, vec![vec!["a", "b"]]);
    }

    #[test]
    fn outputs_follow_failure_links() {
        // "he" is a suffix of "she", both end at position 2
        let matches = all_matches(
            &["s", "h", "e", "r", "s"],
            &[&["h", "e"], &["s", "h", "e"], &["h", "e", "r", "s"]],
        );
        let at_2: Vec<_> = matches.iter().filter(|(end, _)| *end == 2).collect();
        assert_eq!(at_2.len(), 1);
        assert_eq!(at_2[0].1.len(), 2);
        assert!(at_2[0].1.contains(&vec![String::from("h"), String::from("e")]));
        assert!(at_2[0].1.contains(&vec![String::from("s"), String::from("h"), String::from("e")]));

        assert!(matches.iter().any(|(end, found)| *end == 4 && found.len() == 1));
    }

    #[test]
    fn overlapping_occurrences() {
        let matches = all_matches(&["+", "+", "+"], &[&["+", "+"]]);
        let ends: Vec<_> = matches.iter().map(|(end, _)| *end).collect();
        assert_eq!(ends, [1, 2]);
    }
}
