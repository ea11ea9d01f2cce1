// Tokenization and term normalization. Text is split by whitespace and each
// token stripped of non-alphanumeric characters; the Normalizer then runs
// stopword removal, accent folding and stemming on top of that.

pub mod stemmer;

use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub struct Token<'a> {
    text: &'a str,
}

impl<'a> Token<'a> {
    pub fn new(text: &'a str) -> Token<'a> {
        Token { text }
    }

    /// Lowercases the token and drops every non-alphanumeric character.
    pub fn clean(&self) -> String {
        self.text
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect()
    }
}

pub fn tokenize(input_str: &str) -> Vec<Token> {
    input_str.split_whitespace().map(Token::new).collect()
}

/// Portuguese stopwords. Checked against terms as written (after
/// lowercasing, before accent folding), so accented spellings are listed.
const STOPWORDS: &[&str] = &[
    "a", "à", "ao", "aos", "aquela", "aquelas", "aquele", "aqueles", "aquilo", "as", "até", "com",
    "como", "da", "das", "de", "dela", "delas", "dele", "deles", "depois", "do", "dos", "e", "é",
    "ela", "elas", "ele", "eles", "em", "entre", "era", "eram", "essa", "essas", "esse", "esses",
    "esta", "estas", "este", "estes", "eu", "foi", "foram", "há", "isso", "isto", "já", "lhe",
    "lhes", "mais", "mas", "me", "mesmo", "meu", "minha", "muito", "na", "nas", "não", "nem",
    "no", "nos", "nós", "num", "numa", "o", "os", "ou", "para", "pela", "pelas", "pelo", "pelos",
    "por", "quando", "que", "quem", "se", "sem", "ser", "seu", "seus", "só", "sua", "suas",
    "também", "te", "tem", "um", "uma", "você", "vocês",
];

// Folds the accented vowels and cedilla to their base letters. Input is
// already lowercased.
fn fold_accents(term: &str) -> String {
    term.chars()
        .map(|c| match c {
            'á' | 'â' | 'ã' => 'a',
            'é' | 'ê' | 'ẽ' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Per-term pipeline applied on top of `Token::clean`: stopword removal,
/// accent folding, then stemming, each individually switchable. Stopwords
/// are matched before folding, against the spelling as written.
#[derive(Debug, Clone)]
pub struct Normalizer {
    stopwords: HashSet<String>,
    remove_stopwords: bool,
    remove_accents: bool,
    stem: bool,
}

impl Normalizer {
    pub fn new(remove_stopwords: bool, remove_accents: bool, stem: bool) -> Self {
        Normalizer {
            stopwords: STOPWORDS.iter().map(|s| s.to_string()).collect(),
            remove_stopwords,
            remove_accents,
            stem,
        }
    }

    /// Swaps the embedded stopword list for one loaded from `path`, one
    /// word per line.
    pub fn with_stopwords_file(mut self, path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading stopwords from {}", path.display()))?;
        self.stopwords = contents
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Ok(self)
    }

    /// Runs one token through the pipeline. `None` means the term is
    /// dropped, either as a stopword or because nothing survived cleaning.
    pub fn normalize(&self, token: &Token) -> Option<String> {
        let term = token.clean();
        if term.is_empty() {
            return None;
        }
        if self.remove_stopwords && self.stopwords.contains(&term) {
            return None;
        }

        let term = if self.remove_accents {
            fold_accents(&term)
        } else {
            term
        };
        let term = if self.stem { stemmer::stem(&term) } else { term };
        Some(term)
    }

    /// Tokenizes `text` and aggregates the frequency of each normalized
    /// term, keeping terms in first-encounter order.
    pub fn term_frequencies(&self, text: &str) -> Vec<(String, u32)> {
        let mut frequencies: Vec<(String, u32)> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for token in tokenize(text) {
            if let Some(term) = self.normalize(&token) {
                match positions.get(&term) {
                    Some(&at) => frequencies[at].1 += 1,
                    None => {
                        positions.insert(term.clone(), frequencies.len());
                        frequencies.push((term, 1));
                    }
                }
            }
        }

        frequencies
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::new(true, true, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn clean_strips_punctuation_and_case() {
        assert_eq!(Token::new("Casa,").clean(), "casa");
        assert_eq!(Token::new("(verde)").clean(), "verde");
        assert_eq!(Token::new("...").clean(), "");
    }

    #[test]
    fn accents_fold_to_base_letters() {
        assert_eq!(fold_accents("questão"), "questao");
        assert_eq!(fold_accents("coração"), "coracao");
        // The grave accent is outside the folding table.
        assert_eq!(fold_accents("às"), "às");
    }

    #[test]
    fn stopwords_are_matched_before_folding() {
        let normalizer = Normalizer::new(true, true, false);
        assert_eq!(normalizer.normalize(&Token::new("não")), None);
        assert_eq!(normalizer.normalize(&Token::new("É")), None);
        assert_eq!(
            normalizer.normalize(&Token::new("nó")),
            Some("no".to_string())
        );
    }

    #[test]
    fn disabled_stages_pass_terms_through() {
        let normalizer = Normalizer::new(false, false, false);
        assert_eq!(
            normalizer.normalize(&Token::new("Questão!")),
            Some("questão".to_string())
        );
    }

    #[test]
    fn frequencies_keep_first_encounter_order() {
        let normalizer = Normalizer::default();
        let freqs = normalizer.term_frequencies("A casa verde e a casa azul");
        assert_eq!(
            freqs,
            vec![
                ("cas".to_string(), 2),
                ("verd".to_string(), 1),
                ("azul".to_string(), 1),
            ]
        );
    }

    #[test]
    fn stopword_file_overrides_the_embedded_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "verde\n").unwrap();
        file.flush().unwrap();

        let normalizer = Normalizer::new(true, true, false)
            .with_stopwords_file(file.path())
            .unwrap();
        assert_eq!(normalizer.normalize(&Token::new("verde")), None);
        // "que" is only in the embedded list, which was replaced.
        assert!(normalizer.normalize(&Token::new("que")).is_some());
    }
}
