//! Keyword pass over issue summaries: urgency, sentiment, themes, categories.
//!
//! Plain vocabulary matching against `TextVocabulary`; results are exact
//! counts, not model output. Sentiment is net negative: positive hits
//! cancel negative ones before dividing by the number of summaries.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::Config;
use crate::types::{Issue, Sentiment, TextSignals, ThemeCount, UrgencyLevel};

/// Lowercase word tokens. Inner `-` and `'` are kept ("show-stopper", "doesn't").
pub fn tokenize(text: &str) -> Vec<String> {
  text
    .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '\''))
    .map(|t| t.trim_matches(|c: char| c == '-' || c == '\''))
    .filter(|t| !t.is_empty())
    .map(str::to_lowercase)
    .collect()
}

fn word_set(list: &[String]) -> HashSet<String> {
  list.iter().map(|w| w.to_lowercase()).collect()
}

/// Scan all summaries.
pub fn extract(issues: &[Issue], config: &Config) -> TextSignals {
  let vocab = &config.vocabulary;
  let urgent = word_set(&vocab.urgent);
  let negative = word_set(&vocab.negative);
  let positive = word_set(&vocab.positive);
  let stopwords = word_set(&vocab.stopwords);
  let categories: Vec<(&String, HashSet<String>)> = vocab
    .categories
    .iter()
    .map(|(name, words)| (name, word_set(words)))
    .collect();

  let mut urgent_count = 0u64;
  let mut urgent_summaries = 0u64;
  let mut negative_hits = 0i64;
  let mut positive_hits = 0i64;
  let mut frequencies: HashMap<String, u64> = HashMap::new();
  let mut category_counts: BTreeMap<String, u64> =
    vocab.categories.keys().map(|k| (k.clone(), 0)).collect();

  for issue in issues {
    let tokens = tokenize(&issue.summary);

    let hits = tokens.iter().filter(|t| urgent.contains(*t)).count() as u64;
    urgent_count += hits;
    if hits > 0 {
      urgent_summaries += 1;
    }
    negative_hits += tokens.iter().filter(|t| negative.contains(*t)).count() as i64;
    positive_hits += tokens.iter().filter(|t| positive.contains(*t)).count() as i64;

    for (name, words) in &categories {
      if tokens.iter().any(|t| words.contains(t)) {
        if let Some(count) = category_counts.get_mut(*name) {
          *count += 1;
        }
      }
    }

    for token in tokens {
      if is_theme_candidate(&token, &stopwords) {
        *frequencies.entry(token).or_insert(0) += 1;
      }
    }
  }

  let summaries = issues.len();
  let sentiment_score = if summaries == 0 {
    0.0
  } else {
    (negative_hits - positive_hits) as f64 / summaries as f64
  };
  let sentiment = if sentiment_score >= config.sentiment_threshold {
    Sentiment::Negative
  } else if sentiment_score <= -config.sentiment_threshold {
    Sentiment::Positive
  } else {
    Sentiment::Neutral
  };

  let urgency_level = if summaries == 0 {
    UrgencyLevel::Low
  } else {
    let pct = urgent_summaries as f64 * 100.0 / summaries as f64;
    if pct > 20.0 {
      UrgencyLevel::High
    } else if pct > 10.0 {
      UrgencyLevel::Medium
    } else {
      UrgencyLevel::Low
    }
  };

  let mut themes: Vec<ThemeCount> = frequencies
    .into_iter()
    .map(|(term, count)| ThemeCount { term, count })
    .collect();
  themes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
  themes.truncate(config.top_themes);

  TextSignals {
    sentiment,
    sentiment_score: (sentiment_score * 100.0).round() / 100.0,
    urgent_count,
    urgent_summaries,
    urgency_level,
    top_themes: themes,
    categories: category_counts,
  }
}

fn is_theme_candidate(token: &str, stopwords: &HashSet<String>) -> bool {
  token.chars().count() >= 3
    && !token.chars().all(|c| c.is_ascii_digit())
    && !stopwords.contains(token)
}
