//! Wire types for the AlKetab search API and the normalized view model

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

// ============ Sort Order ============

/// Result ordering understood by the API. Each variant maps to a fixed wire token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOrder {
    #[serde(rename = "score")]
    Relevance,
    /// Canonical order, as the verses are printed.
    #[default]
    #[serde(rename = "mushaf")]
    Mushaf,
    #[serde(rename = "tanzil")]
    Revelation,
    #[serde(rename = "alphabet")]
    Alphabetical,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::Relevance,
        SortOrder::Mushaf,
        SortOrder::Revelation,
        SortOrder::Alphabetical,
    ];

    pub fn wire_token(&self) -> &'static str {
        match self {
            SortOrder::Relevance => "score",
            SortOrder::Mushaf => "mushaf",
            SortOrder::Revelation => "tanzil",
            SortOrder::Alphabetical => "alphabet",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOrder::Relevance => "Relevance",
            SortOrder::Mushaf => "Mushaf Order",
            SortOrder::Revelation => "Revelation Order",
            SortOrder::Alphabetical => "Alphabetical",
        }
    }

    /// Lenient conversion used for server-suggested values: missing or
    /// unknown tokens fall back to mushaf order.
    pub fn from_wire(token: Option<&str>) -> Self {
        token.and_then(|t| t.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|order| order.wire_token() == s)
            .ok_or_else(|| format!("unknown sort order '{}' (expected score, mushaf, tanzil or alphabet)", s))
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_token())
    }
}

// ============ Raw API Response ============

/// Top-level response body. `search` is only present when `success` is true.
#[derive(Debug, Clone, Deserialize)]
pub struct RawApiResponse {
    pub success: bool,
    pub search: Option<RawSearch>,
    pub ai: Option<RawAiMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAiMeta {
    pub explain: Option<String>,
    /// Opaque continuation token; must be echoed back verbatim for later pages.
    pub generated_query: Option<String>,
    pub sort_by: Option<String>,
    pub user_query: Option<String>,
    pub query_language: Option<String>,
    pub proofread_user_query: Option<String>,
    pub ai_timing_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSearch {
    /// Keyed by positional index rendered as a string. Map order carries no meaning.
    pub ayas: Option<HashMap<String, RawAyaEntry>>,
    pub interval: Option<RawInterval>,
    pub runtime: Option<f64>,
    pub words: Option<RawWords>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInterval {
    pub start: Option<u32>,
    pub end: Option<u32>,
    pub page: Option<u32>,
    pub nb_pages: Option<u32>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAyaEntry {
    pub aya: Option<RawAya>,
    pub identifier: Option<RawIdentifier>,
    pub position: Option<RawPosition>,
    pub sura: Option<RawSura>,
    pub theme: Option<Theme>,
    pub sajda: Option<RawSajda>,
    pub stat: Option<RawStat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAya {
    pub id: Option<i64>,
    /// Text with inline highlight markup
    pub text: Option<String>,
    pub text_no_highlight: Option<String>,
    pub recitation: Option<String>,
    pub translation: Option<String>,
    pub next_aya: Option<RawAdjacentAya>,
    pub prev_aya: Option<RawAdjacentAya>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAdjacentAya {
    pub id: Option<i64>,
    pub sura: Option<String>,
    pub sura_arabic: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawIdentifier {
    pub gid: Option<i64>,
    pub aya_id: Option<i64>,
    pub sura_id: Option<i64>,
    pub sura_name: Option<String>,
    pub sura_arabic_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPosition {
    pub page: Option<i64>,
    #[serde(rename = "page_IN")]
    pub page_in: Option<i64>,
    pub juz: Option<i64>,
    pub hizb: Option<i64>,
    pub rub: Option<i64>,
    pub manzil: Option<i64>,
    pub ruku: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSura {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub arabic_name: Option<String>,
    pub english_name: Option<String>,
    #[serde(rename = "type")]
    pub sura_type: Option<String>,
    pub arabic_type: Option<String>,
    pub ayas: Option<i64>,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub chapter: Option<String>,
    pub topic: Option<String>,
    pub subtopic: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSajda {
    pub exist: Option<bool>,
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub sajda_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStat {
    pub letters: Option<i64>,
    pub words: Option<i64>,
    pub godnames: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawWords {
    /// Keyed by 1-based rank
    pub individual: Option<BTreeMap<u32, RawWordEntry>>,
    pub global: Option<RawWordTotals>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawWordTotals {
    pub nb_matches: Option<u64>,
    pub nb_words: Option<u64>,
    pub nb_vocalizations: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawWordEntry {
    pub word: Option<String>,
    pub romanization: Option<String>,
    pub lemma: Option<String>,
    pub root: Option<String>,
    pub nb_matches: Option<u64>,
    pub nb_ayas: Option<u64>,
    pub nb_vocalizations: Option<u64>,
    pub vocalizations: Option<Vec<String>>,
    pub nb_synonyms: Option<u64>,
    pub synonyms: Option<Vec<String>>,
    pub nb_derivations: Option<u64>,
    pub derivations: Option<Vec<String>>,
    pub nb_derivations_extra: Option<u64>,
    pub derivations_extra: Option<Vec<String>>,
}

// ============ Normalized Model ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedVerse {
    /// Global verse id, unique across the whole book
    pub id: i64,
    pub text_plain: String,
    pub text_highlighted: String,
    pub surah_id: i64,
    /// Arabic surah name
    pub surah_name_local: String,
    /// Transliterated surah name
    pub surah_name_alt: String,
    /// Verse number within its surah
    pub verse_number: i64,
    pub page_number: i64,
    pub juz: Option<i64>,
    pub has_sajda: bool,
    pub theme: Option<Theme>,
    pub translation: Option<String>,
    pub recitation_url: Option<String>,
    pub prev_verse_text: Option<String>,
    pub next_verse_text: Option<String>,
    pub prev_verse_id: Option<i64>,
    pub next_verse_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub start_index: u32,
    pub end_index: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_results: 0,
            start_index: 1,
            end_index: 1,
        }
    }
}

/// How the server interpreted the natural-language query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryInfo {
    pub user_query: Option<String>,
    pub language: Option<String>,
    pub proofread: Option<String>,
    pub ai_timing_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPage {
    pub verses: Vec<NormalizedVerse>,
    pub pagination: Pagination,
    /// Server processing time in seconds
    pub runtime: f64,
    pub word_stats: Option<WordStats>,
    pub ai_explanation: Option<String>,
    pub continuation_token: Option<String>,
    pub sort_order: SortOrder,
    pub query_info: QueryInfo,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTotals {
    pub match_count: u64,
    pub word_count: u64,
    pub vocalization_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    pub romanization: Option<String>,
    pub lemma: Option<String>,
    pub root: Option<String>,
    pub match_count: u64,
    pub verse_count: u64,
    pub vocalization_count: u64,
    pub vocalizations: Vec<String>,
    pub synonym_count: u64,
    pub synonyms: Vec<String>,
    pub derivation_count: u64,
    pub derivations: Vec<String>,
    pub extra_derivation_count: u64,
    pub extra_derivations: Vec<String>,
}

/// Per-query word statistics. Ranks are assigned by the server (1 = most
/// significant) and are never re-sorted on the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordStats {
    pub totals: WordTotals,
    pub by_rank: BTreeMap<u32, WordEntry>,
}

impl WordStats {
    /// Entries in server rank order, rank 1 first.
    pub fn ranked(&self) -> impl Iterator<Item = (u32, &WordEntry)> {
        self.by_rank.iter().map(|(rank, entry)| (*rank, entry))
    }

    pub fn top(&self, n: usize) -> Vec<(u32, &WordEntry)> {
        self.ranked().take(n).collect()
    }
}
