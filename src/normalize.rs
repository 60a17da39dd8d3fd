//! Conversion of decoded API payloads into the flat view model

use crate::error::AlKetabError;
use crate::models::*;

/// Decode a response body and normalize it.
///
/// Fails with `Parsing` when the body does not match the expected schema,
/// `Api` when the server reports `success: false`, and `NoResults` when the
/// search carries no verses.
pub fn decode_page(body: &[u8]) -> Result<NormalizedPage, AlKetabError> {
    let response: RawApiResponse =
        serde_json::from_slice(body).map_err(|e| AlKetabError::Parsing(e.to_string()))?;

    if !response.success {
        let message = response
            .ai
            .and_then(|ai| ai.explain)
            .filter(|explain| !explain.is_empty())
            .unwrap_or_else(|| "Search failed".to_string());
        return Err(AlKetabError::Api { code: 0, message });
    }

    normalize_response(response).ok_or(AlKetabError::NoResults)
}

/// Build a page from a successful response. Returns `None` if there are no
/// verse entries at all.
pub fn normalize_response(response: RawApiResponse) -> Option<NormalizedPage> {
    let search = response.search?;
    let ayas = search.ayas.filter(|ayas| !ayas.is_empty())?;

    let verses = order_by_key(ayas)
        .into_iter()
        .filter_map(normalize_verse)
        .collect();

    let pagination = search
        .interval
        .map(|interval| {
            let defaults = Pagination::default();
            Pagination {
                current_page: interval.page.unwrap_or(defaults.current_page),
                total_pages: interval.nb_pages.unwrap_or(defaults.total_pages),
                total_results: interval.total.unwrap_or(defaults.total_results),
                start_index: interval.start.unwrap_or(defaults.start_index),
                end_index: interval.end.unwrap_or(defaults.end_index),
            }
        })
        .unwrap_or_default();

    let ai = response.ai;
    let sort_order = SortOrder::from_wire(ai.as_ref().and_then(|ai| ai.sort_by.as_deref()));
    let (ai_explanation, continuation_token, query_info) = match ai {
        Some(ai) => (
            ai.explain,
            ai.generated_query,
            QueryInfo {
                user_query: ai.user_query,
                language: ai.query_language,
                proofread: ai.proofread_user_query,
                ai_timing_ms: ai.ai_timing_ms,
            },
        ),
        None => (None, None, QueryInfo::default()),
    };

    Some(NormalizedPage {
        verses,
        pagination,
        runtime: search.runtime.unwrap_or(0.0),
        word_stats: search.words.map(normalize_words),
        ai_explanation,
        continuation_token,
        sort_order,
        query_info,
    })
}

/// Order verse entries by their numeric key. Keys that are not integers
/// sort as 0; entries sharing a position keep every member.
fn order_by_key<T>(entries: impl IntoIterator<Item = (String, T)>) -> Vec<T> {
    let mut keyed: Vec<(i64, String, T)> = entries
        .into_iter()
        .map(|(key, entry)| {
            let index = key.trim().parse::<i64>().unwrap_or_else(|_| {
                tracing::debug!(key = %key, "non-numeric verse key sorts as 0");
                0
            });
            (index, key, entry)
        })
        .collect();
    // The raw key breaks ties so the result does not depend on map iteration order.
    keyed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    keyed.into_iter().map(|(_, _, entry)| entry).collect()
}

/// Entries without their `aya` or `identifier` group are skipped.
fn normalize_verse(entry: RawAyaEntry) -> Option<NormalizedVerse> {
    let (aya, identifier) = match (entry.aya, entry.identifier) {
        (Some(aya), Some(identifier)) => (aya, identifier),
        _ => {
            tracing::debug!("skipping verse entry without aya/identifier");
            return None;
        }
    };

    let (prev_verse_id, prev_verse_text) = split_adjacent(aya.prev_aya);
    let (next_verse_id, next_verse_text) = split_adjacent(aya.next_aya);

    Some(NormalizedVerse {
        id: identifier.gid.unwrap_or(0),
        text_plain: aya.text_no_highlight.unwrap_or_default(),
        text_highlighted: aya.text.unwrap_or_default(),
        surah_id: identifier.sura_id.unwrap_or(0),
        surah_name_local: identifier.sura_arabic_name.unwrap_or_default(),
        surah_name_alt: identifier.sura_name.unwrap_or_default(),
        verse_number: identifier.aya_id.unwrap_or(0),
        page_number: entry.position.as_ref().and_then(|p| p.page).unwrap_or(0),
        juz: entry.position.and_then(|p| p.juz),
        has_sajda: entry.sajda.and_then(|s| s.exist).unwrap_or(false),
        theme: entry.theme,
        translation: aya.translation,
        recitation_url: aya.recitation,
        prev_verse_text,
        next_verse_text,
        prev_verse_id,
        next_verse_id,
    })
}

fn split_adjacent(adjacent: Option<RawAdjacentAya>) -> (Option<i64>, Option<String>) {
    match adjacent {
        Some(a) => (a.id, a.text),
        None => (None, None),
    }
}

fn normalize_words(words: RawWords) -> WordStats {
    let totals = words
        .global
        .map(|g| WordTotals {
            match_count: g.nb_matches.unwrap_or(0),
            word_count: g.nb_words.unwrap_or(0),
            vocalization_count: g.nb_vocalizations.unwrap_or(0),
        })
        .unwrap_or_default();

    let by_rank = words
        .individual
        .unwrap_or_default()
        .into_iter()
        .map(|(rank, w)| {
            let entry = WordEntry {
                word: w.word.unwrap_or_default(),
                romanization: w.romanization,
                lemma: w.lemma,
                root: w.root,
                match_count: w.nb_matches.unwrap_or(0),
                verse_count: w.nb_ayas.unwrap_or(0),
                vocalization_count: w.nb_vocalizations.unwrap_or(0),
                vocalizations: w.vocalizations.unwrap_or_default(),
                synonym_count: w.nb_synonyms.unwrap_or(0),
                synonyms: w.synonyms.unwrap_or_default(),
                derivation_count: w.nb_derivations.unwrap_or(0),
                derivations: w.derivations.unwrap_or_default(),
                extra_derivation_count: w.nb_derivations_extra.unwrap_or(0),
                extra_derivations: w.derivations_extra.unwrap_or_default(),
            };
            (rank, entry)
        })
        .collect();

    WordStats { totals, by_rank }
}
