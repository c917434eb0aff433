mod common;

use common::{egfr, esr1, go_er, grounder, grounder_with};
use grounder::{
    GroundQuery, GrounderBuilder, GrounderConfig, LookupKind, ScoredMatch, ScoringPath, Term,
    TermStatus,
};

fn keys(matches: &[ScoredMatch]) -> Vec<String> {
    matches.iter().map(|m| m.key().to_string()).collect()
}

fn position(matches: &[ScoredMatch], key: &str) -> usize {
    keys(matches)
        .iter()
        .position(|k| k == key)
        .unwrap_or_else(|| panic!("{key} not in {:?}", keys(matches)))
}

#[test]
fn egfr_name_ranks_above_synonym_of_other_entity() {
    let g = grounder();
    let matches = g.ground("EGFR", None, &[]);

    assert_eq!(matches[0].key(), egfr());
    assert_eq!(matches[0].url(), "https://identifiers.org/hgnc:3236");
    assert!(position(&matches, "HGNC:3236") < position(&matches, "MESH:D066246"));
    assert!(matches[0].score > matches[position(&matches, "MESH:D066246")].score);
}

#[test]
fn results_are_sorted_by_score() {
    let g = grounder();
    for text in ["EGFR", "ER", "estrogen receptor", "egfr", "kinases"] {
        let matches = g.ground(text, Some("calcium stores"), &["9606"]);
        assert!(
            matches.windows(2).all(|w| w[0].score >= w[1].score),
            "{text}: {matches:?}"
        );
        assert!(matches.iter().all(|m| (0.0..=1.0).contains(&m.score)));
    }
}

#[test]
fn unknown_and_empty_text_yield_nothing() {
    let g = grounder();
    assert!(g.ground("qwertyuiop", None, &[]).is_empty());
    assert!(g.ground("", None, &[]).is_empty());
    assert!(g.ground("   ", Some("calcium"), &["9606"]).is_empty());
    assert!(g.ground_best("qwertyuiop", None, &[]).is_none());
}

#[test]
fn grounding_is_idempotent() {
    let g = grounder();
    let first = g.ground("ER", Some("Calcium is released from the ER."), &["9606"]);
    let second = g.ground("ER", Some("Calcium is released from the ER."), &["9606"]);
    assert_eq!(first, second);
}

#[test]
fn human_preferred_over_mouse_at_equal_score() {
    let g = grounder();
    let human = g.ground("EGFR", None, &["9606"]);
    assert_eq!(human[0].key().to_string(), "UP:P00533");
    assert!(position(&human, "UP:P00533") < position(&human, "UP:Q01279"));
    assert!((human[0].score - human[position(&human, "UP:Q01279")].score).abs() < f32::EPSILON);

    let mouse = g.ground("EGFR", None, &["10090", "9606"]);
    assert_eq!(keys(&mouse)[..2], ["UP:Q01279", "UP:P00533"]);
}

#[test]
fn unknown_organism_has_no_effect() {
    let g = grounder();
    assert_eq!(g.ground("EGFR", None, &["99999"]), g.ground("EGFR", None, &[]));
}

#[test]
fn er_with_calcium_context_prefers_endoplasmic_reticulum() {
    let g = grounder();
    let matches = g.ground("ER", Some("Calcium is released from the ER."), &[]);

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].key(), go_er());
    assert_eq!(matches[0].metadata.path, ScoringPath::Disambiguated);
    let info = matches[0].metadata.disambiguation.as_ref().unwrap();
    assert_eq!(info.model, "er");
    assert!(info.probability > 0.5);
    assert!(matches[0].score > matches[1].score);
}

#[test]
fn punctuated_er_uses_model_of_its_candidates() {
    let g = grounder();
    for text in ["E.R.", "E R"] {
        let matches = g.ground(text, Some("Calcium is released from the ER lumen."), &[]);
        assert_eq!(matches.len(), 2, "{text}");
        assert_eq!(matches[0].key(), go_er(), "{text}");
        assert_eq!(matches[0].metadata.lookup, LookupKind::Squashed);
        assert!(matches.iter().all(ScoredMatch::is_disambiguated), "{text}");
        let info = matches[0].metadata.disambiguation.as_ref().unwrap();
        assert_eq!(info.model, "er");
        assert!(matches[0].score > matches[1].score);
    }

    let estrogen = g.ground("E.R.", Some("estrogen binds the receptor in breast tissue"), &[]);
    assert_eq!(estrogen[0].key(), esr1());
}

#[test]
fn er_with_estrogen_context_prefers_receptor() {
    let g = grounder();
    let matches = g.ground(
        "ER",
        Some("Tamoxifen blocks estrogen signalling through the ER in breast cancer."),
        &[],
    );
    assert_eq!(matches[0].key(), esr1());
    assert!(matches[0].is_disambiguated());
}

#[test]
fn er_without_context_is_not_disambiguated() {
    let g = grounder();
    let matches = g.ground("ER", None, &[]);
    assert_eq!(matches.len(), 2);
    for m in &matches {
        assert_eq!(m.metadata.path, ScoringPath::Lexical);
        assert!(m.metadata.disambiguation.is_none());
        assert!((m.score - m.metadata.lexical_score).abs() < f32::EPSILON);
    }
}

#[test]
fn ungrounded_sense_lowers_every_candidate() {
    let g = grounder();
    let matches = g.ground("ER", Some("Patient admitted to the emergency room"), &[]);
    for m in &matches {
        let info = m.metadata.disambiguation.as_ref().unwrap();
        assert!(info.ungrounded > 0.0);
        assert!(m.score < m.metadata.lexical_score);
    }
}

#[test]
fn context_without_model_is_ignored() {
    let g = grounder();
    let with_context = g.ground("EGFR", Some("Calcium is released from the ER."), &[]);
    let without = g.ground("EGFR", None, &[]);
    assert_eq!(with_context, without);
    assert!(with_context.iter().all(|m| !m.is_disambiguated()));
}

#[test]
fn context_beats_marginal_lexical_advantage() {
    let g = GrounderBuilder::new()
        .terms([
            Term::new("ER", "GO", "GO:0005783", "endoplasmic reticulum", TermStatus::Synonym, "go"),
            Term::new("ER", "HGNC", "3467", "ESR1", TermStatus::Name, "hgnc"),
        ])
        .model(common::er_model())
        .build()
        .unwrap();

    let lexical = g.ground("ER", None, &[]);
    assert_eq!(lexical[0].key(), esr1());

    let contextual = g.ground("ER", Some("Calcium is released from the ER."), &[]);
    assert_eq!(contextual[0].key(), go_er());
}

#[test]
fn equivalent_terms_are_merged() {
    let g = grounder();
    let matches = g.ground("ER", None, &[]);
    let receptor = &matches[position(&matches, "HGNC:3467")];
    assert_eq!(receptor.subsumed_terms.len(), 1);
    assert_eq!(receptor.subsumed_terms[0].source, "uniprot");
    assert_eq!(receptor.subsumed_terms[0].source_id.as_deref(), Some("P03372"));

    let unmerged = grounder_with(GrounderConfig {
        merge_equivalent: false,
        ..GrounderConfig::default()
    });
    let matches = unmerged.ground("ER", None, &[]);
    assert_eq!(matches.len(), 3);
    assert!(matches.iter().all(|m| m.subsumed_terms.is_empty()));
}

#[test]
fn ground_best_returns_top_match() {
    let g = grounder();
    let best = g
        .ground_best("ER", Some("Calcium is released from the ER."), &[])
        .unwrap();
    assert_eq!(best.key(), go_er());
    assert_eq!(best.url(), "https://identifiers.org/GO:0005783");
}

#[test]
fn namespace_filter_restricts_candidates() {
    let g = grounder();
    let matches = g.execute(&GroundQuery::new("EGFR").namespaces(["UP"]));
    assert_eq!(keys(&matches), ["UP:P00533", "UP:Q01279"]);

    let matches = g.execute(&GroundQuery::new("EGFR").namespaces(["CHEBI"]));
    assert!(matches.is_empty());
}

#[test]
fn approximate_lookup_reaches_variants() {
    let g = grounder();

    let plural = g.ground("kinases", None, &[]);
    assert_eq!(plural[0].key().to_string(), "GO:GO:0016301");
    assert_eq!(plural[0].metadata.lookup, LookupKind::Depluralized);

    let spaced = g.ground("endoplasmic-reticulum", None, &[]);
    assert_eq!(spaced[0].key(), go_er());
    assert_eq!(spaced[0].metadata.lookup, LookupKind::Squashed);

    let exact_only = grounder_with(GrounderConfig {
        approximate_lookup: false,
        ..GrounderConfig::default()
    });
    assert!(exact_only.ground("kinases", None, &[]).is_empty());
    assert!(exact_only.ground("endoplasmic-reticulum", None, &[]).is_empty());
}

#[test]
fn case_variants_score_below_exact() {
    let g = grounder();
    let exact = g.ground_best("EGFR", None, &[]).unwrap();
    let lower = g.ground_best("egfr", None, &[]).unwrap();
    assert_eq!(exact.key(), lower.key());
    assert!(exact.score > lower.score);
}

#[test]
fn annotate_grounds_mentions_with_sentence_context() {
    let g = grounder();
    let text = "Calcium is released from the ER when EGFR signals.";
    let annotations = g.annotate(text, &["9606"]);

    let spans: Vec<&str> = annotations.iter().map(|a| a.text.as_str()).collect();
    assert_eq!(spans, ["ER", "EGFR"]);
    assert_eq!(&text[annotations[0].start..annotations[0].end], "ER");
    assert_eq!(annotations[0].matches[0].key(), go_er());
    assert_eq!(annotations[1].matches[0].key().to_string(), "UP:P00533");
}
