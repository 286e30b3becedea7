use chrono::NaiveDate;
use rxlabel_map::{DrugSearchIndex, Icd10Index, IndicationMatcher, Reconciler, SynonymExpander};
use rxlabel_model::{
    EngineOptions, Icd10Entry, IndexError, LabelRecord, MatcherOptions, ResolveError,
    SearchOptions, SelectionPolicy, SynonymEntry,
};

fn icd10_table() -> Vec<Icd10Entry> {
    vec![
        Icd10Entry::new("I50.9", "Heart failure, unspecified", "Heart failure"),
        Icd10Entry::new("I10", "Essential (primary) hypertension", "Hypertensive diseases"),
        Icd10Entry::new(
            "I11.0",
            "Hypertensive heart disease with heart failure",
            "Hypertensive heart disease",
        ),
        Icd10Entry::new("N18.9", "Chronic kidney disease, unspecified", "Chronic kidney disease"),
        Icd10Entry::new(
            "E11.9",
            "Type 2 diabetes mellitus without complications",
            "Type 2 diabetes mellitus",
        ),
        Icd10Entry::new("R51.9", "Headache, unspecified", "Headache"),
    ]
}

fn corpus() -> Vec<LabelRecord> {
    vec![
        LabelRecord::new("Carvedilol", "carv-1")
            .with_indication(
                "Carvedilol tablets are indicated for the treatment of mild to severe chronic heart failure.",
            )
            .with_directions("Take with food.")
            .with_manufacturer("Acme Pharma"),
        LabelRecord::new("Lisinopril", "lis-1").with_indication("Treatment of hypertension."),
        LabelRecord::new("Metformin Hydrochloride", "met-1")
            .with_indication("Adjunct to diet and exercise in adults with type 2 diabetes mellitus."),
        LabelRecord::new("Saline Flush", "sal-1"),
    ]
}

fn reconciler(options: EngineOptions) -> Reconciler {
    Reconciler::build(corpus(), icd10_table(), &[], options).expect("build reconciler")
}

#[test]
fn carvedilol_resolves_to_heart_failure() {
    let engine = reconciler(EngineOptions::default());
    let resolved = engine.resolve("carvedilol").expect("resolve carvedilol");

    assert_eq!(resolved.name, "Carvedilol");
    assert_eq!(resolved.source_id, "carv-1");
    assert_eq!(resolved.manufacturer.as_deref(), Some("Acme Pharma"));
    assert_eq!(resolved.directions.as_deref(), Some("Take with food."));
    assert_eq!(resolved.search_score, 1.0);

    let top = resolved.top_match().expect("at least one match");
    assert_eq!(top.code(), "I50.9");
    assert!(top.score > 0.0);
    assert!(top.matched_on.contains("heart failure"));
}

#[test]
fn unknown_drug_is_not_found() {
    let engine = reconciler(EngineOptions::default());
    let err = engine.resolve("nonexistentdrug123").unwrap_err();
    assert_eq!(
        err,
        ResolveError::NotFound {
            query: "nonexistentdrug123".to_string()
        }
    );
    assert!(err.is_not_found());
}

#[test]
fn blank_query_is_empty_input() {
    let engine = reconciler(EngineOptions::default());
    assert_eq!(engine.resolve("   ").unwrap_err(), ResolveError::EmptyInput);
    assert_eq!(engine.resolve("").unwrap_err(), ResolveError::EmptyInput);
}

#[test]
fn label_without_indication_has_no_matches() {
    let engine = reconciler(EngineOptions::default());
    let resolved = engine.resolve("saline flush").expect("resolve saline");
    assert_eq!(resolved.indication, None);
    assert!(resolved.icd10_matches.is_empty());
}

#[test]
fn fuzzy_query_selects_closest_label() {
    let engine = reconciler(EngineOptions::default());
    let resolved = engine.resolve("metformin").expect("resolve metformin");
    assert_eq!(resolved.source_id, "met-1");
    assert!(resolved.search_score < 1.0);
    assert_eq!(resolved.top_match().map(|m| m.code()), Some("E11.9"));
}

#[test]
fn resolve_is_deterministic() {
    let engine = reconciler(EngineOptions::default());
    let first = engine.resolve("Carvedilol").expect("first");
    let second = engine.resolve("CARVEDILOL!").expect("second");
    assert_eq!(first, second);
}

#[test]
fn matches_are_ordered_and_bounded() {
    let options = EngineOptions {
        matcher: MatcherOptions::default().with_max_results(3),
        ..EngineOptions::default()
    };
    let engine = reconciler(options);
    let matches = engine.match_indication(
        "hypertension with heart failure, chronic kidney disease and headache",
    );
    assert_eq!(matches.len(), 3);
    for pair in matches.windows(2) {
        let ordered = pair[0].score > pair[1].score
            || (pair[0].score == pair[1].score && pair[0].code() < pair[1].code());
        assert!(ordered, "{:?} before {:?}", pair[0].code(), pair[1].code());
    }
}

#[test]
fn synonym_match_scores_within_synonym_factor() {
    let index = Icd10Index::build(icd10_table()).expect("index");
    let expander = SynonymExpander::build(&[SynonymEntry::new(
        "hypertension",
        ["high blood pressure", "HTN"],
    )])
    .expect("synonyms");
    let matcher = IndicationMatcher::default();

    let direct = matcher.match_indication("treatment of hypertension", &index, &expander);
    let via_synonym =
        matcher.match_indication("treatment of high blood pressure", &index, &expander);

    let direct_i10 = direct.iter().find(|m| m.code() == "I10").expect("direct I10");
    let synonym_i10 = via_synonym
        .iter()
        .find(|m| m.code() == "I10")
        .expect("synonym I10");

    assert!(!direct_i10.via_synonym);
    assert!(synonym_i10.via_synonym);
    assert_eq!(synonym_i10.matched_on, "hypertension");
    let factor = matcher.options().weights.synonym_factor;
    assert!(synonym_i10.score >= direct_i10.score * factor - 1e-9);
    assert!(synonym_i10.score <= direct_i10.score);
}

#[test]
fn label_wording_outranks_synonym_on_same_code() {
    let records = vec![
        LabelRecord::new("Amlodipine", "aml-1")
            .with_indication("Amlodipine is indicated for the treatment of hypertension."),
    ];
    let entries = vec![Icd10Entry::new(
        "I10",
        "Hypertension (high blood pressure)",
        "Hypertensive diseases",
    )];
    let synonyms = [SynonymEntry::new("hypertension", ["high blood pressure"])];
    let engine = Reconciler::build(records, entries, &synonyms, EngineOptions::default())
        .expect("build reconciler");

    let resolved = engine.resolve("amlodipine").expect("resolve amlodipine");
    let top = resolved.top_match().expect("I10 match");
    assert_eq!(top.code(), "I10");
    assert!(!top.via_synonym);
    assert_eq!(top.phrase, "hypertension");
    assert_eq!(top.matched_on, "hypertension");
}

#[test]
fn exact_description_survives_a_small_candidate_limit() {
    let mut entries: Vec<Icd10Entry> = (0..10)
        .map(|i| Icd10Entry::new(format!("A0{i}.1"), format!("Migraine with aura type {i}"), ""))
        .collect();
    entries.push(Icd10Entry::new("G43.9", "Migraine, unspecified", "Migraine"));
    entries.push(Icd10Entry::new("G44.1", "Migraine", "Migraine"));
    let records = vec![
        LabelRecord::new("Sumatriptan", "sum-1").with_indication("Acute treatment of migraine."),
    ];
    let options = EngineOptions {
        matcher: MatcherOptions {
            candidate_limit: 3,
            ..MatcherOptions::default()
        },
        ..EngineOptions::default()
    };
    let engine = Reconciler::build(records, entries, &[], options).expect("build reconciler");

    let resolved = engine.resolve("sumatriptan").expect("resolve sumatriptan");
    let codes: Vec<&str> = resolved.icd10_matches.iter().map(|m| m.code()).collect();
    assert_eq!(codes[..2], ["G44.1", "G43.9"]);
    assert_eq!(resolved.icd10_matches[0].score, 1.0);
    assert!(resolved.icd10_matches.len() <= 3);
}

#[test]
fn most_recent_policy_picks_latest_variant() {
    let records = vec![
        LabelRecord::new("Carvedilol", "a-old")
            .with_manufacturer("Acme Pharma")
            .with_published(NaiveDate::from_ymd_opt(2019, 5, 1).expect("date"))
            .with_indication("heart failure"),
        LabelRecord::new("Carvedilol", "b-new")
            .with_manufacturer("Bolt Generics")
            .with_published(NaiveDate::from_ymd_opt(2024, 2, 9).expect("date"))
            .with_indication("hypertension"),
        LabelRecord::new("Carvedilol", "c-undated").with_manufacturer("Corner Labs"),
    ];

    let top_score = Reconciler::build(records.clone(), icd10_table(), &[], EngineOptions::default())
        .expect("build");
    assert_eq!(top_score.resolve("carvedilol").expect("resolve").source_id, "a-old");

    let options = EngineOptions {
        search: SearchOptions {
            selection: SelectionPolicy::MostRecent,
            ..SearchOptions::default()
        },
        ..EngineOptions::default()
    };
    let most_recent = Reconciler::build(records, icd10_table(), &[], options).expect("build");
    let resolved = most_recent.resolve("carvedilol").expect("resolve");
    assert_eq!(resolved.source_id, "b-new");
    assert_eq!(resolved.manufacturer.as_deref(), Some("Bolt Generics"));
    assert_eq!(resolved.top_match().map(|m| m.code()), Some("I10"));
}

#[test]
fn search_and_list_all() {
    let engine = reconciler(EngineOptions::default());
    assert_eq!(engine.list_all().len(), 4);
    assert_eq!(engine.list_all()[0].drug_name, "Carvedilol");

    let hits = engine.search("lisinopril", 5);
    assert_eq!(hits[0].record.source_id, "lis-1");
    assert_eq!(hits[0].score, 1.0);
}

#[test]
fn empty_corpus_finds_nothing() {
    let engine =
        Reconciler::build(Vec::new(), icd10_table(), &[], EngineOptions::default()).expect("build");
    assert!(engine.search("carvedilol", 5).is_empty());
    assert!(engine.list_all().is_empty());
    assert!(engine.resolve("carvedilol").unwrap_err().is_not_found());
}

#[test]
fn build_rejects_bad_inputs() {
    let bad_code = vec![Icd10Entry::new("X", "Nonsense", "")];
    let err = Reconciler::build(corpus(), bad_code, &[], EngineOptions::default()).unwrap_err();
    assert_eq!(
        err,
        IndexError::InvalidCode {
            code: "X".to_string()
        }
    );

    let unnamed = vec![LabelRecord::new("", "blank-1")];
    let err = DrugSearchIndex::build(unnamed).unwrap_err();
    assert!(matches!(err, IndexError::MissingDrugName { position: 0, .. }));

    let synonyms = [SynonymEntry::new("", ["anything"])];
    let err =
        Reconciler::build(corpus(), icd10_table(), &synonyms, EngineOptions::default()).unwrap_err();
    assert_eq!(err, IndexError::EmptySynonymTerm);
}

#[test]
fn reconciler_is_shared_across_threads() {
    let engine = std::sync::Arc::new(reconciler(EngineOptions::default()));
    let handles: Vec<_> = ["carvedilol", "lisinopril"]
        .into_iter()
        .map(|query| {
            let engine = std::sync::Arc::clone(&engine);
            std::thread::spawn(move || engine.resolve(query).map(|r| r.source_id))
        })
        .collect();
    let ids: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().expect("thread").expect("resolve"))
        .collect();
    assert_eq!(ids, vec!["carv-1", "lis-1"]);
}
