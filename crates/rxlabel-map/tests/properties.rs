use proptest::prelude::*;
use rxlabel_map::{Icd10Index, IndicationMatcher, SynonymExpander, normalize};
use rxlabel_model::Icd10Entry;

const WORDS: &[&str] = &[
    "heart",
    "failure",
    "chronic",
    "kidney",
    "disease",
    "hypertension",
    "high",
    "blood",
    "pressure",
    "headache",
    "pain",
    "of",
    "the",
    "treatment",
    "HTN",
    "CHF",
    "fever",
];

/// Words that survive normalization unchanged and are never dropped.
const CONTENT_WORDS: &[&str] = &[
    "heart",
    "failure",
    "chronic",
    "kidney",
    "disease",
    "hypertension",
    "high",
    "blood",
    "pressure",
    "headache",
    "pain",
    "fever",
];

fn entries() -> Vec<Icd10Entry> {
    vec![
        Icd10Entry::new("I50.9", "Heart failure, unspecified", ""),
        Icd10Entry::new("I10", "Essential (primary) hypertension", ""),
        Icd10Entry::new("I11.0", "Hypertensive heart disease with heart failure", ""),
        Icd10Entry::new("I50.20", "Unspecified systolic (congestive) heart failure", ""),
        Icd10Entry::new("N18.9", "Chronic kidney disease, unspecified", ""),
        Icd10Entry::new("R51.9", "Headache, unspecified", ""),
        Icd10Entry::new("R52", "Pain, unspecified", ""),
        Icd10Entry::new("R50.9", "Fever, unspecified", ""),
    ]
}

fn index() -> Icd10Index {
    Icd10Index::build(entries()).expect("index")
}

fn indication() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 0..12).prop_map(|words| words.join(" "))
}

fn description() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(CONTENT_WORDS, 1..=4).prop_shuffle()
}

proptest! {
    #[test]
    fn normalization_is_idempotent(text in "[A-Za-z0-9 ,.;:!?()/'-]{0,40}") {
        let once = normalize(&text);
        let twice = normalize(once.as_str());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalization_ignores_case(text in "[A-Za-z ,.-]{0,30}") {
        prop_assert_eq!(normalize(&text.to_uppercase()), normalize(&text.to_lowercase()));
    }

    #[test]
    fn expansion_contains_the_term(text in "[a-z ]{0,30}") {
        let expander = SynonymExpander::with_defaults();
        let term = normalize(&text);
        prop_assert!(expander.expand(&term).contains(&term));
    }

    #[test]
    fn matches_are_strictly_ordered_and_stable(text in indication()) {
        let index = index();
        let expander = SynonymExpander::with_defaults();
        let matcher = IndicationMatcher::default();

        let results = matcher.match_indication(&text, &index, &expander);
        prop_assert!(results.len() <= matcher.options().max_results);
        for pair in results.windows(2) {
            let ordered = pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score && pair[0].code() < pair[1].code());
            prop_assert!(ordered);
        }
        for result in &results {
            prop_assert!(result.score > 0.0 && result.score <= 1.0);
        }

        let again = matcher.match_indication(&text, &index, &expander);
        prop_assert_eq!(results, again);
    }

    #[test]
    fn phrase_identical_to_a_description_scores_one_and_ranks_first(words in description()) {
        let text = words.join(" ");
        let mut entries = entries();
        entries.push(Icd10Entry::new("A00", text.clone(), ""));
        let index = Icd10Index::build(entries).expect("index");
        let expander = SynonymExpander::with_defaults();

        let results = IndicationMatcher::default().match_indication(&text, &index, &expander);
        prop_assert!(!results.is_empty());
        prop_assert_eq!(results[0].code(), "A00");
        prop_assert!((results[0].score - 1.0).abs() < 1e-12);
        prop_assert!(!results[0].via_synonym);
        for other in &results[1..] {
            prop_assert!(other.score < 1.0);
        }
    }
}
