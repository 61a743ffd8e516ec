//! End-to-end annotation scenarios through the public API.

use ocrtree_core::*;

fn line_tree(words: &[&str]) -> BoxTree {
    let mut tree = BoxTree::new();
    for box_type in [BoxType::AwsBlockPage, BoxType::AwsBlockLine] {
        tree.insert_by_type(OcrBox::new(box_type, Rect::new(0, 0, 500, 30), None, ""))
            .unwrap();
    }
    for (i, word) in words.iter().enumerate() {
        let left = i as i64 * 50;
        tree.insert_by_type(OcrBox::new(
            BoxType::AwsBlockWord,
            Rect::new(left, 0, left + 45, 30),
            Some(90.0),
            *word,
        ))
        .unwrap();
    }
    tree
}

fn labels(tree: &BoxTree) -> Vec<Option<String>> {
    tree.subboxes(tree.root(), Some(BoxType::AwsBlockWord))
        .into_iter()
        .map(|w| tree[w].feature().map(str::to_string))
        .collect()
}

fn some(label: &str) -> Option<String> {
    Some(label.to_string())
}

fn regex(name: &str, core: &str, priority: i64) -> Box<dyn Feature> {
    Box::new(RegexFeature::new(name, core, r"\s|^", r"\s|$", priority).unwrap())
}

#[test]
fn boundary_suffixes() {
    let mut tree = line_tree(&["%", "bazocytów", "C"]);
    let line = tree.subboxes(tree.root(), Some(BoxType::AwsBlockLine))[0];
    let text = resolver::line_text(&tree, line);
    let occurrences = [
        Occurrence::new(&text, "F", 0, 12, "% bazocytów ", 8),
        Occurrence::new(&text, "G", 11, 12, " ", 7),
    ];
    let mut priorities = FeaturePriorities::empty();
    priorities.insert("F", 8);
    priorities.insert("G", 7);

    annotate_words(&mut tree, line, &occurrences, &priorities).unwrap();
    assert_eq!(labels(&tree), vec![some("F<-"), some("F-"), some("F->")]);
}

#[test]
fn higher_priority_wins_regardless_of_feature_order() {
    for swap in [false, true] {
        let mut features = vec![regex("Code", r"\d+", 8), regex("Count", r"\d{5}", 7)];
        if swap {
            features.reverse();
        }
        let mut tree = line_tree(&["nr", "12345"]);
        examine_lines(&mut tree, &features).unwrap();
        assert_eq!(labels(&tree), vec![None, some("Code")]);
    }
}

fn mixed_features() -> Vec<Box<dyn Feature>> {
    vec![
        Box::new(builtin_feature("Number").unwrap()),
        Box::new(
            KeywordFeature::new("Test", ["morfologia krwi"], 6, KeywordOptions::default()).unwrap(),
        ),
        Box::new(FuzzyFeature::new("Header", ["wynik badania"], 4, false)),
    ]
}

#[test]
fn regex_keyword_and_fuzzy_features_together() {
    let mut tree = line_tree(&["morfologia", "krwi", "wynik", "badnia", "12"]);
    examine_lines(&mut tree, &mixed_features()).unwrap();
    assert_eq!(
        labels(&tree),
        vec![
            some("Test<-"),
            some("Test->"),
            some("Header<-"),
            some("Header->"),
            some("Number"),
        ]
    );
}

#[test]
fn annotation_is_idempotent() {
    let mut once = line_tree(&["morfologia", "krwi", "wynik", "badnia", "12"]);
    examine_lines(&mut once, &mixed_features()).unwrap();
    let mut twice = once.clone();
    examine_lines(&mut twice, &mixed_features()).unwrap();
    assert_eq!(once, twice);
    assert_eq!(labels(&once), labels(&twice));
}

#[test]
fn every_box_carries_the_feature_attribute() {
    let mut tree = line_tree(&["ala", "ma", "kota"]);
    examine_lines(&mut tree, &mixed_features()).unwrap();
    for node in tree.iter() {
        assert_eq!(tree[node].attribute(FEATURE_KEY), Some(&AttrValue::Null));
    }
}

#[test]
fn regex_span_exactness() {
    let digits = RegexFeature::new("Digits", r"\d+", r"\s|^", r"\s|$", 1).unwrap();
    assert_eq!(
        digits.find_occurrences("x 123").unwrap(),
        vec![Occurrence::new("x 123", "Digits", 2, 5, "123", 1)]
    );
    assert!(digits.find_occurrences("123-").unwrap().is_empty());
}

#[test]
fn fuzzy_acceptance_boundary() {
    let single = FuzzyFeature::new("Letter", ["a"], 1, false);
    assert_eq!(single.find_occurrences("a").unwrap().len(), 1);
    assert!(single.find_occurrences("b").unwrap().is_empty());

    let word = FuzzyFeature::new("Word", ["badania"], 1, false);
    let exact = word.find_occurrences("badania").unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!((exact[0].start, exact[0].end), (0, 7));
}

#[test]
fn multiple_spaces_in_a_line_are_rejected_by_fuzzy_features() {
    let mut tree = line_tree(&["wynik  badania"]);
    let err = examine_lines(&mut tree, &mixed_features()).unwrap_err();
    assert!(matches!(
        err.as_precondition(),
        Some(PrecondCheckError::MultipleSpaces(_))
    ));
}

#[test]
fn annotated_tree_exports_labels() {
    let mut tree = line_tree(&["PESEL:", "44051401359"]);
    examine_lines(&mut tree, &builtin_features().unwrap()).unwrap();
    assert_eq!(labels(&tree), vec![None, some("PESEL")]);

    let csv = tree.to_csv_string().unwrap();
    let word_row = csv.lines().last().unwrap();
    assert!(word_row.ends_with(",PESEL"), "{word_row}");
}

#[cfg(feature = "serde")]
#[test]
fn configured_features() {
    let features = parse_features(
        r#"[
            {"kind": "builtin", "name": "Date"},
            {"kind": "keyword", "name": "Label", "priority": 3, "keywords": ["data"], "allow_first_letter_upper": true}
        ]"#,
        std::path::Path::new("."),
    )
    .unwrap();
    let mut tree = line_tree(&["Data:", "01.02.2020"]);
    examine_lines(&mut tree, &features).unwrap();
    assert_eq!(labels(&tree), vec![None, some("Date")]);

    let mut tree = line_tree(&["Data", "01.02.2020"]);
    examine_lines(&mut tree, &features).unwrap();
    assert_eq!(labels(&tree), vec![some("Label"), some("Date")]);
}
