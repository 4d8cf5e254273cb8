use super::*;
use crate::taxonomy::EmotionCategoryPrototype;

/// Helper to build a two-primary taxonomy with mirrored prototypes
fn mirrored_taxonomy() -> EmotionTaxonomy {
    EmotionTaxonomy::new(vec![
        EmotionCategoryPrototype::primary("Zeal", EmotionDimensions::new(0.75, 0.5, 0.5, 0.3), vec![]),
        EmotionCategoryPrototype::primary("Calm", EmotionDimensions::new(0.25, 0.5, 0.5, 0.3), vec![]),
    ])
    .unwrap()
}

#[test]
fn test_exact_prototype_scores_one() {
    let classifier = EmotionClassifier::default();
    let taxonomy = EmotionTaxonomy::builtin();

    for category in taxonomy.primaries() {
        let result = classifier
            .classify(&category.prototype, &taxonomy)
            .expect("builtin taxonomy always yields a match");
        assert_eq!(
            result.primary, category.name,
            "prototype of {} should classify as itself",
            category.name
        );
        assert!(
            (result.score - 1.0).abs() < 1e-6,
            "expected score 1.0 for {}, got {}",
            category.name,
            result.score
        );
    }
}

#[test]
fn test_composite_requires_complexity() {
    let classifier = EmotionClassifier::default();
    let taxonomy = EmotionTaxonomy::builtin();
    let love = taxonomy.get("Love").unwrap().prototype;

    // Below the gate only primaries are scored
    let low = EmotionDimensions::new(love.valence, love.arousal, love.dominance, 0.6);
    let result = classifier.classify(&low, &taxonomy).unwrap();
    assert!(!taxonomy.get(&result.primary).unwrap().is_composite());
    assert!(result
        .alternatives
        .iter()
        .all(|a| !taxonomy.get(&a.category).unwrap().is_composite()));

    // Above the gate the composite wins outright
    let high = EmotionDimensions::new(love.valence, love.arousal, love.dominance, 0.61);
    let result = classifier.classify(&high, &taxonomy).unwrap();
    assert_eq!(result.primary, "Love");
    assert!((result.score - 1.0).abs() < 1e-6);
}

#[test]
fn test_tie_breaks_on_name() {
    let classifier = EmotionClassifier::default();
    let taxonomy = mirrored_taxonomy();

    // Exactly halfway: equal scores, "Calm" < "Zeal"
    let dims = EmotionDimensions::new(0.5, 0.5, 0.5, 0.3);
    let result = classifier.classify(&dims, &taxonomy).unwrap();
    assert_eq!(result.primary, "Calm");
    assert_eq!(result.alternatives.len(), 1);
    assert_eq!(result.alternatives[0].category, "Zeal");
    assert_eq!(result.alternatives[0].score, result.score);
}

#[test]
fn test_alternatives_sorted_and_capped() {
    let classifier = EmotionClassifier::default();
    let taxonomy = EmotionTaxonomy::builtin();
    let dims = EmotionDimensions::new(0.5, 0.5, 0.5, 0.9);

    let result = classifier.classify(&dims, &taxonomy).unwrap();
    assert!(result.alternatives.len() <= 3);
    assert!(result.alternatives.iter().all(|a| a.score > 0.5));
    assert!(result.alternatives.iter().all(|a| a.category != result.primary));
    assert!(result.alternatives.iter().all(|a| a.score <= result.score));
    for pair in result.alternatives.windows(2) {
        assert!(
            pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score && pair[0].category < pair[1].category),
            "alternatives out of order: {:?}",
            result.alternatives
        );
    }
}

#[test]
fn test_alternative_floor() {
    let classifier = EmotionClassifier::default();
    let taxonomy = EmotionTaxonomy::new(vec![
        EmotionCategoryPrototype::primary("High", EmotionDimensions::new(1.0, 1.0, 1.0, 0.3), vec![]),
        EmotionCategoryPrototype::primary("Low", EmotionDimensions::new(0.0, 0.0, 0.0, 0.3), vec![]),
    ])
    .unwrap();

    let result = classifier
        .classify(&EmotionDimensions::new(1.0, 1.0, 1.0, 0.0), &taxonomy)
        .unwrap();
    assert_eq!(result.primary, "High");
    assert!(result.alternatives.is_empty(), "Low scores 0.0, below the floor");
}

#[test]
fn test_only_gated_composites_yields_none() {
    let classifier = EmotionClassifier::default();
    let mut composite = EmotionCategoryPrototype::primary(
        "Lonely",
        EmotionDimensions::new(0.5, 0.5, 0.5, 0.8),
        vec![],
    );
    composite.kind = crate::taxonomy::CategoryKind::Composite;
    let taxonomy = EmotionTaxonomy::new(vec![composite]).unwrap();

    assert!(classifier
        .classify(&EmotionDimensions::neutral(), &taxonomy)
        .is_none());
}

#[test]
fn test_classify_is_deterministic() {
    let classifier = EmotionClassifier::default();
    let taxonomy = EmotionTaxonomy::builtin();
    let dims = EmotionDimensions::new(0.33, 0.71, 0.42, 0.65);
    assert_eq!(
        classifier.classify(&dims, &taxonomy),
        classifier.classify(&dims, &taxonomy)
    );
}
