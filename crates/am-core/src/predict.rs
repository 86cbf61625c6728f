//! Consequent scoring for a partial transaction.
//!
//! Every score is a confidence computed from two exact trie lookups:
//! the queried antecedent path and that path extended with one
//! consequent. No enumeration happens.

use crate::symbols::{Normalizer, SymbolId, SymbolTable};
use crate::trie::Trie;
use am_common::{Error, PredictOptions, Prediction, Result};
use std::collections::BTreeSet;

pub(crate) fn predict(
    trie: &Trie,
    symbols: &SymbolTable,
    normalizer: &Normalizer,
    consequent_count: usize,
    items: &[&str],
    options: &PredictOptions,
) -> Result<Vec<Prediction>> {
    let mut query: BTreeSet<SymbolId> = BTreeSet::new();
    for &raw in items {
        let prepared = match normalizer.prepare(raw) {
            Ok(prepared) => prepared,
            Err(_) if options.skip_unknown_antecedents => continue,
            Err(err) => return Err(err),
        };
        match symbols.get(&prepared) {
            Some(id) => {
                query.insert(id);
            }
            None if options.skip_unknown_antecedents => {}
            None => return Err(Error::UnknownAntecedent(prepared.text().to_string())),
        }
    }

    let antecedent_path: Vec<SymbolId> = query.iter().copied().collect();
    let occurrences_antecedents = trie.occurrences_of(&antecedent_path);

    let mut predictions = Vec::with_capacity(consequent_count);
    for raw_id in 0..consequent_count as u32 {
        let consequent = SymbolId::from_u32(raw_id);
        let score = if occurrences_antecedents == 0 {
            0.0
        } else if query.contains(&consequent) {
            1.0
        } else {
            let mut extended = antecedent_path.clone();
            let position = extended.binary_search(&consequent).unwrap_err();
            extended.insert(position, consequent);
            trie.occurrences_of(&extended) as f64 / occurrences_antecedents as f64
        };
        predictions.push(Prediction {
            consequent: symbols.text(consequent).to_string(),
            score,
        });
    }

    // Stable sort keeps the declared consequent order among ties.
    predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(predictions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn id(raw: u32) -> SymbolId {
        SymbolId::from_u32(raw)
    }

    /// Consequents "s=1" (0) and "s=0" (1); items "adiposity" (2)
    /// and "father smokes" (3).
    fn smoker() -> (Trie, SymbolTable, Normalizer) {
        let norm = Normalizer::new(true, true, None).unwrap();
        let mut table = SymbolTable::new();
        for raw in ["s=1", "s=0", "adiposity", "father smokes"] {
            table.intern(&norm.prepare(raw).unwrap());
        }
        let mut trie = Trie::new(2);
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        let transactions: Vec<Vec<u32>> = vec![
            vec![0, 2, 3],
            vec![0, 2, 3],
            vec![0, 2],
            vec![1, 2, 3],
            vec![1, 3],
            vec![1],
            vec![0, 3],
        ];
        for t in transactions {
            trie.bump(trie.root(), 1);
            let items: Vec<SymbolId> = t.iter().map(|&r| id(r)).collect();
            crate::ingest::insert_subsets(&mut trie, &items, usize::MAX, &mut rng, 1.0);
        }
        (trie, table, norm)
    }

    #[test]
    fn test_scores_are_exact_confidences() {
        let (trie, table, norm) = smoker();
        let predictions = predict(
            &trie,
            &table,
            &norm,
            2,
            &["adiposity", "Father  Smokes"],
            &PredictOptions::default(),
        )
        .unwrap();

        // {adiposity, father smokes} occurs 3 times; with s=1 twice,
        // with s=0 once.
        assert_eq!(predictions[0].consequent, "s=1");
        assert!((predictions[0].score - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(predictions[1].consequent, "s=0");
        assert!((predictions[1].score - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_antecedent_fails_without_skip() {
        let (trie, table, norm) = smoker();
        let err = predict(
            &trie,
            &table,
            &norm,
            2,
            &["adiposity", "hates smoking"],
            &PredictOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownAntecedent(item) if item == "hates smoking"));
    }

    #[test]
    fn test_skip_flag_drops_unknown_antecedents() {
        let (trie, table, norm) = smoker();
        let options = PredictOptions::default().with_skip_unknown_antecedents(true);
        let skipped = predict(
            &trie,
            &table,
            &norm,
            2,
            &["adiposity", "hates smoking"],
            &options,
        )
        .unwrap();
        let baseline = predict(
            &trie,
            &table,
            &norm,
            2,
            &["adiposity"],
            &PredictOptions::default(),
        )
        .unwrap();
        assert_eq!(skipped, baseline);
    }

    #[test]
    fn test_unstored_antecedent_path_scores_zero() {
        let (trie, table, norm) = smoker();
        // "adiposity" and "father smokes" both exist, but only in
        // transactions; the pair {s=0, adiposity, father smokes}
        // exists while deeper paths may not. Query an antecedent set
        // that was never stored as a path: impossible here, so force
        // it by querying a consequent pair that never co-occurs.
        let predictions = predict(
            &trie,
            &table,
            &norm,
            2,
            &["s=1", "s=0"],
            &PredictOptions::default(),
        )
        .unwrap();
        assert!(predictions.iter().all(|p| p.score == 0.0));
    }

    #[test]
    fn test_queried_consequent_scores_one() {
        let (trie, table, norm) = smoker();
        let predictions = predict(
            &trie,
            &table,
            &norm,
            2,
            &["s=1", "adiposity"],
            &PredictOptions::default(),
        )
        .unwrap();
        assert_eq!(predictions[0].consequent, "s=1");
        assert_eq!(predictions[0].score, 1.0);
    }

    #[test]
    fn test_empty_query_scores_by_support() {
        let (trie, table, norm) = smoker();
        let predictions = predict(
            &trie,
            &table,
            &norm,
            2,
            &[],
            &PredictOptions::default(),
        )
        .unwrap();
        // s=1 occurs 4/7, s=0 occurs 3/7.
        assert!((predictions[0].score - 4.0 / 7.0).abs() < 1e-12);
        assert!((predictions[1].score - 3.0 / 7.0).abs() < 1e-12);
    }
}
