//! One-hot encoding of the categorical flight columns

use crate::error::{MonitorError, Result};
use crate::schema::{indicator_name, CategoricalVocabulary, CategoryLevels};
use crate::utils::f64_column;
use polars::prelude::*;
use std::collections::BTreeSet;

/// Codes of a categorical column as strings; nulls stay `None`
fn column_codes(df: &DataFrame, family: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(family)
        .map_err(|_| MonitorError::FeatureNotFound(family.to_string()))?;
    let casted = column.cast(&DataType::String)?;
    let codes = casted
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
        .collect();
    Ok(codes)
}

/// One indicator per non-reference level, reference level dropped
#[derive(Debug, Clone, Default)]
pub struct OneHotEncoder {
    vocabulary: Option<CategoricalVocabulary>,
}

impl OneHotEncoder {
    /// Encoder that fits its vocabulary from the data it sees
    pub fn new() -> Self {
        Self { vocabulary: None }
    }

    /// Encoder bound to a fixed vocabulary
    pub fn with_vocabulary(vocabulary: CategoricalVocabulary) -> Self {
        Self {
            vocabulary: Some(vocabulary),
        }
    }

    /// Collect the sorted distinct codes of each family
    pub fn fit_vocabulary(df: &DataFrame, families: &[&str]) -> Result<CategoricalVocabulary> {
        let levels = families
            .iter()
            .map(|family| {
                let codes: BTreeSet<String> =
                    column_codes(df, family)?.into_iter().flatten().collect();
                Ok(CategoryLevels::new(*family, codes))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CategoricalVocabulary::new(levels))
    }

    /// Replace each family column by its indicator block.
    ///
    /// Returns the encoded frame, the vocabulary used and the number of cells
    /// whose code was missing or outside the vocabulary (all-zero block).
    pub fn fit_transform(
        &self,
        df: &DataFrame,
        families: &[&str],
    ) -> Result<(DataFrame, CategoricalVocabulary, usize)> {
        let vocabulary = match &self.vocabulary {
            Some(v) => v.clone(),
            None => Self::fit_vocabulary(df, families)?,
        };

        let mut result = df.clone();
        let mut unmatched = 0usize;

        for family in families {
            let levels = vocabulary.family(family).ok_or_else(|| {
                MonitorError::schema_mismatch(
                    "encoding",
                    format!("vocabulary has no family '{}'", family),
                )
            })?;
            let codes = column_codes(df, family)?;

            unmatched += codes
                .iter()
                .filter(|c| c.as_deref().map_or(true, |code| !levels.contains(code)))
                .count();

            result = result.drop(family)?;
            for code in levels.codes.iter().skip(1) {
                let indicator: Vec<f64> = codes
                    .iter()
                    .map(|c| if c.as_deref() == Some(code.as_str()) { 1.0 } else { 0.0 })
                    .collect();
                result.with_column(f64_column(&indicator_name(family, code), indicator))?;
            }
        }

        Ok((result, vocabulary, unmatched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{column_names, column_values};

    fn carriers() -> DataFrame {
        df!(
            "UniqueCarrier" => &["WN", "AA", "DL", "WN"],
            "x" => &[1.0, 2.0, 3.0, 4.0],
        )
        .unwrap()
    }

    #[test]
    fn test_fitted_encoding_drops_first_level() {
        let (out, vocab, unmatched) = OneHotEncoder::new()
            .fit_transform(&carriers(), &["UniqueCarrier"])
            .unwrap();

        assert_eq!(unmatched, 0);
        assert_eq!(vocab.family("UniqueCarrier").unwrap().reference_level(), Some("AA"));
        let names = column_names(&out);
        assert!(!names.contains(&"UniqueCarrier".to_string()));
        assert!(!names.contains(&"UniqueCarrier_AA".to_string()));
        assert_eq!(
            column_values(&out, "UniqueCarrier_WN").unwrap(),
            vec![1.0, 0.0, 0.0, 1.0]
        );
        assert_eq!(
            column_values(&out, "UniqueCarrier_DL").unwrap(),
            vec![0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_fixed_vocabulary_leaves_unknown_codes_unset() {
        let vocab = CategoricalVocabulary::new(vec![CategoryLevels::new(
            "UniqueCarrier",
            ["AA", "WN"].map(String::from),
        )]);
        let (out, _, unmatched) = OneHotEncoder::with_vocabulary(vocab)
            .fit_transform(&carriers(), &["UniqueCarrier"])
            .unwrap();

        // DL is unknown: no indicator column exists for it and its row is all zero
        assert_eq!(unmatched, 1);
        assert!(out.column("UniqueCarrier_DL").is_err());
        assert_eq!(
            column_values(&out, "UniqueCarrier_WN").unwrap(),
            vec![1.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_missing_family_column() {
        let df = df!("x" => &[1.0]).unwrap();
        assert!(OneHotEncoder::new().fit_transform(&df, &["Origin"]).is_err());
    }
}
