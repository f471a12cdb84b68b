use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::{AssociationAnalysis, MiningConfig};

type PyItemsets = Vec<(Vec<String>, u32)>;
type PyRules = Vec<(Vec<String>, Vec<String>, f64)>;

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_owned).collect()
}

fn convert_itemsets(analysis: &AssociationAnalysis) -> PyItemsets {
    analysis
        .named_itemsets()
        .into_iter()
        .map(|(itemset, support)| (owned(itemset), support))
        .collect()
}

fn convert_rules(analysis: &AssociationAnalysis) -> PyRules {
    analysis
        .named_rules()
        .into_iter()
        .map(|(antecedent, consequent, confidence)| {
            (owned(antecedent), owned(consequent), confidence)
        })
        .collect()
}

/// Apriori with count distribution.
///
/// Returns `(itemsets, rules)`: `[(items, support)]` and
/// `[(antecedent, consequent, confidence)]`.
#[pyfunction]
#[pyo3(signature = (transactions, min_support, min_confidence, num_workers = 1))]
fn apriori(
    py: Python<'_>,
    transactions: Vec<Vec<String>>,
    min_support: u32,
    min_confidence: f64,
    num_workers: usize,
) -> PyResult<(PyItemsets, PyRules)> {
    let config = MiningConfig {
        min_support,
        min_confidence,
        num_workers,
        ..Default::default()
    };
    let analysis = py
        .allow_threads(|| crate::apriori(&transactions, &config))
        .map_err(|err| PyValueError::new_err(format!("{:#}", err)))?;

    Ok((convert_itemsets(&analysis), convert_rules(&analysis)))
}

#[pymodule]
fn parallel_apriori(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(apriori, m)?)?;
    Ok(())
}
