//! Text rendering of run results for the terminal.

use std::fmt;

use crate::evaluate::EvaluationReport;
use crate::pipeline::{CleaningReport, InspectReport, PipelineReport};

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rows loaded: {}", self.rows_loaded)?;
        writeln!(f)?;
        writeln!(f, "Missing values per column:")?;
        let width = self
            .missing_before
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0);
        for (name, count) in &self.missing_before {
            writeln!(f, "  {name:<width$}  {count}")?;
        }
        writeln!(f)?;

        if self.imputation.fills().is_empty() {
            writeln!(f, "Imputation: nothing to fill")?;
        } else {
            writeln!(f, "Imputation (median):")?;
            for fill in self.imputation.fills() {
                writeln!(
                    f,
                    "  {:<width$}  {} cells <- {}",
                    fill.column, fill.n_filled, fill.value
                )?;
            }
        }
        writeln!(f)?;

        let o = &self.outliers;
        writeln!(
            f,
            "Outliers on {}: Q1 = {:.4}, Q3 = {:.4}, IQR = {:.4}, keep [{:.4}, {:.4}]",
            o.column,
            o.q1,
            o.q3,
            o.iqr(),
            o.lower,
            o.upper
        )?;
        writeln!(
            f,
            "  removed {} of {} rows, {} remain",
            o.rows_removed(),
            o.rows_before,
            o.rows_after
        )
    }
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cleaning)?;
        writeln!(
            f,
            "  class balance: {} legitimate, {} fraud",
            self.class_counts[0], self.class_counts[1]
        )?;
        writeln!(f)?;
        writeln!(f, "Variance inflation factors:")?;
        write!(f, "{}", self.vif)
    }
}

fn write_evaluation(f: &mut fmt::Formatter<'_>, title: &str, eval: &EvaluationReport) -> fmt::Result {
    writeln!(f, "{title} accuracy: {:.4}", eval.accuracy())?;
    writeln!(f)?;
    writeln!(f, "Confusion matrix:")?;
    writeln!(f, "{}", eval.confusion())?;
    writeln!(f, "Classification report:")?;
    write!(f, "{}", eval.classification_report())
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.inspect)?;
        writeln!(f, "Split: {} train rows, {} test rows", self.n_train, self.n_test)?;
        writeln!(f)?;

        writeln!(f, "Baseline forest ({})", self.baseline_params)?;
        write_evaluation(f, "Baseline", &self.baseline)?;
        writeln!(f)?;

        let t = &self.tuning;
        writeln!(
            f,
            "Grid search: {} candidates, {}-fold stratified CV",
            t.candidates.len(),
            t.n_folds
        )?;
        writeln!(f, "Best parameters: {}", t.best_params)?;
        writeln!(
            f,
            "Best CV accuracy: {:.4} (+/- {:.4})",
            t.best_score.mean_accuracy, t.best_score.std_accuracy
        )?;
        writeln!(f)?;

        write_evaluation(f, "Tuned", &self.tuned)?;
        writeln!(f)?;
        writeln!(f, "ROC AUC: {:.4}", self.tuned.auc())
    }
}
