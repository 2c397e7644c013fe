//! Certificate token handling.
//!
//! Two sanitizers exist for the same raw token. Discovery deletes spaces,
//! while row references replace them with underscores, so a multi-word
//! certificate discovered as `OEKOTEX` is referenced as `OEKO_TEX`. Which
//! one the builder uses for references is selected by [`CertificateMode`].

use crate::model::SupplierRecord;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How row-level certificate references are sanitized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateMode {
    /// Keep the two sanitizers apart; unmatched references are logged
    #[default]
    Faithful,
    /// Sanitize references like discovery; every reference must resolve
    Unified,
}

impl std::fmt::Display for CertificateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CertificateMode::Faithful => write!(f, "faithful"),
            CertificateMode::Unified => write!(f, "unified"),
        }
    }
}

/// Split a raw certification list on `;`, then `,`, trimming each piece.
/// Empty pieces are skipped.
pub fn split_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';')
        .flat_map(|group| group.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Discovery sanitizer: delete spaces, periods and commas.
pub fn sanitize_for_discovery(token: &str) -> String {
    token
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | ','))
        .collect()
}

/// Row reference sanitizer: trim, spaces become `_`, delete periods and commas.
pub fn sanitize_for_reference(token: &str) -> String {
    token
        .trim()
        .chars()
        .filter(|c| !matches!(c, '.' | ','))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

impl CertificateMode {
    pub fn sanitize_reference(&self, token: &str) -> String {
        match self {
            CertificateMode::Faithful => sanitize_for_reference(token),
            CertificateMode::Unified => sanitize_for_discovery(token),
        }
    }
}

/// Distinct sanitized certificate tokens across all rows whose
/// certification flag is set.
pub fn discover_certificates(rows: &[SupplierRecord]) -> BTreeSet<String> {
    rows.iter()
        .filter(|row| row.has_certifications)
        .filter_map(|row| row.certifications.as_deref())
        .flat_map(split_tokens)
        .map(sanitize_for_discovery)
        .filter(|token| !token.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_both_delimiters() {
        let tokens: Vec<_> = split_tokens(" GOTS ; OEKO TEX, BCI;; ").collect();
        assert_eq!(tokens, vec!["GOTS", "OEKO TEX", "BCI"]);
    }

    #[test]
    fn differently_spaced_tokens_share_an_identity() {
        assert_eq!(sanitize_for_discovery("OEKO TEX"), "OEKOTEX");
        assert_eq!(sanitize_for_discovery("OEKO  TEX"), "OEKOTEX");
        assert_eq!(sanitize_for_discovery("S.A. 8000"), "SA8000");
    }

    #[test]
    fn reference_sanitizer_keeps_spacing_as_underscores() {
        assert_eq!(sanitize_for_reference("OEKO TEX"), "OEKO_TEX");
        assert_eq!(sanitize_for_reference("OEKO  TEX"), "OEKO__TEX");
        assert_eq!(sanitize_for_reference(" S.A. 8000 "), "SA_8000");
    }

    #[test]
    fn unified_mode_uses_discovery_rule() {
        assert_eq!(CertificateMode::Unified.sanitize_reference("OEKO TEX"), "OEKOTEX");
        assert_eq!(
            CertificateMode::Faithful.sanitize_reference("OEKO TEX"),
            "OEKO_TEX"
        );
    }

    #[test]
    fn discovery_skips_unflagged_rows_and_empty_results() {
        let mut unflagged = SupplierRecord::new("B");
        unflagged.certifications = Some("ISO 14001".to_string());

        let rows = vec![
            SupplierRecord::new("A").with_certifications("GOTS; OEKO TEX, ..."),
            unflagged,
            SupplierRecord::new("C").with_certifications("OEKO  TEX;GOTS"),
        ];
        let found = discover_certificates(&rows);
        assert_eq!(
            found.into_iter().collect::<Vec<_>>(),
            vec!["GOTS".to_string(), "OEKOTEX".to_string()]
        );
    }
}
