//! Controlled vocabularies and the registry of declared vocabulary IRIs.

use crate::error::BuildError;
use oxigraph::model::NamedNode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use super::ben;

/// Processes a facility can carry out. Local name = variant name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum ProcessType {
    Manufacturing,
    OtherProcessing,
    Printing,
    Spinning,
    Weaving,
    WetProcess,
}

impl ProcessType {
    /// Source column carrying the flag for this process.
    pub fn column(&self) -> &'static str {
        match self {
            ProcessType::Manufacturing => "MANUFACTURING",
            ProcessType::OtherProcessing => "OTHER_PROCESSING",
            ProcessType::Printing => "PRINTING",
            ProcessType::Spinning => "SPINNING",
            ProcessType::Weaving => "WEAVING",
            ProcessType::WetProcess => "WET_PROCESS",
        }
    }

    pub fn local_name(&self) -> &'static str {
        self.into()
    }

    pub fn iri(&self) -> Result<NamedNode, BuildError> {
        ben(self.local_name())
    }
}

/// Product families a facility produces.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum ProductType {
    Apparel,
    Shoes,
    Accessories,
}

impl ProductType {
    pub fn column(&self) -> &'static str {
        match self {
            ProductType::Apparel => "APPAREL",
            ProductType::Shoes => "SHOES",
            ProductType::Accessories => "ACCESSORIES",
        }
    }

    pub fn local_name(&self) -> &'static str {
        self.into()
    }

    pub fn iri(&self) -> Result<NamedNode, BuildError> {
        ben(self.local_name())
    }
}

/// Registry of every vocabulary IRI declared during initialization.
///
/// Instance data may only reference IRIs recorded here. The registry is
/// filled before the first row is processed and is read-only afterwards.
#[derive(Debug, Default)]
pub struct Vocabulary {
    declared: HashSet<NamedNode>,
    certificates: BTreeSet<String>,
}

impl Vocabulary {
    /// Registry holding the fixed ProcessType and ProductType entries.
    pub fn with_fixed_enumerations() -> Result<Self, BuildError> {
        let mut vocabulary = Self::default();
        for process in ProcessType::iter() {
            vocabulary.declared.insert(process.iri()?);
        }
        for product in ProductType::iter() {
            vocabulary.declared.insert(product.iri()?);
        }
        Ok(vocabulary)
    }

    pub(crate) fn declare_certificate(&mut self, token: &str, iri: NamedNode) {
        self.certificates.insert(token.to_string());
        self.declared.insert(iri);
    }

    pub fn is_declared(&self, iri: &NamedNode) -> bool {
        self.declared.contains(iri)
    }

    /// Fails with [`BuildError::UnresolvedReference`] for undeclared IRIs.
    pub fn require(&self, subject: &NamedNode, iri: &NamedNode) -> Result<(), BuildError> {
        if self.is_declared(iri) {
            Ok(())
        } else {
            Err(BuildError::UnresolvedReference {
                subject: subject.as_str().to_string(),
                reference: iri.as_str().to_string(),
            })
        }
    }

    /// Sanitized tokens of every discovered certificate.
    pub fn certificates(&self) -> &BTreeSet<String> {
        &self.certificates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerations_have_fixed_members() {
        assert_eq!(ProcessType::iter().count(), 6);
        assert_eq!(ProductType::iter().count(), 3);
        assert_eq!(ProcessType::WetProcess.local_name(), "WetProcess");
        assert_eq!(ProcessType::OtherProcessing.column(), "OTHER_PROCESSING");
    }

    #[test]
    fn undeclared_reference_is_rejected() {
        let vocabulary = Vocabulary::with_fixed_enumerations().unwrap();
        let subject = ben("C0").unwrap();
        assert!(
            vocabulary
                .require(&subject, &ProcessType::Weaving.iri().unwrap())
                .is_ok()
        );
        let err = vocabulary
            .require(&subject, &ben("Knitting").unwrap())
            .unwrap_err();
        assert!(matches!(err, BuildError::UnresolvedReference { .. }));
    }
}
