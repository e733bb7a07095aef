//! The closed set of documents served under `/api`.
//!
//! Each variant names one endpoint slug, one backing file and one
//! human-readable label used in failure messages. Adding a document is a
//! change to this table only.

use std::fmt;

/// A named JSON document served verbatim by its own endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Domains,
    Vignettes,
    Concepts,
    Mnemonics,
    Pearls,
    Playbook,
    Frequency,
    Cardiology,
    IdAntibiotics,
}

impl Resource {
    pub const ALL: [Self; 9] = [
        Self::Domains,
        Self::Vignettes,
        Self::Concepts,
        Self::Mnemonics,
        Self::Pearls,
        Self::Playbook,
        Self::Frequency,
        Self::Cardiology,
        Self::IdAntibiotics,
    ];

    /// Path segment after `/api/`
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Domains => "domains",
            Self::Vignettes => "vignettes",
            Self::Concepts => "concepts",
            Self::Mnemonics => "mnemonics",
            Self::Pearls => "pearls",
            Self::Playbook => "playbook",
            Self::Frequency => "frequency",
            Self::Cardiology => "cardiology",
            Self::IdAntibiotics => "id-antibiotics",
        }
    }

    /// Backing file name inside the data directory
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Domains => "domain_stats.json",
            Self::Vignettes => "vignettes_by_domain.json",
            Self::Concepts => "concepts.json",
            Self::Mnemonics => "mnemonics.json",
            Self::Pearls => "pearls.json",
            Self::Playbook => "nbme_playbook.json",
            Self::Frequency => "concept_frequency.json",
            Self::Cardiology => "peds_cardiology.json",
            Self::IdAntibiotics => "peds_id_antibiotics.json",
        }
    }

    /// Noun used in "Failed to load ..." messages
    pub const fn label(self) -> &'static str {
        match self {
            Self::Domains => "domain statistics",
            Self::Vignettes => "vignettes",
            Self::Concepts => "concepts",
            Self::Mnemonics => "mnemonics",
            Self::Pearls => "pearls",
            Self::Playbook => "playbook",
            Self::Frequency => "frequency data",
            Self::Cardiology => "cardiology data",
            Self::IdAntibiotics => "ID/antibiotics data",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.slug() == slug)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
