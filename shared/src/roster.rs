use std::sync::Arc;
use serde::{Serialize, Serializer};

use crate::validation::{validate_roster_names, ValidationError};

/// Candidates of the observed deployment, in display order.
pub const DEFAULT_CANDIDATES: &[&str] = &[
    "Erich", "Doni", "M.Ilham", "Ragil", "Sutrisno", "Bayu", "Bambang", "Azlika",
    "Indra", "Robert", "Heri", "Zerinof", "Siska", "Vina", "Fadly", "Taofik",
    "Zakaria", "Irfan", "Rois", "Farhan", "Ozan", "Joko", "Awal", "Sudariyanto",
    "Afriki", "Arif H", "Pringgo", "Devi", "Ferry", "Reynal", "Hermawan", "Jerry",
    "Rizal", "Wanda", "Abdul", "Rama", "Bilal", "Ricky", "Denny", "Bowo", "Toha",
    "Daniel 1", "Daniel 2", "Ratih", "Hermanto", "Akmal", "Acep", "Andika", "Arif",
    "Ocan", "Ajip", "Tunggul", "Alberto", "Fitria", "Edi", "Rina", "Fikri",
    "Muchlis", "Rizal Amin", "Anjar", "Iwan", "Yoga", "Sri", "Gendras", "Vinie",
    "Handoko", "Ariyanto", "Bu Rizka", "Tomi", "Samuel", "Feodella", "Asmariah",
    "Arnold", "Fandy", "Ilham Dwi", "Efendi", "Syafiyyah", "Benedecta",
];

/// The fixed, ordered list of eligible choices.
///
/// Cloning shares the underlying names, so one roster can be handed to the
/// voting workflow, the tally board and the admin board alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRoster {
    names: Arc<[String]>,
}

impl CandidateRoster {
    pub fn new<I, S>(names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        validate_roster_names(&names)?;
        Ok(Self { names: names.into() })
    }

    pub fn names(&self) -> &[String] { &self.names }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.names.iter().any(|name| name == candidate)
    }

    pub fn len(&self) -> usize { self.names.len() }

    pub fn is_empty(&self) -> bool { self.names.is_empty() }
}

impl Default for CandidateRoster {
    fn default() -> Self {
        Self {
            names: DEFAULT_CANDIDATES.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl Serialize for CandidateRoster {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.names().serialize(serializer)
    }
}
