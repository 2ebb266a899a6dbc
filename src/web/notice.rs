//! Success notices carried across Post/Redirect/Get.
//!
//! Only a short code travels in the `notice` query parameter; the text is
//! looked up here, so nothing user-controlled is ever echoed back.

/// A one-line confirmation shown after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// An entry was recorded
    EntryCreated,
    /// An entry was saved
    EntryUpdated,
    /// An entry was removed
    EntryDeleted,
    /// A reference row was added
    ReferenceCreated,
    /// A reference row was saved
    ReferenceUpdated,
    /// A reference row was removed
    ReferenceDeleted,
}

impl Notice {
    const ALL: [Self; 6] = [
        Self::EntryCreated,
        Self::EntryUpdated,
        Self::EntryDeleted,
        Self::ReferenceCreated,
        Self::ReferenceUpdated,
        Self::ReferenceDeleted,
    ];

    /// The query-string code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EntryCreated => "entry_created",
            Self::EntryUpdated => "entry_updated",
            Self::EntryDeleted => "entry_deleted",
            Self::ReferenceCreated => "reference_created",
            Self::ReferenceUpdated => "reference_updated",
            Self::ReferenceDeleted => "reference_deleted",
        }
    }

    /// The text shown to the user.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::EntryCreated => "Entry saved.",
            Self::EntryUpdated => "Entry updated.",
            Self::EntryDeleted => "Entry deleted.",
            Self::ReferenceCreated => "Reference value added.",
            Self::ReferenceUpdated => "Reference value updated.",
            Self::ReferenceDeleted => "Reference value deleted.",
        }
    }

    /// Parses a code; unknown codes yield `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.code() == code)
    }

    /// Redirect target `path?notice=<code>`.
    #[must_use]
    pub fn redirect_to(self, path: &str) -> String {
        format!("{path}?notice={}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for notice in Notice::ALL {
            assert_eq!(Notice::from_code(notice.code()), Some(notice));
        }
        assert_eq!(Notice::from_code("<script>"), None);
        assert_eq!(
            Notice::EntryDeleted.redirect_to("/"),
            "/?notice=entry_deleted"
        );
    }
}
