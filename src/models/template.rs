/// Template use-case categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateCategory {
    Code,
    Content,
    Data,
    Creative,
    Business,
    Research,
}

impl TemplateCategory {
    pub const ALL: [Self; 6] = [
        Self::Code,
        Self::Content,
        Self::Data,
        Self::Creative,
        Self::Business,
        Self::Research,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Content => "content",
            Self::Data => "data",
            Self::Creative => "creative",
            Self::Business => "business",
            Self::Research => "research",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}
