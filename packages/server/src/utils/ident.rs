use rand::Rng;

/// Kind of record an identifier is minted for.
///
/// Identifiers are a fixed alphabetic prefix followed by a random decimal of
/// a per-kind width, e.g. `JPSARC482913`. They are not checked against
/// existing rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdKind {
    Article,
    Event,
    Documentation,
    DocumentationImage,
    Volunteer,
    VolunteerApplicant,
    Career,
    CareerApplicant,
    Banner,
    Partner,
    Team,
    Education,
    Social,
    Pillar,
    SubPillar,
    Position,
    AccessKey,
    Admin,
    Superadmin,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Article => "JPSARC",
            Self::Event => "JPSEVT",
            Self::Documentation => "JPSDOC",
            Self::DocumentationImage => "JPSDOCIMG",
            Self::Volunteer => "JPSVTR",
            Self::VolunteerApplicant => "JPSVOLAPPL",
            Self::Career => "JPSCRR",
            Self::CareerApplicant => "JPSCARAPPL",
            Self::Banner => "JPSBNR",
            Self::Partner => "JPSPTR",
            Self::Team => "JPSTM",
            Self::Education => "JPSEDU",
            Self::Social => "JPSSOC",
            Self::Pillar => "JPSPLR",
            Self::SubPillar => "JPSSPLR",
            Self::Position => "JPSPOS",
            Self::AccessKey => "JPSKEY",
            Self::Admin => "JPSA",
            Self::Superadmin => "JPSSA",
        }
    }

    /// Number of random decimal digits after the prefix.
    pub fn digits(self) -> u32 {
        match self {
            Self::Banner | Self::Partner | Self::Admin => 5,
            Self::Pillar | Self::SubPillar | Self::Position | Self::AccessKey | Self::Superadmin => 4,
            _ => 6,
        }
    }
}

/// Mint a fresh identifier for `kind`.
pub fn mint(kind: IdKind) -> String {
    let digits = kind.digits();
    let low = 10u32.pow(digits - 1);
    let high = 10u32.pow(digits) - 1;
    format!("{}{}", kind.prefix(), rand::rng().random_range(low..=high))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_shape(id: &str, kind: IdKind) {
        let number = id
            .strip_prefix(kind.prefix())
            .unwrap_or_else(|| panic!("{id} lacks prefix {}", kind.prefix()));
        assert_eq!(number.len() as u32, kind.digits(), "{id}");
        assert!(number.chars().all(|c| c.is_ascii_digit()), "{id}");
        assert!(!number.starts_with('0'), "{id}");
    }

    #[test]
    fn minted_ids_have_prefix_and_width() {
        for kind in [
            IdKind::Article,
            IdKind::Banner,
            IdKind::Pillar,
            IdKind::VolunteerApplicant,
            IdKind::Superadmin,
            IdKind::Admin,
        ] {
            for _ in 0..50 {
                assert_shape(&mint(kind), kind);
            }
        }
    }

    #[test]
    fn widths_per_kind() {
        assert_eq!(IdKind::Article.digits(), 6);
        assert_eq!(IdKind::CareerApplicant.digits(), 6);
        assert_eq!(IdKind::Partner.digits(), 5);
        assert_eq!(IdKind::Position.digits(), 4);
        assert_eq!(IdKind::SubPillar.digits(), 4);
    }
}
