// src/noyau/base.rs
//
// Base de numération (2..=36), préfixes 0b/0o/0d/0x et alphabet des chiffres.

use super::erreur::Erreur;

/// Alphabet des chiffres, base 36 au maximum.
pub const CHIFFRES: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Base(u32);

impl Base {
    pub const MIN: u32 = 2;
    pub const MAX: u32 = 36;

    pub const BINAIRE: Base = Base(2);
    pub const OCTALE: Base = Base(8);
    pub const DECIMALE: Base = Base(10);
    pub const HEXADECIMALE: Base = Base(16);

    /// Refuse toute base hors de [2, 36].
    pub fn new(b: u32) -> Result<Self, Erreur> {
        if (Self::MIN..=Self::MAX).contains(&b) {
            Ok(Base(b))
        } else {
            Err(Erreur::BaseInvalide(b))
        }
    }

    pub fn valeur(self) -> u32 {
        self.0
    }

    /// Nombre de bits par chiffre, seulement pour les bases masquables (2, 8, 16).
    pub fn bits_par_chiffre(self) -> Option<u32> {
        match self.0 {
            2 => Some(1),
            8 => Some(3),
            16 => Some(4),
            _ => None,
        }
    }

    /// Préfixe affiché devant le nombre. La base 10 n’en affiche jamais.
    pub fn prefixe(self) -> Option<&'static str> {
        match self.0 {
            2 => Some("0b"),
            8 => Some("0o"),
            16 => Some("0x"),
            _ => None,
        }
    }

    /// Lettre de base du mini-format (`b`, `o`, `d`, `x`, insensible à la casse).
    pub fn depuis_lettre(c: char) -> Option<Base> {
        match c.to_ascii_lowercase() {
            'b' => Some(Self::BINAIRE),
            'o' => Some(Self::OCTALE),
            'd' => Some(Self::DECIMALE),
            'x' => Some(Self::HEXADECIMALE),
            _ => None,
        }
    }

    /// Préfixe lu dans une réponse (`0d` est accepté en lecture).
    pub fn depuis_prefixe(p: &str) -> Option<Base> {
        let mut it = p.chars();
        match (it.next(), it.next(), it.next()) {
            (Some('0'), Some(c), None) => Self::depuis_lettre(c),
            _ => None,
        }
    }

    /// Valeur d’un chiffre dans cette base (lettres insensibles à la casse).
    pub fn valeur_chiffre(self, c: char) -> Option<u32> {
        let v = c.to_digit(36)?;
        (v < self.0).then_some(v)
    }
}

impl TryFrom<u32> for Base {
    type Error = Erreur;

    fn try_from(b: u32) -> Result<Self, Self::Error> {
        Base::new(b)
    }
}
