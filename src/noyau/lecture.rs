// src/noyau/lecture.rs
//
// Lecture inverse de l’affichage : texte saisi -> valeur (+ unité éventuelle).
//
// Forme acceptée (espaces retirés au préalable) :
//   [+|-] [0b|0o|0d|0x] chiffres/séparateurs [séparateur_décimal chiffres] [unité]
//
// - base fixe : seul le préfixe de cette base est retiré
// - base détectée (base < 2) : le préfixe choisit la base, 10 par défaut
// - séparateurs acceptés dans les chiffres : milliers (réglage) et `_`

use super::base::Base;
use super::config::Reglages;
use super::erreur::Erreur;

#[derive(Clone, Debug, PartialEq)]
pub struct ReponseLue {
    pub valeur: f64,
    /// Texte après le nombre (peut être vide).
    pub unite: String,
}

#[derive(Clone, Debug)]
pub struct LecteurReponse {
    /// None = détection par préfixe.
    base: Option<Base>,
    decimal: char,
    milliers: Vec<char>,
}

impl LecteurReponse {
    pub fn new(base: u32, reglages: &Reglages) -> Result<Self, Erreur> {
        reglages.valider()?;
        let base = if base < Base::MIN {
            None
        } else {
            Some(Base::new(base)?)
        };
        Ok(Self {
            base,
            decimal: reglages.point_decimal(),
            milliers: reglages.separateur_milliers.chars().collect(),
        })
    }

    /// Longueur du séparateur (milliers ou `_`) présent en `i`, 0 sinon.
    fn separateur_en(&self, chars: &[char], i: usize) -> usize {
        if chars.get(i) == Some(&'_') {
            return 1;
        }
        let n = self.milliers.len();
        if n > 0 && chars.get(i..i + n) == Some(&self.milliers[..]) {
            return n;
        }
        0
    }

    /// Lit les chiffres valides (séparateurs ignorés) à partir de `i`.
    fn chiffres(&self, chars: &[char], mut i: usize, base: Base) -> (Vec<u32>, usize) {
        let mut out = Vec::new();
        loop {
            if let Some(d) = chars.get(i).and_then(|c| base.valeur_chiffre(*c)) {
                out.push(d);
                i += 1;
                continue;
            }
            match self.separateur_en(chars, i) {
                0 => return (out, i),
                n => i += n,
            }
        }
    }

    pub fn lire(&self, reponse: &str) -> Option<ReponseLue> {
        let chars: Vec<char> = reponse.chars().filter(|c| *c != ' ').collect();
        let mut i = 0;

        let negatif = match chars.first() {
            Some('-') => {
                i += 1;
                true
            }
            Some('+') => {
                i += 1;
                false
            }
            _ => false,
        };

        let tete: String = chars.iter().skip(i).take(2).collect();
        let prefixe = Base::depuis_prefixe(&tete);
        let base = match (self.base, prefixe) {
            (Some(fixe), Some(p)) if fixe == p => {
                i += 2;
                fixe
            }
            (Some(fixe), _) => fixe,
            (None, Some(p)) => {
                i += 2;
                p
            }
            (None, None) => Base::DECIMALE,
        };

        let (entiers, suite) = self.chiffres(&chars, i, base);
        i = suite;

        let mut fraction = Vec::new();
        if chars.get(i) == Some(&self.decimal) {
            let (f, suite) = self.chiffres(&chars, i + 1, base);
            fraction = f;
            i = suite;
        }

        if entiers.is_empty() && fraction.is_empty() {
            return None;
        }

        let b = base.valeur() as f64;
        let mut valeur = entiers
            .iter()
            .chain(fraction.iter())
            .fold(0.0, |acc, d| acc * b + *d as f64);
        if !fraction.is_empty() {
            valeur /= b.powi(fraction.len() as i32);
        }
        if negatif {
            valeur = -valeur;
        }

        Some(ReponseLue {
            valeur,
            unite: chars[i..].iter().collect(),
        })
    }

    /// Valeur seule ; None si la réponse n’est pas un nombre.
    pub fn lire_valeur(&self, reponse: &str) -> Option<f64> {
        self.lire(reponse).map(|r| r.valeur)
    }
}

/// Nombre décimal “strict” : espaces autour, signe, chiffres, point, exposant.
/// Pas de préfixe de base, pas de `inf` / `nan`.
pub fn lire_numerique(s: &str) -> Option<f64> {
    let t = s.trim();
    let chars: Vec<char> = t.chars().collect();
    let mut i = 0;

    if matches!(chars.first(), Some('+' | '-')) {
        i += 1;
    }

    let debut = i;
    while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
        i += 1;
    }
    let mut mantisse = i > debut;
    if chars.get(i) == Some(&'.') {
        i += 1;
        let debut = i;
        while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
            i += 1;
        }
        mantisse |= i > debut;
    }
    if !mantisse {
        return None;
    }

    if matches!(chars.get(i), Some('e' | 'E')) {
        i += 1;
        if matches!(chars.get(i), Some('+' | '-')) {
            i += 1;
        }
        let debut = i;
        while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
            i += 1;
        }
        if i == debut {
            return None;
        }
    }

    if i != chars.len() {
        return None;
    }
    t.parse::<f64>().ok()
}
