// src/noyau/gabarit.rs
//
// Mini-format des formules : `%` [p|P] [,|_] [entiers] [.fraction] (b|o|d|x)
//
// - p / P : afficher le préfixe de base (0b, 0o, 0x)
// - ,     : groupes de 3 (séparateur des milliers)
// - _     : groupes de 4 (séparateur `_`)
// - b o d x (insensible à la casse) : base 2, 8, 10, 16

use super::base::Base;
use super::erreur::Erreur;
use super::format::{FormatSpec, MAX_CHIFFRES};

/// Taille de groupe pour le drapeau `,`.
pub const GROUPE_MILLIERS: usize = 3;

/// Taille de groupe pour le drapeau `_`.
pub const GROUPE_QUARTETS: usize = 4;

/// Analyse un mini-format. `chiffres_exacts` reste à `false` : c’est un réglage de l’appelant.
pub fn parse_format_spec(s: &str) -> Result<FormatSpec, Erreur> {
    let invalide = || Erreur::FormatInvalide(s.to_string());

    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    if chars.first() != Some(&'%') {
        return Err(invalide());
    }
    i += 1;

    let mut spec = FormatSpec {
        entiers: 0,
        ..FormatSpec::default()
    };

    if matches!(chars.get(i), Some('p' | 'P')) {
        spec.prefixe = true;
        i += 1;
    }

    match chars.get(i) {
        Some(',') => {
            spec.groupe = GROUPE_MILLIERS;
            i += 1;
        }
        Some('_') => {
            spec.groupe = GROUPE_QUARTETS;
            i += 1;
        }
        _ => {}
    }

    let (entiers, suite) = lire_nombre(&chars, i);
    if let Some(n) = entiers {
        spec.entiers = n.ok_or_else(invalide)?;
    }
    i = suite;

    if chars.get(i) == Some(&'.') {
        let (fraction, suite) = lire_nombre(&chars, i + 1);
        // un point doit être suivi de chiffres
        spec.fraction = fraction.ok_or_else(invalide)?.ok_or_else(invalide)?;
        i = suite;
    }

    let base = chars.get(i).copied().and_then(Base::depuis_lettre).ok_or_else(invalide)?;
    spec.base = base.valeur();
    i += 1;

    if i != chars.len() || spec.entiers > MAX_CHIFFRES || spec.fraction > MAX_CHIFFRES {
        return Err(invalide());
    }

    Ok(spec)
}

/// Lit une suite de chiffres décimaux à partir de `i`.
/// - None          : aucun chiffre
/// - Some(None)    : trop grand
/// - Some(Some(n)) : valeur
fn lire_nombre(chars: &[char], mut i: usize) -> (Option<Option<usize>>, usize) {
    let start = i;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i == start {
        return (None, i);
    }
    let txt: String = chars[start..i].iter().collect();
    (Some(txt.parse::<usize>().ok()), i)
}
