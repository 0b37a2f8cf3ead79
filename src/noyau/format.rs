// src/noyau/format.rs
//
// Affichage d’un réel dans une base (2..=36) :
// - mise à l’échelle EXACTE (rationnel) par base^fraction puis arrondi (demi loin de zéro)
// - masquage “chiffres exacts” (bases 2/8/16) : ET binaire sur une largeur fixe
// - conversion en chiffres (big int, pas de limite 64 bits)
// - groupement de la partie entière, point de base, signe, préfixe
//
// Sortie neutre : point `.` et marqueur de groupe `_`. La localisation
// (séparateurs décimal / milliers) est faite par l’appelant.

use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use super::base::{Base, CHIFFRES};
use super::erreur::Erreur;

/// Marqueur de groupe produit par `format_in_base`.
pub const MARQUEUR_GROUPE: char = '_';

/// Point de base produit par `format_in_base`.
pub const POINT: char = '.';

/// Nombre maximal de chiffres de la partie entière, et de la fraction.
pub const MAX_CHIFFRES: usize = 64;

/// Paramètres d’un affichage. `entiers == 0` veut dire “minimum” (1 chiffre).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSpec {
    pub base: u32,
    pub entiers: usize,
    pub fraction: usize,
    /// 0 = pas de groupement ; 3 = milliers ; 4 = quartets.
    pub groupe: usize,
    pub chiffres_exacts: bool,
    pub prefixe: bool,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            base: 10,
            entiers: 1,
            fraction: 0,
            groupe: 0,
            chiffres_exacts: false,
            prefixe: false,
        }
    }
}

impl FormatSpec {
    pub fn new(base: u32, entiers: usize, fraction: usize) -> Self {
        Self {
            base,
            entiers,
            fraction,
            ..Self::default()
        }
    }

    pub fn groupe(mut self, groupe: usize) -> Self {
        self.groupe = groupe;
        self
    }

    pub fn avec_prefixe(mut self) -> Self {
        self.prefixe = true;
        self
    }

    pub fn exacts(mut self, chiffres_exacts: bool) -> Self {
        self.chiffres_exacts = chiffres_exacts;
        self
    }
}

/* ------------------------ Mise à l’échelle + masque ------------------------ */

fn hors_limites(entiers: usize, fraction: usize) -> Erreur {
    Erreur::FormatInvalide(format!(
        "{entiers}.{fraction} (au plus {MAX_CHIFFRES} chiffres par partie)"
    ))
}

/// Nombre total de chiffres affichés (`entiers` vaut au moins 1), largeurs bornées.
fn largeurs(entiers: usize, fraction: usize) -> Result<usize, Erreur> {
    if entiers > MAX_CHIFFRES || fraction > MAX_CHIFFRES {
        return Err(hors_limites(entiers, fraction));
    }
    entiers
        .max(1)
        .checked_add(fraction)
        .ok_or_else(|| hors_limites(entiers, fraction))
}

fn puissance(base: Base, n: usize) -> Result<BigUint, Erreur> {
    let n = u32::try_from(n).map_err(|_| hors_limites(0, n))?;
    Ok(BigUint::from(base.valeur()).pow(n))
}

/// |x| -> round(|x| * base^fraction), calcul exact sur le rationnel de x.
fn echelonner(x: f64, base: Base, fraction: usize) -> Result<BigUint, Erreur> {
    let Some(r) = BigRational::from_float(x.abs()) else {
        return Ok(BigUint::zero());
    };
    let echelle = BigRational::from_integer(BigInt::from(puissance(base, fraction)?));
    Ok((r * echelle)
        .round()
        .to_integer()
        .to_biguint()
        .unwrap_or_else(BigUint::zero))
}

/// Garde exactement `bits_par_chiffre * nb_chiffres` bits de poids faible.
fn masquer(n: BigUint, bits_par_chiffre: u32, nb_chiffres: usize) -> BigUint {
    let nb_bits = bits_par_chiffre as usize * nb_chiffres;
    let masque = (BigUint::one() << nb_bits) - 1u32;
    n & masque
}

/// Ramène `x` dans un champ fixe de `entiers + fraction` chiffres (bases 2, 8, 16).
///
/// Retourne `(valeur_masquee, tolerance)` où la tolérance vaut `1/(2*base^fraction)`
/// si `fraction > 0`, sinon 0. Le signe est perdu (on masque la magnitude).
pub fn mask_value(x: f64, base: u32, entiers: usize, fraction: usize) -> Result<(f64, f64), Erreur> {
    let b = Base::new(base)?;
    let bits = b.bits_par_chiffre().ok_or(Erreur::BaseInvalide(base))?;
    let total = largeurs(entiers, fraction)?;

    let echelle = puissance(b, fraction)?.to_f64().unwrap_or(f64::INFINITY);
    let tolerance = if fraction > 0 { 1.0 / (2.0 * echelle) } else { 0.0 };

    if !x.is_finite() {
        return Ok((x, tolerance));
    }

    let n = masquer(echelonner(x, b, fraction)?, bits, total);
    let valeur = n.to_f64().unwrap_or(f64::INFINITY) / echelle;
    Ok((valeur, tolerance))
}

/* ------------------------ Chiffres ------------------------ */

fn chiffres_en_base(n: &BigUint, base: Base) -> String {
    let alphabet = CHIFFRES.as_bytes();
    n.to_radix_be(base.valeur())
        .into_iter()
        .map(|d| alphabet[d as usize] as char)
        .collect()
}

/// Insère le marqueur tous les `groupe` chiffres, en partant de la droite.
fn grouper(entiere: &str, groupe: usize) -> String {
    if groupe == 0 || entiere.len() <= groupe {
        return entiere.to_string();
    }

    let tete = entiere.len() % groupe;
    let mut out = String::with_capacity(entiere.len() + entiere.len() / groupe);
    for (i, c) in entiere.chars().enumerate() {
        if i > 0 && (i + groupe - tete) % groupe == 0 {
            out.push(MARQUEUR_GROUPE);
        }
        out.push(c);
    }
    out
}

pub(crate) fn non_fini(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x > 0.0 {
        "inf".to_string()
    } else {
        "-inf".to_string()
    }
}

/* ------------------------ API ------------------------ */

/// Affiche `x` dans la base demandée.
///
/// Exemples (x = 22.375) :
/// - base 16, 1/1            -> `16.6`
/// - base 2, 4/4, groupe 4   -> `1_0110.0110`
/// - idem + chiffres exacts  -> `0110.0110`
pub fn format_in_base(x: f64, spec: &FormatSpec) -> Result<String, Erreur> {
    let base = Base::new(spec.base)?;
    let fraction = spec.fraction;
    let voulus = largeurs(spec.entiers, fraction)?;

    if !x.is_finite() {
        return Ok(non_fini(x));
    }

    let mut negatif = x < 0.0;
    let mut n = echelonner(x, base, fraction)?;

    if spec.chiffres_exacts {
        if let Some(bits) = base.bits_par_chiffre() {
            n = masquer(n, bits, voulus);
            negatif = false;
        }
    }

    // pas de “-0”
    if n.is_zero() {
        negatif = false;
    }

    let mut chiffres = chiffres_en_base(&n, base);
    if chiffres.len() < voulus {
        chiffres.insert_str(0, &"0".repeat(voulus - chiffres.len()));
    }

    let (entiere, frac) = chiffres.split_at(chiffres.len() - fraction);

    let mut out = String::with_capacity(chiffres.len() + 8);
    if negatif {
        out.push('-');
    }
    if spec.prefixe {
        if let Some(p) = base.prefixe() {
            out.push_str(p);
        }
    }
    out.push_str(&grouper(entiere, spec.groupe));
    if fraction > 0 {
        out.push(POINT);
        out.push_str(frac);
    }

    Ok(out)
}
