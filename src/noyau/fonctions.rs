// src/noyau/fonctions.rs
//
// Liste blanche des fonctions mathématiques + arité attendue.
// Tout nom absent de TABLE est refusé à l’analyse (FonctionNonSupportee).

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arite {
    Aucun,
    Un,
    UnOuDeux,
    Deux,
    AuMoinsDeux,
}

impl Arite {
    pub fn accepte(self, n: usize) -> bool {
        match self {
            Arite::Aucun => n == 0,
            Arite::Un => n == 1,
            Arite::UnOuDeux => n == 1 || n == 2,
            Arite::Deux => n == 2,
            Arite::AuMoinsDeux => n >= 2,
        }
    }
}

impl fmt::Display for Arite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let txt = match self {
            Arite::Aucun => "ne prend aucun argument",
            Arite::Un => "prend exactement un argument",
            Arite::UnOuDeux => "prend un ou deux arguments",
            Arite::Deux => "prend exactement deux arguments",
            Arite::AuMoinsDeux => "prend au moins deux arguments",
        };
        f.write_str(txt)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fonction {
    Pi,

    Abs,
    Acos,
    Acosh,
    Asin,
    Asinh,
    Atan,
    Atanh,
    Bindec,
    Ceil,
    Cos,
    Cosh,
    Decbin,
    Decoct,
    Deg2rad,
    Exp,
    Expm1,
    Floor,
    IsFinite,
    IsInfinite,
    IsNan,
    Log10,
    Log1p,
    Octdec,
    Rad2deg,
    Sin,
    Sinh,
    Sqrt,
    Tan,
    Tanh,

    Log,
    Round,

    Atan2,
    Fmod,
    Pow,

    Min,
    Max,
}

const TABLE: &[(&str, Fonction)] = &[
    ("pi", Fonction::Pi),
    ("abs", Fonction::Abs),
    ("acos", Fonction::Acos),
    ("acosh", Fonction::Acosh),
    ("asin", Fonction::Asin),
    ("asinh", Fonction::Asinh),
    ("atan", Fonction::Atan),
    ("atanh", Fonction::Atanh),
    ("bindec", Fonction::Bindec),
    ("ceil", Fonction::Ceil),
    ("cos", Fonction::Cos),
    ("cosh", Fonction::Cosh),
    ("decbin", Fonction::Decbin),
    ("decoct", Fonction::Decoct),
    ("deg2rad", Fonction::Deg2rad),
    ("exp", Fonction::Exp),
    ("expm1", Fonction::Expm1),
    ("floor", Fonction::Floor),
    ("is_finite", Fonction::IsFinite),
    ("is_infinite", Fonction::IsInfinite),
    ("is_nan", Fonction::IsNan),
    ("log10", Fonction::Log10),
    ("log1p", Fonction::Log1p),
    ("octdec", Fonction::Octdec),
    ("rad2deg", Fonction::Rad2deg),
    ("sin", Fonction::Sin),
    ("sinh", Fonction::Sinh),
    ("sqrt", Fonction::Sqrt),
    ("tan", Fonction::Tan),
    ("tanh", Fonction::Tanh),
    ("log", Fonction::Log),
    ("round", Fonction::Round),
    ("atan2", Fonction::Atan2),
    ("fmod", Fonction::Fmod),
    ("pow", Fonction::Pow),
    ("min", Fonction::Min),
    ("max", Fonction::Max),
];

fn booleen(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Entier -> chiffres dans `base`, relus comme un nombre décimal (decbin(5) = 101).
/// Les négatifs passent en complément à deux sur 64 bits.
fn vers_chiffres(x: f64, base: u32) -> f64 {
    let n = x.trunc() as i64 as u64;
    let txt = match base {
        2 => format!("{n:b}"),
        _ => format!("{n:o}"),
    };
    txt.parse::<f64>().unwrap_or(f64::NAN)
}

/// Chiffres décimaux de `x` lus dans `base` ; les chiffres invalides sont ignorés (bindec(102) = 2).
fn depuis_chiffres(x: f64, base: u32) -> f64 {
    format!("{:.0}", x.trunc().abs())
        .chars()
        .filter_map(|c| c.to_digit(base))
        .fold(0.0, |acc, d| acc * base as f64 + d as f64)
}

/// Arrondi demi loin de zéro à `precision` décimales (négatif accepté).
fn arrondir(x: f64, precision: f64) -> f64 {
    let p = precision.trunc() as i32;
    if p < 0 {
        let echelle = 10f64.powi(-p);
        return (x / echelle).round() * echelle;
    }
    let echelle = 10f64.powi(p);
    (x * echelle).round() / echelle
}

impl Fonction {
    pub fn depuis_nom(nom: &str) -> Option<Fonction> {
        TABLE.iter().find(|(n, _)| *n == nom).map(|(_, f)| *f)
    }

    pub fn nom(self) -> &'static str {
        TABLE
            .iter()
            .find(|(_, f)| *f == self)
            .map(|(n, _)| *n)
            .unwrap_or("?")
    }

    pub fn arite(self) -> Arite {
        use Fonction::*;
        match self {
            Pi => Arite::Aucun,
            Log | Round => Arite::UnOuDeux,
            Atan2 | Fmod | Pow => Arite::Deux,
            Min | Max => Arite::AuMoinsDeux,
            _ => Arite::Un,
        }
    }

    /// Applique la fonction. L’arité a déjà été vérifiée par l’analyse ;
    /// un argument manquant est lu comme NaN.
    pub fn appliquer(self, args: &[f64]) -> f64 {
        use Fonction::*;

        let a = args.first().copied().unwrap_or(f64::NAN);
        let b = args.get(1).copied();

        match self {
            Pi => std::f64::consts::PI,

            Abs => a.abs(),
            Acos => a.acos(),
            Acosh => a.acosh(),
            Asin => a.asin(),
            Asinh => a.asinh(),
            Atan => a.atan(),
            Atanh => a.atanh(),
            Bindec => depuis_chiffres(a, 2),
            Ceil => a.ceil(),
            Cos => a.cos(),
            Cosh => a.cosh(),
            Decbin => vers_chiffres(a, 2),
            Decoct => vers_chiffres(a, 8),
            Deg2rad => a.to_radians(),
            Exp => a.exp(),
            Expm1 => a.exp_m1(),
            Floor => a.floor(),
            IsFinite => booleen(a.is_finite()),
            IsInfinite => booleen(a.is_infinite()),
            IsNan => booleen(a.is_nan()),
            Log10 => a.log10(),
            Log1p => a.ln_1p(),
            Octdec => depuis_chiffres(a, 8),
            Rad2deg => a.to_degrees(),
            Sin => a.sin(),
            Sinh => a.sinh(),
            Sqrt => a.sqrt(),
            Tan => a.tan(),
            Tanh => a.tanh(),

            Log => match b {
                Some(base) => a.ln() / base.ln(),
                None => a.ln(),
            },
            Round => arrondir(a, b.unwrap_or(0.0)),

            Atan2 => a.atan2(b.unwrap_or(f64::NAN)),
            Fmod => a % b.unwrap_or(f64::NAN),
            Pow => a.powf(b.unwrap_or(f64::NAN)),

            Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}
