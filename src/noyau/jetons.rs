// src/noyau/jetons.rs

use std::fmt;

use super::base::Base;
use super::erreur::Erreur;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(f64),

    // {nom} : référence à une variable liée
    Placeholder(String),

    // Fonctions (normalisées en minuscules). Le parse décidera si le nom est autorisé.
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret, // ^ ou **

    Tilde,
    Bang,

    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
    Shl,
    Shr,

    Amp,
    AmpAmp,
    Pipe,
    PipePipe,

    Question,
    Colon,
    Comma,

    LPar,
    RPar,
}

/// Caractères jamais valides dans une formule (hors accolades de variables).
fn est_inattendu(c: char) -> bool {
    !(c.is_whitespace()
        || c.is_ascii_alphanumeric()
        || "-+/*%^~<>:?=&|!.,(){}_".contains(c))
}

/// Sous-chaîne fautive à partir de `i` (au moins un caractère).
fn extrait_fautif(chars: &[char], i: usize) -> String {
    let mut j = i + 1;
    while j < chars.len() && est_inattendu(chars[j]) {
        j += 1;
    }
    chars[i..j].iter().collect()
}

/// Placeholder `{nom}` : une lettre puis tout sauf `>} <{"'`, fermé par `}`.
fn lire_placeholder(chars: &[char], i: usize) -> Option<(String, usize)> {
    let premier = *chars.get(i + 1)?;
    if !premier.is_alphabetic() {
        return None;
    }
    let mut j = i + 1;
    while j < chars.len() {
        match chars[j] {
            '}' => return Some((chars[i + 1..j].iter().collect(), j + 1)),
            '>' | ' ' | '<' | '{' | '"' | '\'' => return None,
            _ => j += 1,
        }
    }
    None
}

/// Entier préfixé 0b / 0o / 0d / 0x. Retourne (valeur, position suivante).
fn lire_entier_prefixe(chars: &[char], i: usize) -> Option<(f64, usize)> {
    if chars.get(i) != Some(&'0') {
        return None;
    }
    let base = chars.get(i + 1).copied().and_then(Base::depuis_lettre)?;

    let start = i + 2;
    let mut j = start;
    let mut valeur = 0.0f64;
    while let Some(d) = chars.get(j).and_then(|c| base.valeur_chiffre(*c)) {
        valeur = valeur * base.valeur() as f64 + d as f64;
        j += 1;
    }
    (j > start).then_some((valeur, j))
}

/// Nombre décimal : 12, 1.5, .5, 1., 1e-3
fn lire_decimal(chars: &[char], i: usize) -> Result<(f64, usize), Erreur> {
    let mut j = i;
    let chiffres = |j: &mut usize| {
        let s = *j;
        while *j < chars.len() && chars[*j].is_ascii_digit() {
            *j += 1;
        }
        *j > s
    };

    let mut mantisse = chiffres(&mut j);
    if chars.get(j) == Some(&'.') {
        j += 1;
        mantisse |= chiffres(&mut j);
    }
    if !mantisse {
        return Err(Erreur::SyntaxeIllegale(chars[i..j].iter().collect()));
    }

    // exposant seulement s’il est complet (sinon le `e` reste un identifiant)
    if matches!(chars.get(j), Some('e' | 'E')) {
        let mut k = j + 1;
        if matches!(chars.get(k), Some('+' | '-')) {
            k += 1;
        }
        if chiffres(&mut k) {
            j = k;
        }
    }

    let txt: String = chars[i..j].iter().collect();
    let v = txt
        .parse::<f64>()
        .map_err(|_| Erreur::SyntaxeIllegale(txt.clone()))?;
    Ok((v, j))
}

/// Tokenize une formule en jetons.
/// Supporte:
/// - nombres décimaux (12, 1.5, .5, 1e-3) et entiers préfixés (0b101, 0o17, 0d9, 0xFF)
/// - variables {nom}
/// - opérateurs arithmétiques, de comparaison, bit à bit, logiques et ternaire
/// - parenthèses et virgules
/// - identifiants [a-zA-Z_][a-zA-Z0-9_]* (normalisés en minuscules)
pub fn tokenize(s: &str) -> Result<Vec<Tok>, Erreur> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    // opérateur sur 1..3 caractères : (texte, jeton)
    const OPERATEURS: &[(&str, Tok)] = &[
        ("===", Tok::EqEq),
        ("!==", Tok::Ne),
        ("**", Tok::Caret),
        ("<<", Tok::Shl),
        (">>", Tok::Shr),
        ("<=", Tok::Le),
        (">=", Tok::Ge),
        ("<>", Tok::Ne),
        ("==", Tok::EqEq),
        ("!=", Tok::Ne),
        ("&&", Tok::AmpAmp),
        ("||", Tok::PipePipe),
        ("+", Tok::Plus),
        ("-", Tok::Minus),
        ("*", Tok::Star),
        ("/", Tok::Slash),
        ("%", Tok::Percent),
        ("^", Tok::Caret),
        ("~", Tok::Tilde),
        ("!", Tok::Bang),
        ("<", Tok::Lt),
        (">", Tok::Gt),
        ("&", Tok::Amp),
        ("|", Tok::Pipe),
        ("?", Tok::Question),
        (":", Tok::Colon),
        (",", Tok::Comma),
        ("(", Tok::LPar),
        (")", Tok::RPar),
    ];

    'jetons: while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Variables
        if c == '{' {
            let (nom, suite) = lire_placeholder(&chars, i).ok_or_else(|| {
                let fin = chars[i..]
                    .iter()
                    .position(|&c| c == '}')
                    .map_or(chars.len(), |p| i + p + 1);
                Erreur::SyntaxeIllegale(chars[i..fin].iter().collect())
            })?;
            out.push(Tok::Placeholder(nom));
            i = suite;
            continue;
        }

        // Nombres
        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit()))
        {
            if let Some((v, suite)) = lire_entier_prefixe(&chars, i) {
                out.push(Tok::Num(v));
                i = suite;
                continue;
            }
            let (v, suite) = lire_decimal(&chars, i)?;
            out.push(Tok::Num(v));
            i = suite;
            continue;
        }

        // Identifiants ASCII : [a-zA-Z_][a-zA-Z0-9_]*
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            out.push(Tok::Ident(word.to_lowercase()));
            continue;
        }

        // Opérateurs (le plus long d’abord)
        for (txt, tok) in OPERATEURS {
            let n = txt.chars().count();
            if i + n <= chars.len() && chars[i..i + n].iter().copied().eq(txt.chars()) {
                out.push(tok.clone());
                i += n;
                continue 'jetons;
            }
        }

        return Err(Erreur::SyntaxeIllegale(extrait_fautif(&chars, i)));
    }

    Ok(out)
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tok::Num(v) => return write!(f, "{v}"),
            Tok::Placeholder(nom) => return write!(f, "{{{nom}}}"),
            Tok::Ident(nom) => return f.write_str(nom),

            Tok::Plus => "+",
            Tok::Minus => "-",
            Tok::Star => "*",
            Tok::Slash => "/",
            Tok::Percent => "%",
            Tok::Caret => "^",
            Tok::Tilde => "~",
            Tok::Bang => "!",
            Tok::Lt => "<",
            Tok::Le => "<=",
            Tok::Gt => ">",
            Tok::Ge => ">=",
            Tok::EqEq => "==",
            Tok::Ne => "!=",
            Tok::Shl => "<<",
            Tok::Shr => ">>",
            Tok::Amp => "&",
            Tok::AmpAmp => "&&",
            Tok::Pipe => "|",
            Tok::PipePipe => "||",
            Tok::Question => "?",
            Tok::Colon => ":",
            Tok::Comma => ",",
            Tok::LPar => "(",
            Tok::RPar => ")",
        };
        f.write_str(s)
    }
}

/// Format utilitaire (debug) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
