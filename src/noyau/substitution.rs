// src/noyau/substitution.rs
//
// Variables liées + formules dans du texte libre.
//
// - `{nom}`              : valeur “jolie” de la variable (séparateur décimal appliqué)
// - `{=expr}`            : valeur calculée, affichage simple
// - `{%fmt=expr}`        : valeur calculée, affichée selon le mini-format (voir gabarit.rs)
//
// Deux passes : les formules d’abord, puis les `{nom}` restants, uniquement
// dans le texte d’origine (le résultat d’une formule n’est jamais relu).

use log::{debug, warn};

use super::analyse::parse;
use super::config::Reglages;
use super::erreur::Erreur;
use super::eval::evaluer;
use super::format::{self, non_fini, FormatSpec, MARQUEUR_GROUPE, POINT};
use super::gabarit::{parse_format_spec, GROUPE_MILLIERS};
use super::lecture::lire_numerique;

/// Chiffres significatifs de l’affichage simple.
const CHIFFRES_SIGNIFICATIFS: usize = 14;

/// Entités HTML reconverties avant l’analyse (dans cet ordre : `&amp;lt;` donne `<`).
const ENTITES: [(&str, &str); 3] = [("&amp;", "&"), ("&lt;", "<"), ("&gt;", ">")];

#[derive(Clone, Debug)]
struct Liaison {
    nom: String,
    valeur: f64,
    jolie: String,
}

#[derive(Clone, Debug)]
pub struct VariableSubstituter {
    liaisons: Vec<Liaison>,
    reglages: Reglages,
}

enum Segment {
    Texte(String),
    Rendu(String),
}

/// Flottant sur 14 chiffres significatifs, zéros de queue retirés.
/// Notation `1.0E+25` si l’exposant décimal est < -4 ou >= 14.
fn texte_flottant(x: f64) -> String {
    if !x.is_finite() {
        return non_fini(x);
    }
    if x == 0.0 {
        return "0".into();
    }

    let sci = format!("{:.*e}", CHIFFRES_SIGNIFICATIFS - 1, x.abs());
    let (mantisse, exposant) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exposant: i32 = exposant.parse().unwrap_or(0);
    let chiffres: String = mantisse.chars().filter(|c| c.is_ascii_digit()).collect();
    let chiffres = chiffres.trim_end_matches('0');
    let signe = if x < 0.0 { "-" } else { "" };

    if exposant < -4 || exposant >= CHIFFRES_SIGNIFICATIFS as i32 {
        let (tete, reste) = chiffres.split_at(1);
        let reste = if reste.is_empty() { "0" } else { reste };
        let s = if exposant < 0 { '-' } else { '+' };
        return format!("{signe}{tete}.{reste}E{s}{}", exposant.abs());
    }

    if exposant < 0 {
        let zeros = "0".repeat((-exposant - 1) as usize);
        return format!("{signe}0.{zeros}{chiffres}");
    }

    let entiers = exposant as usize + 1;
    if chiffres.len() <= entiers {
        let zeros = "0".repeat(entiers - chiffres.len());
        format!("{signe}{chiffres}{zeros}")
    } else {
        let (tete, reste) = chiffres.split_at(entiers);
        format!("{signe}{tete}.{reste}")
    }
}

/// Span `{[%fmt]=expr}` commençant en `i` : (format, expression, fin exclusive).
/// L’expression peut contenir des `{nom}` (un seul niveau d’accolades).
fn lire_formule(chars: &[char], i: usize) -> Option<(String, String, usize)> {
    let mut j = i + 1;

    if chars.get(j) == Some(&'%') {
        while chars.get(j).is_some_and(|c| !matches!(c, '{' | '}' | '=')) {
            j += 1;
        }
    }
    if chars.get(j) != Some(&'=') {
        return None;
    }
    let format: String = chars[i + 1..j].iter().collect();

    let debut = j + 1;
    let mut k = debut;
    loop {
        match chars.get(k)? {
            '}' => return Some((format, chars[debut..k].iter().collect(), k + 1)),
            '{' => {
                let d = k + 1;
                k = d;
                while chars.get(k).is_some_and(|c| !matches!(c, '{' | '}')) {
                    k += 1;
                }
                if k == d || chars.get(k) != Some(&'}') {
                    return None;
                }
                k += 1;
            }
            _ => k += 1,
        }
    }
}

impl VariableSubstituter {
    /// Liaisons à valeurs déjà numériques.
    pub fn new<S: Into<String>>(
        valeurs: impl IntoIterator<Item = (S, f64)>,
        reglages: Reglages,
    ) -> Result<Self, Erreur> {
        reglages.valider()?;
        let mut vs = Self {
            liaisons: Vec::new(),
            reglages,
        };
        for (nom, valeur) in valeurs {
            let jolie = vs.format_simple(valeur);
            vs.lier(nom.into(), valeur, jolie);
        }
        Ok(vs)
    }

    /// Liaisons stockées en texte par l’hôte : chaque valeur doit être un nombre décimal.
    /// Le texte d’origine sert de valeur jolie (`1.50` reste `1.50`, au séparateur près).
    pub fn depuis_textes<S: Into<String>, T: AsRef<str>>(
        valeurs: impl IntoIterator<Item = (S, T)>,
        reglages: Reglages,
    ) -> Result<Self, Erreur> {
        reglages.valider()?;
        let mut vs = Self {
            liaisons: Vec::new(),
            reglages,
        };
        for (nom, texte) in valeurs {
            let nom = nom.into();
            let texte = texte.as_ref();
            let valeur = lire_numerique(texte).ok_or_else(|| Erreur::VariableNonNumerique {
                nom: nom.clone(),
                valeur: texte.to_string(),
            })?;
            let jolie = vs.localiser(texte.trim(), 0);
            vs.lier(nom, valeur, jolie);
        }
        Ok(vs)
    }

    fn lier(&mut self, nom: String, valeur: f64, jolie: String) {
        match self.liaisons.iter_mut().find(|l| l.nom == nom) {
            Some(l) => {
                l.valeur = valeur;
                l.jolie = jolie;
            }
            None => self.liaisons.push(Liaison { nom, valeur, jolie }),
        }
    }

    pub fn valeur(&self, nom: &str) -> Option<f64> {
        self.liaisons.iter().find(|l| l.nom == nom).map(|l| l.valeur)
    }

    /// (nom, valeur) dans l’ordre de liaison, pour que l’hôte puisse les conserver.
    pub fn variables(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.liaisons.iter().map(|l| (l.nom.as_str(), l.valeur))
    }

    /* ------------------------ Affichage ------------------------ */

    /// Point -> séparateur décimal ; marqueur de groupe -> séparateur des milliers
    /// si l’on groupe par 3, laissé tel quel sinon. Une seule passe.
    fn localiser(&self, brut: &str, groupe: usize) -> String {
        let mut out = String::with_capacity(brut.len() + 4);
        for c in brut.chars() {
            match c {
                POINT => out.push_str(&self.reglages.separateur_decimal),
                MARQUEUR_GROUPE if groupe == GROUPE_MILLIERS => {
                    out.push_str(&self.reglages.separateur_milliers)
                }
                _ => out.push(c),
            }
        }
        out
    }

    /// Affichage sans conversion de base : seul le point décimal est localisé.
    pub fn format_simple(&self, x: f64) -> String {
        self.localiser(&texte_flottant(x), 0)
    }

    /// `format::format_in_base` avec le réglage “chiffres exacts” de l’instance, puis localisation.
    pub fn format_in_base(&self, x: f64, spec: &FormatSpec) -> Result<String, Erreur> {
        let spec = spec.exacts(self.reglages.chiffres_exacts);
        let brut = format::format_in_base(x, &spec)?;
        Ok(self.localiser(&brut, spec.groupe))
    }

    /// None si `fmt` ne respecte pas le mini-format.
    pub fn format_by_format_spec(&self, fmt: &str, x: f64) -> Option<String> {
        let spec = parse_format_spec(fmt).ok()?;
        self.format_in_base(x, &spec).ok()
    }

    /* ------------------------ Calcul ------------------------ */

    /// Analyse puis évalue `expression` avec les valeurs liées.
    pub fn calculate(&self, expression: &str) -> Result<f64, Erreur> {
        let texte = ENTITES
            .iter()
            .fold(expression.to_string(), |acc, (entite, brut)| acc.replace(entite, brut));

        let e = parse(texte.trim())?;
        // toutes les variables, y compris dans une branche non évaluée
        if let Some(nom) = e.variables().into_iter().find(|nom| self.valeur(nom).is_none()) {
            return Err(Erreur::VariableInconnue(nom.to_string()));
        }
        let v = evaluer(&e, &|nom| self.valeur(nom))?;
        debug!("calcul {expression:?} = {v}");
        Ok(v)
    }

    /// Réponse attendue : calcul, affichage dans la base demandée, unité éventuelle.
    pub fn calculate_answer(
        &self,
        formule: &str,
        spec: &FormatSpec,
        unite: &str,
    ) -> Result<String, Erreur> {
        let v = self.calculate(formule)?;
        let mut out = self.format_in_base(v, spec)?;
        if !unite.is_empty() {
            out.push(' ');
            out.push_str(unite);
        }
        Ok(out)
    }

    fn rendre_formule(&self, fmt: &str, expression: &str) -> Result<String, Erreur> {
        let v = self.calculate(expression)?;
        if fmt.is_empty() {
            return Ok(self.format_simple(v));
        }
        Ok(self.format_by_format_spec(fmt, v).unwrap_or_else(|| {
            warn!("format {fmt:?} invalide, affichage simple");
            self.format_simple(v)
        }))
    }

    fn substituer_jolies(&self, texte: &str) -> String {
        self.liaisons.iter().fold(texte.to_string(), |acc, l| {
            acc.replace(&format!("{{{}}}", l.nom), &l.jolie)
        })
    }

    /// Remplace formules puis variables dans un texte libre.
    pub fn replace_expressions_in_text(&self, texte: &str) -> Result<String, Erreur> {
        let chars: Vec<char> = texte.chars().collect();
        let mut segments = Vec::new();
        let mut courant = String::new();

        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '{' {
                if let Some((fmt, expression, fin)) = lire_formule(&chars, i) {
                    let rendu = self.rendre_formule(&fmt, &expression)?;
                    segments.push(Segment::Texte(std::mem::take(&mut courant)));
                    segments.push(Segment::Rendu(rendu));
                    i = fin;
                    continue;
                }
            }
            courant.push(chars[i]);
            i += 1;
        }
        segments.push(Segment::Texte(courant));

        debug!("texte : {} formule(s) remplacée(s)", segments.len() / 2);

        Ok(segments
            .into_iter()
            .map(|s| match s {
                Segment::Texte(t) => self.substituer_jolies(&t),
                Segment::Rendu(r) => r,
            })
            .collect())
    }
}
