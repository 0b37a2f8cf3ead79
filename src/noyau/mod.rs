//! Noyau de mise en forme et de calcul
//!
//! Organisation interne :
//! - base.rs         : bases 2..=36, préfixes, chiffres
//! - format.rs       : affichage d’un réel dans une base (masquage, groupes, préfixe)
//! - gabarit.rs      : mini-format `%[p][,|_][n][.m](b|o|d|x)`
//! - jetons.rs       : tokenisation des formules
//! - analyse.rs      : descente récursive -> AST (validation structurelle)
//! - fonctions.rs    : liste blanche des fonctions + arités
//! - validation.rs   : find_formula_errors (sans évaluation)
//! - expr.rs         : AST
//! - eval.rs         : évaluation f64
//! - substitution.rs : variables liées, formules dans le texte
//! - lecture.rs      : lecture inverse d’une réponse (base, séparateurs, unité)
//! - config.rs       : réglages (séparateurs, chiffres exacts)
//! - erreur.rs       : erreurs typées

pub mod analyse;
pub mod base;
pub mod config;
pub mod erreur;
pub mod eval;
pub mod expr;
pub mod fonctions;
pub mod format;
pub mod gabarit;
pub mod jetons;
pub mod lecture;
pub mod substitution;
pub mod validation;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use base::Base;
pub use config::Reglages;
pub use erreur::Erreur;
pub use eval::eval_expression;
pub use format::{format_in_base, mask_value, FormatSpec};
pub use gabarit::parse_format_spec;
pub use lecture::{LecteurReponse, ReponseLue};
pub use substitution::VariableSubstituter;
pub use validation::{find_formula_errors, valider_formule};
